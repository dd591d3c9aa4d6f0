//! Match controller: the per-frame orchestrator
//!
//! Advances boosts, skills, spawning and eggs, applies the scoring and life
//! rules to egg outcomes, runs the level clock, and reports everything the UI
//! needs as `UiEvent`s. Side effects that belong to other layers (currency
//! awards, score submissions) are queued in outboxes for the host to drain.

use glam::Vec2;

use super::boosts::{BoostKind, BoostTimers};
use super::difficulty::DifficultyCurve;
use super::egg::EggKind;
use super::eggs::{EggOutcome, EggReport, EggSimulation, FrameContext, Hitbox};
use super::ramps::{Lane, RampGeometry};
use super::state::{GamePhase, MatchMode, MatchState, SkillState, max_lives, theme_for_level};
use crate::api::ScoreSubmission;
use crate::audio::SoundCue;
use crate::bridge::{EventQueue, Haptic, Toast, UiEvent};
use crate::clamp_frame_ms;
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::profile::PlayerProfile;
use crate::tuning::{SkillTuning, Tuning};

/// Profile change requested by the match, applied by the host to its store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEffect {
    AddStars(u64),
    AddScales(u64),
}

/// Viewport sizes for the two display modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewports {
    pub normal: Vec2,
    pub fullscreen: Vec2,
}

impl Default for Viewports {
    fn default() -> Self {
        let world = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT);
        Self {
            normal: world,
            fullscreen: world,
        }
    }
}

pub struct MatchController {
    state: MatchState,
    tuning: Tuning,
    profile: PlayerProfile,
    geometry: RampGeometry,
    viewports: Viewports,
    fullscreen: bool,
    difficulty: DifficultyCurve,
    boosts: BoostTimers,
    eggs: EggSimulation,
    events: EventQueue,
    effects: Vec<ProfileEffect>,
    submissions: Vec<ScoreSubmission>,
    /// Scratch buffer reused every frame
    outcomes: Vec<EggOutcome>,
}

impl MatchController {
    pub fn new(seed: u64, tuning: Tuning, profile: PlayerProfile) -> Self {
        let viewports = Viewports::default();
        let geometry = RampGeometry::configure(viewports.normal.x, viewports.normal.y, &tuning.ramps);
        let mut controller = Self {
            state: MatchState::new(&tuning.rules),
            difficulty: DifficultyCurve::new(tuning.difficulty.clone()),
            boosts: BoostTimers::new(tuning.boosts.clone()),
            eggs: EggSimulation::new(seed, tuning.eggs.clone()),
            tuning,
            profile: profile.clone(),
            geometry,
            viewports,
            fullscreen: false,
            events: EventQueue::default(),
            effects: Vec::new(),
            submissions: Vec::new(),
            outcomes: Vec::new(),
        };
        controller.restart(profile);
        controller
    }

    // ---------------------------------------------------------------------
    // Frame update
    // ---------------------------------------------------------------------

    /// Advance the match by one host frame
    pub fn tick(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        let dt = clamp_frame_ms(delta_ms);
        if dt == 0.0 {
            return;
        }

        self.state.clock_ms += dt as f64;
        if self.boosts.tick(self.state.clock_ms) {
            self.events.push(UiEvent::Boosts(self.boosts.flags()));
        }
        let frozen = self.boosts.is_frozen();
        if !frozen {
            self.state.level_elapsed_ms += dt;
        }

        self.update_skills(dt);

        let sample = self
            .difficulty
            .sample(self.state.level_elapsed_ms, self.state.level, self.state.hard);
        if !frozen {
            self.state.spawn_timer_ms += dt;
            if self.state.spawn_timer_ms >= sample.spawn_interval_ms {
                self.state.spawn_timer_ms -= sample.spawn_interval_ms;
                let glide = self.glide();
                self.eggs.spawn(&self.geometry, glide);
            }
        }

        let ctx = FrameContext {
            delta_ms: dt,
            travel_speed: sample.travel_speed() * self.heavy_tail(),
            frozen,
            magnet: self.boosts.is_magnet_active(),
            dragon_pos: self.geometry.catch_position(self.state.dragon_lane),
            dragon_lane: self.state.dragon_lane,
            hitbox: self.hitbox(),
        };
        let mut outcomes = std::mem::take(&mut self.outcomes);
        self.eggs.update(&ctx, &self.geometry, &mut outcomes);
        for outcome in outcomes.drain(..) {
            // Anything after a game over in the same frame is moot
            if self.state.phase != GamePhase::Playing {
                break;
            }
            match outcome {
                EggOutcome::Caught(report) => self.handle_catch(&report),
                EggOutcome::Landed(report) => self.handle_miss(&report),
            }
        }
        self.outcomes = outcomes;

        if self.state.phase == GamePhase::Playing && !frozen {
            self.update_timer(dt);
        }
    }

    fn update_skills(&mut self, dt: f32) {
        let skins = &self.profile.skins;
        let tuning = &self.tuning.skills;
        let skills = &mut self.state.skills;

        // Tail recharges unconditionally
        if skills.tail_ms > 0.0 {
            skills.tail_ms = (skills.tail_ms - dt).max(0.0);
        }

        // Wings only recharge while no magnet is running
        if let Some(cooldown) = SkillTuning::cooldown_for(&tuning.wings_cooldown_ms, skins.wings_tier) {
            if !self.boosts.is_magnet_active() {
                skills.wings_ms -= dt;
                if skills.wings_ms <= 0.0 {
                    skills.wings_ms = cooldown;
                    self.boosts.activate(BoostKind::Magnet, Some(tuning.wings_magnet_ms));
                    self.events.push(UiEvent::Boosts(self.boosts.flags()));
                    self.events.push(UiEvent::Toast(Toast::Magnet));
                }
            }
        }

        if SkillTuning::cooldown_for(&tuning.legs_cooldown_ms, skins.legs_tier).is_some() && !skills.legs_charged {
            skills.legs_ms -= dt;
            if skills.legs_ms <= 0.0 {
                skills.legs_ms = 0.0;
                skills.legs_charged = true;
                self.events.push(UiEvent::Toast(Toast::DodgeReady));
            }
        }
    }

    fn update_timer(&mut self, dt: f32) {
        self.state.level_remaining_ms = (self.state.level_remaining_ms - dt).max(0.0);
        self.emit_timer();
        if self.state.level_remaining_ms <= 0.0 {
            self.complete_level();
        }
    }

    fn emit_timer(&mut self) {
        let seconds = self.state.timer_seconds();
        if self.state.reported_seconds != Some(seconds) {
            self.state.reported_seconds = Some(seconds);
            self.events.push(UiEvent::Timer(seconds));
        }
    }

    // ---------------------------------------------------------------------
    // Outcome rules
    // ---------------------------------------------------------------------

    fn handle_catch(&mut self, report: &EggReport) {
        let spec = report.kind.spec();

        if report.kind.is_hazard() {
            if self.boosts.is_shield_active() {
                self.events.push(UiEvent::Sound(SoundCue::Catch));
            } else if self.state.skills.legs_charged {
                self.state.skills.legs_charged = false;
                self.state.skills.legs_ms =
                    SkillTuning::cooldown_for(&self.tuning.skills.legs_cooldown_ms, self.profile.skins.legs_tier)
                        .unwrap_or(0.0);
                self.events.push(UiEvent::Toast(Toast::Dodged));
                self.events.push(UiEvent::Sound(SoundCue::Catch));
            } else {
                self.events.push(UiEvent::Sound(SoundCue::Miss));
                self.lose_life();
            }
            return;
        }

        self.events.push(UiEvent::Sound(SoundCue::Catch));

        let multiplier = self.profile.score_multiplier(self.tuning.rules.crystal_body_multiplier);
        let points = (spec.score as f32 * multiplier).floor() as u64;
        let old_score = self.state.score;
        self.state.score += points;

        let every = self.tuning.rules.bonus_life_every.max(1) as u64;
        if self.state.score / every > old_score / every && self.state.lives < self.state.max_lives {
            self.state.lives += 1;
            self.events.push(UiEvent::Lives(self.state.lives));
            self.events.push(UiEvent::Haptic(Haptic::Success));
            self.events.push(UiEvent::Toast(Toast::PlusLife));
        }

        if spec.stars > 0 {
            self.state.stars += spec.stars as u64;
            self.effects.push(ProfileEffect::AddStars(spec.stars as u64));
            self.events.push(UiEvent::Stars(self.state.stars));
        }
        if spec.scales > 0 {
            self.state.scales += spec.scales as u64;
            self.effects.push(ProfileEffect::AddScales(spec.scales as u64));
            self.events.push(UiEvent::Scales(self.state.scales));
        }

        self.events.push(UiEvent::Score(self.state.score));
        self.events.push(UiEvent::Haptic(Haptic::Light));
    }

    fn handle_miss(&mut self, report: &EggReport) {
        if !report.kind.spec().missable || self.boosts.is_shield_active() {
            return;
        }

        // A charged tail burns the egg instead: scores as a catch
        if let Some(cooldown) = SkillTuning::cooldown_for(&self.tuning.skills.tail_cooldown_ms, self.profile.skins.tail_tier)
            && self.state.skills.tail_ms <= 0.0
        {
            self.state.skills.tail_ms = cooldown;
            self.events.push(UiEvent::Toast(Toast::Burnt));
            self.handle_catch(report);
            return;
        }

        self.events.push(UiEvent::Sound(SoundCue::Miss));
        self.lose_life();
    }

    fn lose_life(&mut self) {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.events.push(UiEvent::Lives(self.state.lives));
        self.events.push(UiEvent::Haptic(Haptic::Error));
        if self.state.lives == 0 {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.state.phase = GamePhase::GameOver;
        log::info!("Game over: score {} at level {}", self.state.score, self.state.level + 1);
        self.events.push(UiEvent::Phase(GamePhase::GameOver));
        self.events.push(UiEvent::Sound(SoundCue::GameOver));
        self.events.push(UiEvent::GameOver(self.state.score));
        self.submissions.push(ScoreSubmission::solo(self.state.score, &self.profile));
    }

    fn complete_level(&mut self) {
        self.state.phase = GamePhase::StageCleared;
        log::info!("Stage {} cleared with score {}", self.state.level + 1, self.state.score);
        self.events.push(UiEvent::Phase(GamePhase::StageCleared));
        self.events.push(UiEvent::Sound(SoundCue::LevelComplete));
        self.events.push(UiEvent::StageCleared(self.state.level + 1));
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn move_dragon(&mut self, lane: Lane) {
        if matches!(self.state.phase, GamePhase::Playing | GamePhase::WaitingStart) {
            self.state.dragon_lane = lane;
        }
    }

    pub fn start_game(&mut self) {
        if self.state.phase != GamePhase::WaitingStart {
            return;
        }
        self.state.first_start = false;
        self.state.spawn_timer_ms = 0.0;
        self.set_phase(GamePhase::Playing);
        log::info!("Match started");
    }

    pub fn set_pause(&mut self, paused: bool) {
        if !self.state.phase.can_toggle_pause() {
            return;
        }
        let next = if paused { GamePhase::Paused } else { GamePhase::Playing };
        if next != self.state.phase {
            self.set_phase(next);
        }
    }

    /// Toggle hard mode; takes effect on the next frame
    pub fn set_difficulty(&mut self, hard: bool) {
        self.state.hard = hard;
        if self.state.phase != GamePhase::WaitingStart {
            let toast = if hard { Toast::HardMode } else { Toast::EasyMode };
            self.events.push(UiEvent::Toast(toast));
        }
    }

    /// Rebuild the ramp layout for a display mode
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        let size = if fullscreen {
            self.viewports.fullscreen
        } else {
            self.viewports.normal
        };
        self.geometry = RampGeometry::configure(size.x, size.y, &self.tuning.ramps);
    }

    pub fn set_viewports(&mut self, viewports: Viewports) {
        self.viewports = viewports;
        self.set_fullscreen(self.fullscreen);
    }

    /// Whether a boost activation would take effect right now
    pub fn can_activate(&self, kind: BoostKind) -> bool {
        self.state.phase == GamePhase::Playing && !self.boosts.is_active(kind)
    }

    /// Start a boost. Returns false if not playing or already active.
    pub fn activate_boost(&mut self, kind: BoostKind, duration_override_ms: Option<f32>) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        if !self.boosts.activate(kind, duration_override_ms) {
            return false;
        }
        log::info!("Boost {} active for {} ms", kind.as_str(), self.boosts.remaining_ms(kind));
        self.events.push(UiEvent::Boosts(self.boosts.flags()));
        self.events.push(UiEvent::Sound(SoundCue::Boost));
        true
    }

    /// Whether a refill would restore a life right now
    pub fn can_refill(&self) -> bool {
        self.state.phase == GamePhase::Playing && self.state.lives < self.state.max_lives
    }

    pub fn refill_heart(&mut self) -> bool {
        if !self.can_refill() {
            return false;
        }
        self.state.lives += 1;
        self.events.push(UiEvent::Lives(self.state.lives));
        self.events.push(UiEvent::Haptic(Haptic::Success));
        self.events.push(UiEvent::Toast(Toast::PlusHeart));
        true
    }

    pub fn next_level(&mut self) {
        if self.state.phase != GamePhase::StageCleared {
            return;
        }
        self.state.lives = (self.state.lives + 1).min(self.state.max_lives);
        self.events.push(UiEvent::Lives(self.state.lives));

        self.state.level += 1;
        self.apply_level();
        self.state.level_elapsed_ms = 0.0;
        self.state.spawn_timer_ms = 0.0;
        self.eggs.clear_all();
        self.reset_level_timer();
        self.set_phase(GamePhase::Playing);
        log::info!("Level {} started", self.state.level + 1);
    }

    /// Start over with a fresh profile snapshot
    pub fn restart(&mut self, profile: PlayerProfile) {
        self.profile = profile;
        let state = &mut self.state;
        state.score = 0;
        state.level = 0;
        state.hard = false;
        state.max_lives = max_lives(&self.tuning.rules, &self.profile.skins, state.mode);
        state.lives = state.max_lives;
        state.level_elapsed_ms = 0.0;
        state.spawn_timer_ms = 0.0;
        state.stars = self.profile.stars;
        state.scales = self.profile.scales;
        state.skills = SkillState::for_skins(&self.profile.skins, &self.tuning.skills);

        self.eggs.clear_all();
        self.boosts.reset();
        self.reset_level_timer();
        self.apply_level();

        self.events.push(UiEvent::Score(0));
        self.events.push(UiEvent::Lives(self.state.lives));
        self.events.push(UiEvent::Stars(self.state.stars));
        self.events.push(UiEvent::Scales(self.state.scales));
        self.events.push(UiEvent::Inventory(self.profile.inventory.clone()));
        self.events.push(UiEvent::Boosts(self.boosts.flags()));

        let phase = if self.state.first_start {
            GamePhase::WaitingStart
        } else {
            GamePhase::Playing
        };
        self.set_phase(phase);
        log::info!("Match reset (max lives {})", self.state.max_lives);
    }

    /// Swap in a newer profile snapshot mid-match
    pub fn profile_updated(&mut self, profile: PlayerProfile) {
        let had_iron = self.profile.skins.iron_body_owned;
        self.profile = profile;
        self.refresh_max_lives();

        if !had_iron && self.profile.skins.iron_body_owned && self.state.lives < self.state.max_lives {
            self.state.lives += 1;
            self.events.push(UiEvent::Lives(self.state.lives));
            self.events.push(UiEvent::Toast(Toast::PlusMaxLife));
            self.events.push(UiEvent::Sound(SoundCue::Boost));
        }

        self.state.stars = self.profile.stars;
        self.state.scales = self.profile.scales;
        self.events.push(UiEvent::Stars(self.state.stars));
        self.events.push(UiEvent::Scales(self.state.scales));
    }

    pub fn set_mode(&mut self, mode: MatchMode) {
        self.state.mode = mode;
        self.refresh_max_lives();
    }

    /// Put a specific egg on a lane (scripted play, tests)
    pub fn spawn_egg(&mut self, lane: Lane, kind: EggKind) -> u32 {
        let glide = self.glide();
        self.eggs.spawn_kind(lane, kind, &self.geometry, glide)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn set_phase(&mut self, phase: GamePhase) {
        self.state.phase = phase;
        self.events.push(UiEvent::Phase(phase));
    }

    fn reset_level_timer(&mut self) {
        self.state.level_remaining_ms = self.tuning.rules.level_duration_ms;
        self.state.reported_seconds = None;
        self.emit_timer();
    }

    fn apply_level(&mut self) {
        self.events.push(UiEvent::Level {
            index: self.state.level,
            theme: theme_for_level(self.state.level),
        });
    }

    fn refresh_max_lives(&mut self) {
        self.state.max_lives = max_lives(&self.tuning.rules, &self.profile.skins, self.state.mode);
        if self.state.lives > self.state.max_lives {
            self.state.lives = self.state.max_lives;
            self.events.push(UiEvent::Lives(self.state.lives));
        }
    }

    /// Exit speed multiplier for newly spawned eggs
    fn glide(&self) -> f32 {
        if self.profile.skins.wings_tier >= 1 {
            self.tuning.eggs.glide_multiplier
        } else {
            1.0
        }
    }

    /// Ramp speed multiplier from the heavy tail
    fn heavy_tail(&self) -> f32 {
        if self.profile.skins.tail_tier >= 1 {
            self.tuning.eggs.heavy_tail_multiplier
        } else {
            1.0
        }
    }

    /// Current catch area; a top-tier tail reaches far above and below
    pub fn hitbox(&self) -> Hitbox {
        let rules = &self.tuning.rules;
        let mut half = Vec2::new(rules.dragon_half_width, rules.dragon_half_height);
        if self.profile.skins.tail_tier >= self.tuning.skills.tail_reach_tier {
            half.y += self.tuning.skills.tail_reach / 2.0;
        }
        Hitbox::new(self.geometry.catch_position(self.state.dragon_lane), half)
    }

    // ---------------------------------------------------------------------
    // Accessors and outboxes
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.state.max_lives
    }

    pub fn eggs(&self) -> &EggSimulation {
        &self.eggs
    }

    pub fn boosts(&self) -> &BoostTimers {
        &self.boosts
    }

    pub fn geometry(&self) -> &RampGeometry {
        &self.geometry
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.events.drain().collect()
    }

    pub fn take_effects(&mut self) -> Vec<ProfileEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn take_submissions(&mut self) -> Vec<ScoreSubmission> {
        std::mem::take(&mut self.submissions)
    }
}
