//! Game session: the host-facing glue around a match
//!
//! Owns the match controller plus everything with side effects (profile
//! store, score backend, audio, opponent, preferences). The host feeds it
//! commands and frame deltas and drains the resulting UI events.

use crate::api::{ScoreApi, ScoreSubmission};
use crate::audio::AudioManager;
use crate::bridge::{Command, EventQueue, UiEvent};
use crate::opponents::{BotOpponent, DuoOpponent, Opponent};
use crate::persistence::ProfileStore;
use crate::platform::telegram;
use crate::profile::InventoryItem;
use crate::settings::Settings;
use crate::sim::{BoostKind, GamePhase, MatchController, MatchMode, ProfileEffect};
use crate::tuning::Tuning;

/// Partner name used when a duo is started without one
pub const DEFAULT_PARTNER: &str = "Friend";

pub struct GameSession<S: ProfileStore, A: ScoreApi> {
    controller: MatchController,
    store: S,
    api: A,
    settings: Settings,
    audio: AudioManager,
    opponent: Option<Box<dyn Opponent>>,
    events: EventQueue,
    /// Session clock (ms), advanced by frame deltas
    now_ms: f64,
    seed: u64,
    matches_started: u64,
}

impl<S: ProfileStore, A: ScoreApi> GameSession<S, A> {
    pub fn new(seed: u64, tuning: Tuning, mut store: S, api: A, settings: Settings) -> Self {
        let profile = store.load_profile();
        log::info!("Session for {} ({} stars, {} scales)", profile.username, profile.stars, profile.scales);
        let mut controller = MatchController::new(seed, tuning, profile);
        controller.set_fullscreen(settings.display.fullscreen);

        let mut session = Self {
            controller,
            store,
            api,
            audio: AudioManager::new(settings.sound),
            settings,
            opponent: None,
            events: EventQueue::default(),
            now_ms: 0.0,
            seed,
            matches_started: 0,
        };
        session.pump();
        session
    }

    /// Apply one inbound command
    pub fn handle(&mut self, command: Command) {
        log::debug!("command {command:?}");
        match command {
            Command::MoveDragon { lane } => self.controller.move_dragon(lane),
            Command::ActivateBoost { kind, duration_ms } => self.activate_boost(kind, duration_ms),
            Command::RefillHeart => self.refill_heart(),
            Command::SetDifficulty { hard } => self.controller.set_difficulty(hard),
            Command::SetPause { paused } => self.controller.set_pause(paused),
            Command::SetFullscreen { fullscreen } => {
                self.controller.set_fullscreen(fullscreen);
                self.settings.display.fullscreen = fullscreen;
                self.settings.save();
            }
            Command::StartGame => {
                self.audio.resume();
                self.controller.start_game();
            }
            Command::Restart => {
                self.stop_opponent();
                self.controller.set_mode(MatchMode::Solo);
                let profile = self.store.load_profile();
                self.controller.restart(profile);
            }
            Command::NextLevel => self.controller.next_level(),
            Command::SoundSettings { settings } => {
                self.settings.apply_sound(settings);
                self.audio.update_settings(self.settings.sound);
                self.settings.save();
            }
            Command::ProfileUpdated => {
                let profile = self.store.load_profile();
                let inventory = profile.inventory.clone();
                self.controller.profile_updated(profile);
                self.events.push(UiEvent::Inventory(inventory));
            }
            Command::StartMatch { mode, partner } => self.start_match(mode, partner),
        }
        self.pump();
    }

    /// Advance one host frame
    pub fn frame(&mut self, delta_ms: f32) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms as f64;
        }
        self.controller.tick(delta_ms);
        self.pump();
        self.audio.update(delta_ms);

        if let Some(opponent) = self.opponent.as_mut() {
            if let Some(update) = opponent.tick(delta_ms) {
                self.events.push(UiEvent::Opponent(update));
            }
        }
    }

    /// Take all pending UI events in emission order
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.events.drain().collect()
    }

    fn activate_boost(&mut self, kind: BoostKind, duration_ms: Option<f32>) {
        if !self.controller.can_activate(kind) {
            return;
        }
        if self.consume(InventoryItem::from(kind)) {
            self.controller.activate_boost(kind, duration_ms);
        }
    }

    fn refill_heart(&mut self) {
        if !self.controller.can_refill() {
            return;
        }
        if self.consume(InventoryItem::RefillHearts) {
            self.controller.refill_heart();
        }
    }

    /// Spend an inventory item; reports the new counts either way
    fn consume(&mut self, item: InventoryItem) -> bool {
        let used = match self.store.use_item(item) {
            Ok(used) => used,
            Err(e) => {
                log::warn!("Failed to use {item:?}: {e}");
                false
            }
        };
        if !used {
            log::debug!("No {item:?} left");
        }
        let inventory = self.store.load_profile().inventory;
        self.events.push(UiEvent::Inventory(inventory));
        used
    }

    fn start_match(&mut self, mode: MatchMode, partner: Option<String>) {
        self.stop_opponent();
        self.matches_started += 1;
        let seed = self.seed.wrapping_add(self.matches_started);

        self.opponent = match mode {
            MatchMode::Solo => None,
            MatchMode::Bot => Some(Box::new(BotOpponent::new(seed))),
            MatchMode::Duo => {
                let partner = partner
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PARTNER.to_string());
                Some(Box::new(DuoOpponent::new(seed, partner)))
            }
        };

        self.controller.set_mode(mode);
        let profile = self.store.load_profile();
        self.controller.restart(profile);

        let lives = self.controller.lives();
        if let Some(update) = self.opponent.as_mut().and_then(|o| o.start(lives)) {
            self.events.push(UiEvent::Opponent(update));
        }
        log::info!("Match mode {mode:?}");
    }

    fn stop_opponent(&mut self) {
        if let Some(mut opponent) = self.opponent.take() {
            opponent.stop();
        }
    }

    /// Route controller output: events, profile effects, submissions
    fn pump(&mut self) {
        let mut opponent_submission = None;

        for event in self.controller.drain_events() {
            match &event {
                UiEvent::Score(score) => {
                    if let Some(update) = self.opponent.as_mut().and_then(|o| o.on_player_score(*score)) {
                        self.events.push(event.clone());
                        self.events.push(UiEvent::Opponent(update));
                        continue;
                    }
                }
                UiEvent::Lives(lives) => {
                    if let Some(update) = self.opponent.as_mut().and_then(|o| o.on_player_lives(*lives)) {
                        self.events.push(event.clone());
                        self.events.push(UiEvent::Opponent(update));
                        continue;
                    }
                }
                UiEvent::GameOver(score) => {
                    if let Err(e) = self.store.set_best_score(*score) {
                        log::warn!("Failed to record best score: {e}");
                    }
                    let profile = self.controller.profile().clone();
                    opponent_submission = self.opponent.as_mut().and_then(|o| o.on_game_over(*score, &profile));
                }
                UiEvent::Sound(cue) => self.audio.play(*cue),
                UiEvent::Phase(GamePhase::Playing) => self.audio.start_music(),
                UiEvent::Phase(_) => self.audio.stop_music(),
                UiEvent::Haptic(kind) => {
                    if self.settings.display.haptics {
                        telegram::haptic(*kind);
                    }
                }
                _ => {}
            }
            self.events.push(event);
        }

        for effect in self.controller.take_effects() {
            let result = match effect {
                ProfileEffect::AddStars(n) => self.store.add_stars(n),
                ProfileEffect::AddScales(n) => self.store.add_scales(n),
            };
            if let Err(e) = result {
                log::warn!("Failed to apply {effect:?}: {e}");
            }
        }

        // A versus/co-op result replaces the plain solo one
        let solo = self.controller.take_submissions();
        match opponent_submission {
            Some(submission) => self.submit(submission),
            None => solo.into_iter().for_each(|s| self.submit(s)),
        }
    }

    fn submit(&mut self, submission: ScoreSubmission) {
        match self.api.submit_score(&submission, self.now_ms) {
            Ok(response) => self.events.push(UiEvent::Submitted(response)),
            Err(e) => log::warn!("Score submission failed: {e}"),
        }
    }

    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MatchController {
        &mut self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    pub fn has_opponent(&self) -> bool {
        self.opponent.as_ref().is_some_and(|o| o.is_active())
    }

    /// Stop background activity (page teardown)
    pub fn shutdown(&mut self) {
        self.stop_opponent();
        self.audio.stop_music();
        log::info!("Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockScoreApi;
    use crate::persistence::MemoryProfileStore;
    use crate::settings::SoundSettings;
    use crate::sim::{EggKind, Lane};

    type TestSession = GameSession<MemoryProfileStore, MockScoreApi>;

    fn session() -> TestSession {
        let mut tuning = Tuning::default();
        tuning.difficulty.spawn_interval_start_ms = 1.0e9;
        tuning.difficulty.spawn_interval_min_ms = 1.0e9;
        GameSession::new(
            4,
            tuning,
            MemoryProfileStore::in_memory(4),
            MockScoreApi::new(4),
            Settings::default(),
        )
    }

    #[test]
    fn test_boost_consumes_inventory_once() {
        let mut s = session();
        // Not playing yet: nothing consumed
        s.handle(Command::ActivateBoost {
            kind: BoostKind::Shield,
            duration_ms: None,
        });
        assert_eq!(s.store_mut().load_profile().inventory.shield, 3);

        s.handle(Command::StartGame);
        s.handle(Command::ActivateBoost {
            kind: BoostKind::Shield,
            duration_ms: None,
        });
        s.handle(Command::ActivateBoost {
            kind: BoostKind::Shield,
            duration_ms: None,
        });
        assert!(s.controller().boosts().is_shield_active());
        assert_eq!(s.store_mut().load_profile().inventory.shield, 2);
    }

    #[test]
    fn test_music_follows_play_phase() {
        let mut s = session();
        assert!(!s.audio().is_music_playing());
        s.handle(Command::StartGame);
        assert!(s.audio().is_music_playing());
        s.frame(16.0);
        assert_eq!(s.audio().music_steps(), 1);

        s.handle(Command::SetPause { paused: true });
        assert!(!s.audio().is_music_playing());
        s.handle(Command::SetPause { paused: false });
        assert!(s.audio().is_music_playing());

        s.handle(Command::SoundSettings {
            settings: SoundSettings {
                music: false,
                ..SoundSettings::default()
            },
        });
        for _ in 0..100 {
            s.frame(16.0);
        }
        assert_eq!(s.audio().music_steps(), 1);
    }

    #[test]
    fn test_rejected_submission_is_swallowed() {
        let mut s = session();
        s.drain_events();
        let profile = s.store_mut().load_profile();
        let mut duo = ScoreSubmission::duo(50, &profile, "Rex");
        duo.partner_name = None;
        s.submit(duo);

        assert!(!s.drain_events().iter().any(|e| matches!(e, UiEvent::Submitted(_))));
        assert!(s.api().scores().duo.is_empty());
        assert_eq!(s.phase(), GamePhase::WaitingStart);
    }

    #[test]
    fn test_refill_without_items_does_nothing() {
        let mut s = session();
        s.handle(Command::StartGame);
        s.controller_mut().spawn_egg(Lane::LeftTop, EggKind::White);
        s.handle(Command::MoveDragon { lane: Lane::RightBottom });
        for _ in 0..200 {
            s.frame(16.0);
        }
        assert_eq!(s.controller().lives(), 5);
        s.drain_events();

        s.handle(Command::RefillHeart);
        assert_eq!(s.controller().lives(), 5);
        assert!(s.drain_events().contains(&UiEvent::Inventory(s.store_mut().load_profile().inventory)));
    }

    #[test]
    fn test_currency_effects_reach_store() {
        let mut s = session();
        s.handle(Command::StartGame);
        s.handle(Command::MoveDragon { lane: Lane::LeftTop });
        s.controller_mut().spawn_egg(Lane::LeftTop, EggKind::Star);
        for _ in 0..200 {
            s.frame(16.0);
        }
        assert_eq!(s.store_mut().load_profile().stars, 1001);
    }

    #[test]
    fn test_sound_settings_reach_audio() {
        let mut s = session();
        s.handle(Command::SoundSettings {
            settings: crate::settings::SoundSettings {
                music: false,
                sfx: false,
                volume: 10,
            },
        });
        assert!(!s.settings().sound.sfx);
        s.handle(Command::StartGame);
        s.handle(Command::ActivateBoost {
            kind: BoostKind::Freeze,
            duration_ms: None,
        });
        assert!(s.audio().played().is_empty());
    }

    #[test]
    fn test_restart_drops_opponent() {
        let mut s = session();
        s.handle(Command::StartMatch {
            mode: MatchMode::Bot,
            partner: None,
        });
        assert!(s.has_opponent());
        assert_eq!(s.controller().max_lives(), 6);
        s.handle(Command::Restart);
        assert!(!s.has_opponent());
        assert_eq!(s.controller().state().mode, MatchMode::Solo);
    }
}
