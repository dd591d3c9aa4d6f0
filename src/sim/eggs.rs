//! Egg simulation: spawning, ramp riding, magnet pull, catching, falling
//!
//! Per egg and per frame the order is fixed: magnet pull, then the catch
//! check, then ramp/fall movement. Catching therefore wins over a floor
//! impact that would happen in the same frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::egg::{Egg, EggKind, EggState, depth_scale};
use super::ramps::{Lane, RampGeometry};
use crate::rects_overlap;
use crate::tuning::EggTuning;

/// Dragon catch area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub center: Vec2,
    pub half: Vec2,
}

impl Hitbox {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    #[inline]
    pub fn overlaps_egg(&self, egg: &Egg) -> bool {
        rects_overlap(self.center, self.half, egg.pos, egg.half_extents())
    }
}

/// Everything the simulation needs to know about the rest of the frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub delta_ms: f32,
    /// Ramp progress per ms, all multipliers applied
    pub travel_speed: f32,
    pub frozen: bool,
    pub magnet: bool,
    /// Dragon's screen position (magnet target)
    pub dragon_pos: Vec2,
    pub dragon_lane: Lane,
    pub hitbox: Hitbox,
}

/// What happened to an egg that left play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EggReport {
    pub id: u32,
    pub lane: Lane,
    pub kind: EggKind,
    pub pos: Vec2,
    pub latched: bool,
}

impl EggReport {
    fn of(egg: &Egg) -> Self {
        Self {
            id: egg.id,
            lane: egg.lane,
            kind: egg.kind,
            pos: egg.pos,
            latched: egg.is_latched(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EggOutcome {
    Caught(EggReport),
    Landed(EggReport),
}

/// Broken egg on the floor (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splat {
    pub pos: Vec2,
    pub kind: EggKind,
    /// 1 when fresh, fades to 0
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct EggSimulation {
    eggs: Vec<Egg>,
    splats: Vec<Splat>,
    rng: Pcg32,
    next_id: u32,
    tuning: EggTuning,
}

impl EggSimulation {
    pub fn new(seed: u64, tuning: EggTuning) -> Self {
        Self {
            eggs: Vec::new(),
            splats: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        }
    }

    /// Spawn an egg on a random lane with a weighted-random kind
    pub fn spawn(&mut self, geometry: &RampGeometry, glide: f32) -> u32 {
        let lane = Lane::ALL[self.rng.random_range(0..Lane::ALL.len())];
        let kind = EggKind::pick_weighted(self.rng.random::<f32>());
        self.spawn_kind(lane, kind, geometry, glide)
    }

    /// Spawn a specific egg at the top of a lane
    pub fn spawn_kind(&mut self, lane: Lane, kind: EggKind, geometry: &RampGeometry, glide: f32) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let mut egg = Egg::new(id, lane, kind, glide);
        egg.pos = geometry.surface_point(lane, 0.0);
        self.eggs.push(egg);
        id
    }

    /// Advance all eggs by one frame, pushing outcomes for eggs that left play
    pub fn update(&mut self, ctx: &FrameContext, geometry: &RampGeometry, out: &mut Vec<EggOutcome>) {
        let dt = ctx.delta_ms.max(0.0);
        self.update_splats(dt);

        // Reverse order so removal during the sweep is safe
        for i in (0..self.eggs.len()).rev() {
            let egg = &mut self.eggs[i];

            if !ctx.frozen && !egg.kind.is_hazard() && (ctx.magnet || egg.is_latched()) {
                egg.state = EggState::Latched;
                let to_dragon = ctx.dragon_pos - egg.pos;
                let step = (self.tuning.magnet_pull_speed * dt).min(to_dragon.length());
                egg.pos += to_dragon.normalize_or_zero() * step;
                egg.rotation += self.tuning.magnet_spin * (dt / 16.0);
            }

            if ctx.hitbox.overlaps_egg(egg) && (egg.lane == ctx.dragon_lane || egg.is_latched()) {
                let report = EggReport::of(egg);
                self.eggs.remove(i);
                log::debug!("egg {} ({}) caught", report.id, report.kind.as_str());
                out.push(EggOutcome::Caught(report));
                continue;
            }

            if ctx.frozen || egg.is_latched() {
                continue;
            }

            match egg.state {
                EggState::OnRamp => {
                    let ramp = geometry.ramp(egg.lane);
                    let prev_t = egg.t;
                    egg.t = (egg.t + ctx.travel_speed * dt).clamp(0.0, 1.0);
                    egg.pos = geometry.surface_point(egg.lane, egg.t);
                    egg.scale = depth_scale(egg.t);
                    egg.near = egg.t > self.tuning.near_threshold;

                    // Rolling without slipping: bigger eggs turn slower
                    let distance = (egg.t - prev_t) * ramp.length();
                    let spin_dir = if egg.lane.is_left() { 1.0 } else { -1.0 };
                    egg.rotation += spin_dir * distance / egg.radius.max(1.0);

                    if egg.t >= 1.0 {
                        let exit = (ctx.travel_speed * ramp.length() * self.tuning.exit_speed_factor * egg.glide)
                            .min(self.tuning.max_exit_speed);
                        egg.vel = ramp.tangent() * exit;
                        egg.state = EggState::Falling;
                    }
                }
                EggState::Falling => {
                    let floor = geometry.floor_y();
                    let gravity = if egg.pos.y < floor - self.tuning.fall_zone {
                        self.tuning.ballistic_gravity
                    } else {
                        self.tuning.fall_gravity
                    };
                    egg.vel.y += gravity * dt;
                    let drift = if egg.pos.x < geometry.center_x() { 1.0 } else { -1.0 };
                    egg.vel.x += drift * self.tuning.center_drift_accel * dt;
                    egg.pos += egg.vel * dt;
                    egg.rotation += self.tuning.fall_spin * (dt / 16.6);

                    if egg.pos.y >= floor {
                        let report = EggReport::of(egg);
                        self.eggs.remove(i);
                        self.splats.push(Splat {
                            pos: Vec2::new(report.pos.x, floor),
                            kind: report.kind,
                            life: 1.0,
                        });
                        log::debug!("egg {} ({}) hit the floor", report.id, report.kind.as_str());
                        out.push(EggOutcome::Landed(report));
                    }
                }
                EggState::Latched => {}
            }
        }
    }

    fn update_splats(&mut self, dt: f32) {
        let lifetime = self.tuning.splat_lifetime_ms.max(1.0);
        for splat in &mut self.splats {
            splat.life -= dt / lifetime;
        }
        self.splats.retain(|s| s.life > 0.0);
    }

    /// Remove an egg by id. Safe to call repeatedly.
    pub fn remove_egg(&mut self, id: u32) -> Option<Egg> {
        let idx = self.eggs.iter().position(|e| e.id == id)?;
        Some(self.eggs.remove(idx))
    }

    pub fn clear_all(&mut self) {
        self.eggs.clear();
        self.splats.clear();
    }

    pub fn eggs(&self) -> &[Egg] {
        &self.eggs
    }

    pub fn egg(&self, id: u32) -> Option<&Egg> {
        self.eggs.iter().find(|e| e.id == id)
    }

    pub fn egg_mut(&mut self, id: u32) -> Option<&mut Egg> {
        self.eggs.iter_mut().find(|e| e.id == id)
    }

    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }

    pub fn len(&self) -> usize {
        self.eggs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eggs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
    use crate::tuning::RampTuning;
    use proptest::prelude::*;

    const SPEED: f32 = 1.0 / 2000.0;

    fn geometry() -> RampGeometry {
        RampGeometry::configure(WORLD_WIDTH, WORLD_HEIGHT, &RampTuning::default())
    }

    fn sim() -> EggSimulation {
        EggSimulation::new(7, EggTuning::default())
    }

    fn ctx(geo: &RampGeometry, lane: Lane, delta_ms: f32) -> FrameContext {
        let pos = geo.catch_position(lane);
        FrameContext {
            delta_ms,
            travel_speed: SPEED,
            frozen: false,
            magnet: false,
            dragon_pos: pos,
            dragon_lane: lane,
            hitbox: Hitbox::new(pos, Vec2::new(50.0, 45.0)),
        }
    }

    fn run(sim: &mut EggSimulation, geo: &RampGeometry, ctx: FrameContext, total_ms: f32) -> Vec<EggOutcome> {
        let mut out = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < total_ms {
            sim.update(&ctx, geo, &mut out);
            elapsed += ctx.delta_ms;
        }
        out
    }

    #[test]
    fn test_spawn_starts_at_ramp_top() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn(&geo, 1.0);
        let egg = sim.egg(id).unwrap();
        assert_eq!(egg.t, 0.0);
        assert_eq!(egg.state, EggState::OnRamp);
        assert_eq!(egg.pos, geo.surface_point(egg.lane, 0.0));
    }

    #[test]
    fn test_egg_caught_in_dragon_lane() {
        let geo = geometry();
        let mut sim = sim();
        sim.spawn_kind(Lane::LeftTop, EggKind::White, &geo, 1.0);
        let out = run(&mut sim, &geo, ctx(&geo, Lane::LeftTop, 16.0), 2000.0);

        let caught = out.iter().filter(|o| matches!(o, EggOutcome::Caught(_))).count();
        let landed = out.iter().filter(|o| matches!(o, EggOutcome::Landed(_))).count();
        assert_eq!(caught, 1);
        assert_eq!(landed, 0);
        assert!(sim.is_empty());
    }

    #[test]
    fn test_egg_in_other_lane_lands() {
        let geo = geometry();
        let mut sim = sim();
        sim.spawn_kind(Lane::LeftTop, EggKind::Blue, &geo, 1.0);
        let out = run(&mut sim, &geo, ctx(&geo, Lane::RightTop, 16.0), 5000.0);

        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], EggOutcome::Landed(r) if r.kind == EggKind::Blue));
        assert!(sim.is_empty());
        assert_eq!(sim.splats().len(), 1);
    }

    #[test]
    fn test_leaves_ramp_with_capped_exit_speed() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::RightBottom, EggKind::White, &geo, 1.5);
        let mut out = Vec::new();
        sim.update(&ctx(&geo, Lane::LeftTop, 2500.0), &geo, &mut out);

        let egg = sim.egg(id).unwrap();
        assert_eq!(egg.t, 1.0);
        assert_eq!(egg.state, EggState::Falling);
        assert!(egg.near);
        assert!((egg.vel.length() - 0.7).abs() < 1e-4);
        assert!(egg.vel.x < 0.0, "right ramps exit leftward");
    }

    #[test]
    fn test_slow_exit_amplified_by_glide() {
        let geo = geometry();
        let mut tuning = EggTuning::default();
        tuning.max_exit_speed = 10.0;
        let mut plain = EggSimulation::new(1, tuning.clone());
        let mut glide = EggSimulation::new(1, tuning);
        let a = plain.spawn_kind(Lane::LeftTop, EggKind::White, &geo, 1.0);
        let b = glide.spawn_kind(Lane::LeftTop, EggKind::White, &geo, 1.5);
        let c = ctx(&geo, Lane::RightBottom, 2500.0);
        plain.update(&c, &geo, &mut Vec::new());
        glide.update(&c, &geo, &mut Vec::new());

        let va = plain.egg(a).unwrap().vel.length();
        let vb = glide.egg(b).unwrap().vel.length();
        assert!((vb / va - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_catch_beats_floor_impact() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::LeftBottom, EggKind::White, &geo, 1.0);
        let floor = geo.floor_y();
        {
            let egg = sim.egg_mut(id).unwrap();
            egg.state = EggState::Falling;
            egg.t = 1.0;
            egg.scale = 1.0;
            egg.pos = Vec2::new(300.0, floor - 1.0);
            egg.vel = Vec2::new(0.0, 1.0);
        }
        let mut c = ctx(&geo, Lane::LeftBottom, 16.0);
        c.hitbox = Hitbox::new(Vec2::new(300.0, floor), Vec2::splat(30.0));

        let mut out = Vec::new();
        sim.update(&c, &geo, &mut out);
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], EggOutcome::Caught(_)));
        assert!(sim.splats().is_empty());
    }

    #[test]
    fn test_magnet_latch_is_sticky() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::RightTop, EggKind::Golden, &geo, 1.0);
        let mut c = ctx(&geo, Lane::LeftBottom, 16.0);
        c.magnet = true;
        sim.update(&c, &geo, &mut Vec::new());
        assert!(sim.egg(id).unwrap().is_latched());

        // Boost gone, egg keeps homing in on the dragon
        c.magnet = false;
        let before = sim.egg(id).unwrap().pos.distance(c.dragon_pos);
        sim.update(&c, &geo, &mut Vec::new());
        let egg = sim.egg(id).unwrap();
        assert!(egg.is_latched());
        assert!(egg.pos.distance(c.dragon_pos) < before);

        // Latched eggs are caught regardless of lane
        let out = run(&mut sim, &geo, c, 2000.0);
        assert!(matches!(out.as_slice(), [EggOutcome::Caught(r)] if r.latched && r.lane == Lane::RightTop));
    }

    #[test]
    fn test_bombs_ignore_magnet() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::LeftTop, EggKind::Bomb, &geo, 1.0);
        let mut c = ctx(&geo, Lane::RightTop, 16.0);
        c.magnet = true;
        sim.update(&c, &geo, &mut Vec::new());
        let egg = sim.egg(id).unwrap();
        assert!(!egg.is_latched());
        assert_eq!(egg.state, EggState::OnRamp);
        assert!(egg.t > 0.0);
    }

    #[test]
    fn test_freeze_holds_eggs() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::LeftTop, EggKind::White, &geo, 1.0);
        let mut c = ctx(&geo, Lane::RightTop, 16.0);
        c.frozen = true;
        c.magnet = true;
        run(&mut sim, &geo, c, 1000.0);
        let egg = sim.egg(id).unwrap();
        assert_eq!(egg.t, 0.0);
        assert!(!egg.is_latched());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn(&geo, 1.0);
        assert!(sim.remove_egg(id).is_some());
        assert!(sim.remove_egg(id).is_none());
        sim.spawn(&geo, 1.0);
        sim.clear_all();
        assert!(sim.is_empty());
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let geo = geometry();
        let mut sim = sim();
        let id = sim.spawn_kind(Lane::LeftTop, EggKind::White, &geo, 1.0);
        sim.update(&ctx(&geo, Lane::RightTop, 0.0), &geo, &mut Vec::new());
        assert_eq!(sim.egg(id).unwrap().t, 0.0);
    }

    proptest! {
        #[test]
        fn prop_progress_is_frame_rate_independent(deltas in prop::collection::vec(1.0f32..50.0, 1..20)) {
            let geo = geometry();
            let total: f32 = deltas.iter().sum();

            let mut stepped = sim();
            let a = stepped.spawn_kind(Lane::LeftBottom, EggKind::White, &geo, 1.0);
            for d in &deltas {
                stepped.update(&ctx(&geo, Lane::RightTop, *d), &geo, &mut Vec::new());
            }

            let mut single = sim();
            let b = single.spawn_kind(Lane::LeftBottom, EggKind::White, &geo, 1.0);
            single.update(&ctx(&geo, Lane::RightTop, total), &geo, &mut Vec::new());

            let ta = stepped.egg(a).unwrap().t;
            let tb = single.egg(b).unwrap().t;
            prop_assert!((ta - tb).abs() < 1e-4);
        }
    }
}
