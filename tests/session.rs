//! End-to-end match flows through a full session

use dragon_egg::api::MockScoreApi;
use dragon_egg::audio::SoundCue;
use dragon_egg::bridge::{Command, UiEvent};
use dragon_egg::persistence::{MemoryProfileStore, ProfileStore};
use dragon_egg::sim::{BoostKind, EggKind, GamePhase, Lane, MatchMode};
use dragon_egg::{GameSession, Settings, Tuning};

type Session = GameSession<MemoryProfileStore, MockScoreApi>;

const FRAME_MS: f32 = 16.0;

/// Session whose spawner never fires, so tests place every egg themselves
fn scripted_session(seed: u64) -> Session {
    let mut tuning = Tuning::default();
    tuning.difficulty.spawn_interval_start_ms = 1.0e9;
    tuning.difficulty.spawn_interval_min_ms = 1.0e9;
    GameSession::new(
        seed,
        tuning,
        MemoryProfileStore::in_memory(seed),
        MockScoreApi::new(seed),
        Settings::default(),
    )
}

/// Run frames until `done` holds, collecting every emitted event
fn run_until(session: &mut Session, max_ms: f32, done: impl Fn(&Session) -> bool) -> Vec<UiEvent> {
    let mut events = session.drain_events();
    let mut elapsed = 0.0;
    while elapsed < max_ms && !done(session) {
        session.frame(FRAME_MS);
        events.extend(session.drain_events());
        elapsed += FRAME_MS;
    }
    events
}

fn catch_one(session: &mut Session, lane: Lane) -> Vec<UiEvent> {
    session.handle(Command::MoveDragon { lane });
    session.controller_mut().spawn_egg(lane, EggKind::White);
    run_until(session, 5_000.0, |s| s.controller().eggs().is_empty())
}

#[test]
fn test_left_top_catch() {
    let mut s = scripted_session(1);
    s.handle(Command::StartGame);
    let events = catch_one(&mut s, Lane::LeftTop);

    assert_eq!(s.controller().score(), 10);
    assert_eq!(s.controller().lives(), 6);
    assert!(events.contains(&UiEvent::Score(10)));
    assert!(events.contains(&UiEvent::Sound(SoundCue::Catch)));
    assert!(s.audio().played().contains(&SoundCue::Catch));
}

#[test]
fn test_unmissable_bomb_lands_harmlessly() {
    let mut s = scripted_session(2);
    s.handle(Command::StartGame);
    s.handle(Command::MoveDragon { lane: Lane::LeftTop });
    s.controller_mut().spawn_egg(Lane::RightBottom, EggKind::Bomb);
    run_until(&mut s, 5_000.0, |s| s.controller().eggs().is_empty());
    assert_eq!(s.controller().lives(), 6);
    assert_eq!(s.controller().eggs().splats().len(), 1);
}

#[test]
fn test_bomb_into_dragon_costs_a_life() {
    let mut s = scripted_session(2);
    s.handle(Command::StartGame);
    s.handle(Command::MoveDragon { lane: Lane::LeftBottom });
    s.controller_mut().spawn_egg(Lane::LeftBottom, EggKind::Bomb);
    let events = run_until(&mut s, 5_000.0, |s| s.controller().eggs().is_empty());
    assert_eq!(s.controller().lives(), 5);
    assert_eq!(s.controller().score(), 0);
    assert!(events.contains(&UiEvent::Sound(SoundCue::Miss)));
}

#[test]
fn test_game_over_records_and_submits_once() {
    let mut s = scripted_session(3);
    s.handle(Command::StartGame);
    catch_one(&mut s, Lane::LeftTop);

    // Six eggs on the far lane land together
    for _ in 0..6 {
        s.controller_mut().spawn_egg(Lane::RightBottom, EggKind::White);
    }
    let events = run_until(&mut s, 5_000.0, |s| s.phase() == GamePhase::GameOver);

    assert_eq!(s.phase(), GamePhase::GameOver);
    assert_eq!(s.controller().lives(), 0);
    let game_overs: Vec<_> = events.iter().filter(|e| matches!(e, UiEvent::GameOver(_))).collect();
    assert_eq!(game_overs, vec![&UiEvent::GameOver(10)]);

    let submitted: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Submitted(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].high_score, 10);
    assert_eq!(s.store().best_score(), 10);
    assert_eq!(s.api().scores().solo.best_for("Player"), Some(10));

    // Nothing moves after the end
    let frozen_events = run_until(&mut s, 1_000.0, |_| false);
    assert!(!frozen_events.iter().any(|e| matches!(e, UiEvent::Timer(_))));
}

#[test]
fn test_freeze_holds_clock_and_does_not_stack() {
    let mut s = scripted_session(4);
    s.handle(Command::StartGame);
    let activate = Command::ActivateBoost {
        kind: BoostKind::Freeze,
        duration_ms: None,
    };
    s.handle(activate.clone());
    run_until(&mut s, 3_000.0, |_| false);
    s.handle(activate);
    run_until(&mut s, 3_000.0, |_| false);

    assert_eq!(s.controller().state().level_remaining_ms, 60_000.0);
    assert!(s.controller().boosts().is_frozen());
    assert_eq!(s.store_mut().load_profile().inventory.freeze, 4);

    run_until(&mut s, 5_000.0, |s| !s.controller().boosts().is_frozen());
    run_until(&mut s, 1_000.0, |_| false);
    assert!(s.controller().state().level_remaining_ms < 60_000.0);
}

#[test]
fn test_stage_clear_and_next_level() {
    let mut s = scripted_session(5);
    s.handle(Command::StartGame);
    let events = run_until(&mut s, 61_000.0, |s| s.phase() == GamePhase::StageCleared);
    assert!(events.contains(&UiEvent::StageCleared(1)));
    assert!(events.contains(&UiEvent::Sound(SoundCue::LevelComplete)));

    s.handle(Command::NextLevel);
    assert_eq!(s.phase(), GamePhase::Playing);
    assert_eq!(s.controller().state().level, 1);
    assert!(
        s.drain_events()
            .iter()
            .any(|e| matches!(e, UiEvent::Level { index: 1, .. }))
    );
}

#[test]
fn test_bot_match_submits_combined_score() {
    let mut s = scripted_session(6);
    s.handle(Command::StartMatch {
        mode: MatchMode::Bot,
        partner: None,
    });
    s.handle(Command::StartGame);
    let events = catch_one(&mut s, Lane::LeftBottom);
    let bot_scores: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Opponent(u) => Some(u.score),
            _ => None,
        })
        .collect();
    assert_eq!(bot_scores.last(), Some(&7));

    for _ in 0..6 {
        s.controller_mut().spawn_egg(Lane::RightTop, EggKind::White);
    }
    run_until(&mut s, 5_000.0, |s| s.phase() == GamePhase::GameOver);

    assert!(!s.has_opponent());
    assert_eq!(s.api().scores().solo_bot.best_for("Player"), Some(17));
    assert!(s.api().scores().solo.is_empty());
    assert_eq!(s.store().best_score(), 10);
}

#[test]
fn test_duo_partner_announced() {
    let mut s = scripted_session(7);
    s.drain_events();
    s.handle(Command::StartMatch {
        mode: MatchMode::Duo,
        partner: Some("Rex".into()),
    });
    let events = s.drain_events();
    let update = events
        .iter()
        .find_map(|e| match e {
            UiEvent::Opponent(u) if u.name == "Rex" => Some(u),
            _ => None,
        })
        .expect("partner update");
    assert!(!update.is_bot);
    assert!(s.has_opponent());
}

#[test]
fn test_iron_body_purchase_applies_mid_match() {
    let mut s = scripted_session(8);
    s.handle(Command::StartGame);
    s.store_mut().update_profile(|p| p.skins.iron_body_owned = true).unwrap();
    s.handle(Command::ProfileUpdated);
    assert_eq!(s.controller().max_lives(), 7);
    assert_eq!(s.controller().lives(), 7);
}

#[test]
fn test_malformed_commands_are_rejected() {
    assert!(Command::from_json(r#"{"type":"move_dragon","lane":"middle"}"#).is_err());
    assert!(Command::from_json("[]").is_err());
}
