//! Typed channel between the simulation and the UI layer
//!
//! Commands come in from the UI, events go out. Both serialize as
//! `{"type": ..., ...}` JSON so a web host can pass them across the boundary
//! unchanged.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::api::ScoreResponse;
use crate::audio::SoundCue;
use crate::consts::EVENT_QUEUE_CAPACITY;
use crate::opponents::OpponentUpdate;
use crate::profile::Inventory;
use crate::settings::SoundSettings;
use crate::sim::{BoostFlags, BoostKind, GamePhase, Lane, LevelTheme, MatchMode};

/// UI -> simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    MoveDragon {
        lane: Lane,
    },
    ActivateBoost {
        kind: BoostKind,
        #[serde(default)]
        duration_ms: Option<f32>,
    },
    /// Spend a refill item for one life
    RefillHeart,
    SetDifficulty {
        hard: bool,
    },
    SetPause {
        paused: bool,
    },
    SetFullscreen {
        fullscreen: bool,
    },
    StartGame,
    Restart,
    NextLevel,
    SoundSettings {
        settings: SoundSettings,
    },
    /// The stored profile changed (purchase, onboarding, ...)
    ProfileUpdated,
    /// Start a versus match against a pseudo-opponent
    StartMatch {
        mode: MatchMode,
        #[serde(default)]
        partner: Option<String>,
    },
}

impl Command {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Floating text shown over the dragon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toast {
    PlusLife,
    PlusHeart,
    PlusMaxLife,
    Dodged,
    Burnt,
    Magnet,
    DodgeReady,
    HardMode,
    EasyMode,
}

impl Toast {
    pub fn text(self) -> &'static str {
        match self {
            Toast::PlusLife => "+1 LIFE",
            Toast::PlusHeart => "+1 HEART",
            Toast::PlusMaxLife => "+1 MAX LIFE",
            Toast::Dodged => "DODGED!",
            Toast::Burnt => "BURNT!",
            Toast::Magnet => "MAGNET!",
            Toast::DodgeReady => "DODGE READY",
            Toast::HardMode => "HARD MODE ON",
            Toast::EasyMode => "EASY MODE ON",
        }
    }

    /// Tint as 0xRRGGBB
    pub fn color(self) -> u32 {
        match self {
            Toast::PlusLife | Toast::PlusHeart | Toast::PlusMaxLife | Toast::HardMode => 0xef4444,
            Toast::Dodged | Toast::DodgeReady => 0x22c55e,
            Toast::Burnt => 0xff5252,
            Toast::Magnet => 0xfacc15,
            Toast::EasyMode => 0x3b82f6,
        }
    }
}

/// Haptic feedback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Haptic {
    /// Light impact (normal catch)
    Light,
    Success,
    Error,
}

/// Simulation -> UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiEvent {
    Score(u64),
    Lives(u32),
    /// Whole seconds left in the level
    Timer(u32),
    Stars(u64),
    Scales(u64),
    Inventory(Inventory),
    /// Final score
    GameOver(u64),
    /// 1-based number of the level just cleared
    StageCleared(u32),
    Opponent(OpponentUpdate),
    /// Backend answer to the last score submission
    Submitted(ScoreResponse),
    Phase(GamePhase),
    Level { index: u32, theme: LevelTheme },
    Boosts(BoostFlags),
    Toast(Toast),
    Haptic(Haptic),
    Sound(SoundCue),
}

/// Bounded outbound queue; when full the oldest event is dropped
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<UiEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }
}

impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: UiEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            log::warn!("UI event queue full ({}), dropped oldest event", self.capacity);
        }
        self.events.push_back(event);
    }

    /// Take all pending events in emission order
    pub fn drain(&mut self) -> impl Iterator<Item = UiEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events lost to overflow
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
