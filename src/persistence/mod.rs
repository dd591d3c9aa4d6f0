//! Profile persistence with integrity verification
//!
//! Features:
//! - Checksummed JSON envelope around the profile
//! - Migration of pre-envelope saves
//! - Corruption detection: a bad save is replaced by a fresh profile
//! - Best score kept under its own key

pub mod backend;
pub mod envelope;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

pub use backend::{MemoryBackend, StorageBackend};
#[cfg(target_arch = "wasm32")]
pub use backend::LocalStorageBackend;

use crate::platform;
use crate::profile::{InventoryItem, PlayerProfile};

pub const PROFILE_KEY: &str = "player_profile_v6";
pub const BEST_SCORE_KEY: &str = "dragon_egg_best_score";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("stored profile failed its integrity check")]
    Tampered,
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable profile and best-score storage
pub trait ProfileStore {
    /// Current profile; creates and saves a new one if none is usable
    fn load_profile(&mut self) -> PlayerProfile;
    fn save_profile(&mut self, profile: &PlayerProfile) -> Result<(), StoreError>;
    fn best_score(&self) -> u64;
    /// Store `score` if it beats the current best; returns whether it did
    fn set_best_score(&mut self, score: u64) -> Result<bool, StoreError>;

    /// Load, modify and save in one step
    fn update_profile<F>(&mut self, f: F) -> Result<PlayerProfile, StoreError>
    where
        F: FnOnce(&mut PlayerProfile),
        Self: Sized,
    {
        let mut profile = self.load_profile();
        f(&mut profile);
        self.save_profile(&profile)?;
        Ok(profile)
    }

    /// Consume one inventory item; false if none left
    fn use_item(&mut self, item: InventoryItem) -> Result<bool, StoreError>
    where
        Self: Sized,
    {
        let mut profile = self.load_profile();
        if !profile.inventory.take(item) {
            return Ok(false);
        }
        self.save_profile(&profile)?;
        Ok(true)
    }

    fn add_stars(&mut self, amount: u64) -> Result<u64, StoreError>
    where
        Self: Sized,
    {
        self.update_profile(|p| {
            p.add_stars(amount);
        })
        .map(|p| p.stars)
    }

    fn add_scales(&mut self, amount: u64) -> Result<u64, StoreError>
    where
        Self: Sized,
    {
        self.update_profile(|p| {
            p.add_scales(amount);
        })
        .map(|p| p.scales)
    }
}

/// `ProfileStore` over any key-value backend
pub struct ProfileVault<B: StorageBackend> {
    backend: B,
    rng: Pcg32,
    /// Host-provided name for a brand new profile
    username: Option<String>,
    /// Referral code the app was opened with
    referral: Option<String>,
}

pub type MemoryProfileStore = ProfileVault<MemoryBackend>;
#[cfg(target_arch = "wasm32")]
pub type LocalProfileStore = ProfileVault<LocalStorageBackend>;

impl<B: StorageBackend> ProfileVault<B> {
    pub fn new(backend: B, seed: u64) -> Self {
        Self {
            backend,
            rng: Pcg32::seed_from_u64(seed),
            username: None,
            referral: None,
        }
    }

    /// Identity used when a new profile has to be created
    pub fn with_identity(mut self, username: Option<String>, referral: Option<String>) -> Self {
        self.username = username;
        self.referral = referral;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn create_profile(&mut self) -> PlayerProfile {
        let profile = PlayerProfile::new_player(&mut self.rng, self.username.as_deref(), self.referral.as_deref());
        if let Err(e) = self.save_profile(&profile) {
            log::warn!("Failed to save new profile: {e}");
        }
        log::info!("Created profile {}", profile.user_id);
        profile
    }
}

impl MemoryProfileStore {
    pub fn in_memory(seed: u64) -> Self {
        Self::new(MemoryBackend::new(), seed)
    }
}

impl<B: StorageBackend> ProfileStore for ProfileVault<B> {
    fn load_profile(&mut self) -> PlayerProfile {
        let stored = match self.backend.get(PROFILE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Profile storage unreadable: {e}");
                None
            }
        };
        let Some(text) = stored else {
            return self.create_profile();
        };

        match envelope::open(&text) {
            Ok(envelope::Opened::Sealed(profile)) => profile,
            Ok(envelope::Opened::Legacy(profile)) => {
                log::info!("Migrating legacy profile {}", profile.user_id);
                if let Err(e) = self.save_profile(&profile) {
                    log::warn!("Failed to re-save migrated profile: {e}");
                }
                profile
            }
            Err(e) => {
                log::warn!("Resetting profile: {e}");
                self.create_profile()
            }
        }
    }

    fn save_profile(&mut self, profile: &PlayerProfile) -> Result<(), StoreError> {
        let mut profile = profile.clone();
        profile.updated_at = platform::now_ms() as u64;
        let text = envelope::seal(&profile)?;
        self.backend.set(PROFILE_KEY, &text)
    }

    fn best_score(&self) -> u64 {
        self.backend
            .get(BEST_SCORE_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set_best_score(&mut self, score: u64) -> Result<bool, StoreError> {
        if score <= self.best_score() {
            return Ok(false);
        }
        self.backend.set(BEST_SCORE_KEY, &score.to_string())?;
        Ok(true)
    }
}
