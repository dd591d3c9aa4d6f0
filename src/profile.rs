//! Player profile snapshot
//!
//! The match controller only ever sees an immutable copy of this. Field names
//! follow the stored JSON (camelCase) and every field has a default, so older
//! or partial documents load without errors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::BoostKind;

/// Referral bonus for a brand new player
pub const REFERRAL_BONUS_SCALES: u64 = 20;

const USER_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const USER_ID_LEN: usize = 12;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Language {
    Ru,
    #[default]
    En,
    De,
    Ar,
    Uk,
    Pl,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
            Language::De => "de",
            Language::Ar => "ar",
            Language::Uk => "uk",
            Language::Pl => "pl",
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        match code.as_str() {
            "ru" => Language::Ru,
            "de" => Language::De,
            "ar" => Language::Ar,
            "uk" => Language::Uk,
            "pl" => Language::Pl,
            _ => Language::En,
        }
    }
}

impl From<Language> for &'static str {
    fn from(lang: Language) -> Self {
        lang.as_str()
    }
}

/// Purchased dragon upgrades
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkinProfile {
    /// 0 = not owned
    pub tail_tier: u8,
    pub wings_tier: u8,
    pub legs_tier: u8,
    pub iron_body_owned: bool,
    pub crystal_body_owned: bool,
}

/// Consumable item slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryItem {
    Freeze,
    Shield,
    Magnet,
    RefillHearts,
}

impl From<BoostKind> for InventoryItem {
    fn from(kind: BoostKind) -> Self {
        match kind {
            BoostKind::Freeze => InventoryItem::Freeze,
            BoostKind::Magnet => InventoryItem::Magnet,
            BoostKind::Shield => InventoryItem::Shield,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub freeze: u32,
    pub shield: u32,
    pub magnet: u32,
    pub refill_hearts: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            freeze: 5,
            shield: 3,
            magnet: 3,
            refill_hearts: 0,
        }
    }
}

impl Inventory {
    fn slot_mut(&mut self, item: InventoryItem) -> &mut u32 {
        match item {
            InventoryItem::Freeze => &mut self.freeze,
            InventoryItem::Shield => &mut self.shield,
            InventoryItem::Magnet => &mut self.magnet,
            InventoryItem::RefillHearts => &mut self.refill_hearts,
        }
    }

    pub fn count(&self, item: InventoryItem) -> u32 {
        match item {
            InventoryItem::Freeze => self.freeze,
            InventoryItem::Shield => self.shield,
            InventoryItem::Magnet => self.magnet,
            InventoryItem::RefillHearts => self.refill_hearts,
        }
    }

    /// Consume one item; false if none are left
    pub fn take(&mut self, item: InventoryItem) -> bool {
        let slot = self.slot_mut(item);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn add(&mut self, item: InventoryItem, amount: u32) {
        let slot = self.slot_mut(item);
        *slot = slot.saturating_add(amount);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    pub user_id: String,
    pub username: String,
    pub is_onboarded: bool,
    pub language: Language,
    /// Premium currency
    pub stars: u64,
    /// Soft currency
    pub scales: u64,
    pub skins: SkinProfile,
    pub inventory: Inventory,
    pub referral_applied: bool,
    pub referred_by: Option<String>,
    /// Last save time (ms since epoch)
    pub updated_at: u64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            username: "Player".to_string(),
            is_onboarded: false,
            language: Language::En,
            stars: 1000,
            scales: 1000,
            skins: SkinProfile::default(),
            inventory: Inventory::default(),
            referral_applied: false,
            referred_by: None,
            updated_at: 0,
        }
    }
}

impl PlayerProfile {
    /// A new player's profile, optionally credited for arriving via a referral code
    pub fn new_player<R: Rng>(rng: &mut R, username: Option<&str>, referral: Option<&str>) -> Self {
        let mut profile = Self {
            user_id: generate_user_id(rng),
            ..Self::default()
        };
        if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
            profile.username = name.to_string();
        }
        if let Some(code) = referral.filter(|c| !c.is_empty() && *c != profile.user_id) {
            profile.scales += REFERRAL_BONUS_SCALES;
            profile.referral_applied = true;
            profile.referred_by = Some(code.to_string());
            log::info!("New player joined via referral {code}");
        }
        profile
    }

    pub fn add_stars(&mut self, amount: u64) -> u64 {
        self.stars = self.stars.saturating_add(amount);
        self.stars
    }

    pub fn add_scales(&mut self, amount: u64) -> u64 {
        self.scales = self.scales.saturating_add(amount);
        self.scales
    }

    /// Score multiplier from the crystal body upgrade
    pub fn score_multiplier(&self, crystal_multiplier: f32) -> f32 {
        if self.skins.crystal_body_owned {
            crystal_multiplier
        } else {
            1.0
        }
    }
}

/// Random 12-character uppercase alphanumeric id
pub fn generate_user_id<R: Rng>(rng: &mut R) -> String {
    (0..USER_ID_LEN)
        .map(|_| USER_ID_ALPHABET[rng.random_range(0..USER_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile: PlayerProfile =
            serde_json::from_str(r#"{ "userId": "ABC", "skins": { "tailTier": 2 }, "language": "xx" }"#).unwrap();
        assert_eq!(profile.user_id, "ABC");
        assert_eq!(profile.skins.tail_tier, 2);
        assert!(!profile.skins.iron_body_owned);
        assert_eq!(profile.language, Language::En);
        assert_eq!(profile.inventory, Inventory::default());
        assert_eq!(profile.stars, 1000);
    }

    #[test]
    fn test_inventory_take() {
        let mut inv = Inventory::default();
        assert!(!inv.take(InventoryItem::RefillHearts));
        assert!(inv.take(InventoryItem::Magnet));
        assert_eq!(inv.count(InventoryItem::Magnet), 2);
        inv.add(InventoryItem::RefillHearts, 2);
        assert!(inv.take(InventoryItem::RefillHearts));
        assert_eq!(inv.refill_hearts, 1);
    }

    #[test]
    fn test_new_player_referral() {
        let mut rng = Pcg32::seed_from_u64(3);
        let profile = PlayerProfile::new_player(&mut rng, Some("ember"), Some("FRIEND123456"));
        assert_eq!(profile.user_id.len(), 12);
        assert!(profile.user_id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(profile.username, "ember");
        assert_eq!(profile.scales, 1000 + REFERRAL_BONUS_SCALES);
        assert_eq!(profile.referred_by.as_deref(), Some("FRIEND123456"));

        let plain = PlayerProfile::new_player(&mut rng, Some("  "), None);
        assert_eq!(plain.username, "Player");
        assert!(!plain.referral_applied);
    }

    #[test]
    fn test_own_referral_code_after_decoding() {
        let own_id = generate_user_id(&mut Pcg32::seed_from_u64(4));
        let search = format!("?ref={}", own_id.replace('A', "%41"));
        let code = crate::platform::query_param(&search, "ref");
        assert_eq!(code.as_deref(), Some(own_id.as_str()));

        let profile = PlayerProfile::new_player(&mut Pcg32::seed_from_u64(4), None, code.as_deref());
        assert_eq!(profile.user_id, own_id);
        assert!(!profile.referral_applied);
        assert_eq!(profile.scales, 1000);
    }

    #[test]
    fn test_camel_case_round_trip_keys() {
        let json = serde_json::to_value(PlayerProfile::default()).unwrap();
        assert!(json.get("isOnboarded").is_some());
        assert!(json["inventory"].get("refill_hearts").is_some());
        assert!(json["skins"].get("crystalBodyOwned").is_some());
    }
}
