//! Checksummed profile envelope
//!
//! Stored form: `{"d": <profile>, "h": "<hex digest>"}`. The digest makes
//! casual edits in dev tools detectable; it is not a security boundary.
//! Older saves without the wrapper are migrated on read.
//!
//! The digest covers the exact text of `d` as stored, so saves written by
//! the JavaScript client (insertion-ordered keys) verify unchanged.

use serde::{Deserialize, Serialize};
use serde_json::value::{RawValue, to_raw_value};
use serde_json::{Value, json};

use super::StoreError;
use crate::profile::PlayerProfile;

const SALT: &str = "gdx_secure_v1_";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    d: Box<RawValue>,
    h: String,
}

/// Integrity digest of compact JSON text, hashed over UTF-16 code units
pub fn checksum(json: &str) -> String {
    let mut h: u32 = 0xdead_beef;
    for unit in json.encode_utf16().chain(SALT.encode_utf16()) {
        h = (h ^ unit as u32).wrapping_mul(2_654_435_761);
    }
    format!("{:x}", h ^ (h >> 16))
}

/// Wrap a profile for storage
pub fn seal(profile: &PlayerProfile) -> Result<String, StoreError> {
    let d = to_raw_value(profile)?;
    let h = checksum(d.get());
    Ok(serde_json::to_string(&Envelope { d, h })?)
}

/// What was found under the profile key
#[derive(Debug)]
pub enum Opened {
    /// Intact envelope
    Sealed(PlayerProfile),
    /// Bare pre-envelope document; should be re-saved sealed
    Legacy(PlayerProfile),
}

impl Opened {
    pub fn into_profile(self) -> PlayerProfile {
        match self {
            Opened::Sealed(p) | Opened::Legacy(p) => p,
        }
    }
}

/// Unwrap and verify a stored profile
pub fn open(text: &str) -> Result<Opened, StoreError> {
    let mut doc: Value = serde_json::from_str(text)?;

    if doc.get("d").is_some() && doc.get("h").is_some() {
        let envelope: Envelope = serde_json::from_str(text)?;
        if checksum(envelope.d.get()) != envelope.h {
            return Err(StoreError::Tampered);
        }
        return Ok(Opened::Sealed(serde_json::from_str(envelope.d.get())?));
    }

    if doc.get("userId").is_some() {
        // Legacy saves predate the starter pack: missing items mean none
        if let Some(obj) = doc.as_object_mut() {
            let inventory = obj
                .entry("inventory")
                .or_insert_with(|| json!({ "freeze": 0, "shield": 0, "magnet": 0 }));
            if let Some(inv) = inventory.as_object_mut() {
                inv.entry("refill_hearts").or_insert(json!(0));
            }
        }
        return Ok(Opened::Legacy(serde_json::from_value(doc)?));
    }

    Err(StoreError::Tampered)
}
