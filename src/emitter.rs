//! Emitter types - identity and record values
//!
//! An emitter is any radio source we can observe and key by a stable
//! identifier: a Wi-Fi access point (BSSID), a cell tower (cell ID
//! string), a Bluetooth beacon (MAC). The identity is immutable once
//! inserted; the record payload is what mutates over time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of RF emitter the store tracks.
///
/// Stored as text in the type column, so the string form is part of the
/// persisted layout and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitterType {
    /// Wi-Fi access point, identified by BSSID
    Wifi,
    /// Bluetooth beacon, identified by MAC address
    Bluetooth,
    /// Mobile cell, identified by a composite cell ID string
    Cell,
}

impl EmitterType {
    /// Get the string representation of the emitter type
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitterType::Wifi => "wifi",
            EmitterType::Bluetooth => "bluetooth",
            EmitterType::Cell => "cell",
        }
    }

    /// Get all emitter types
    pub fn all() -> &'static [EmitterType] {
        &[EmitterType::Wifi, EmitterType::Bluetooth, EmitterType::Cell]
    }
}

impl FromStr for EmitterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wifi" | "wlan" | "ap" => Ok(EmitterType::Wifi),
            "bluetooth" | "bt" | "ble" | "beacon" => Ok(EmitterType::Bluetooth),
            "cell" | "mobile" | "gsm" | "lte" => Ok(EmitterType::Cell),
            _ => Err(Error::UnknownType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EmitterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of an emitter: its type plus its unique identifier.
///
/// Value equality and hashing, so identities work as `HashSet` elements
/// and as the composite (id, type) primary key of the emitters table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmitterIdentity {
    /// The kind of radio source
    pub emitter_type: EmitterType,
    /// Type-specific unique identifier (BSSID, cell ID, MAC)
    pub id: String,
}

impl EmitterIdentity {
    /// Create a new identity
    pub fn new(emitter_type: EmitterType, id: impl Into<String>) -> Self {
        Self {
            emitter_type,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EmitterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.emitter_type, self.id)
    }
}

/// The mutable payload associated with an emitter identity.
///
/// Coordinates are WGS84 degrees but the store does not validate them;
/// `radius` is the position-uncertainty estimate in meters; `trust` is
/// an opaque score the caller raises and lowers. `note` is free text,
/// with the empty string as the canonical "no note" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub trust: i64,
    pub note: String,
}

impl EmitterRecord {
    /// Create a record with no note
    pub fn new(latitude: f64, longitude: f64, radius: f64, trust: i64) -> Self {
        Self {
            latitude,
            longitude,
            radius,
            trust,
            note: String::new(),
        }
    }

    /// Set the free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_type_roundtrip() {
        for t in EmitterType::all() {
            let s = t.as_str();
            let parsed: EmitterType = s.parse().unwrap();
            assert_eq!(*t, parsed);
        }
    }

    #[test]
    fn test_emitter_type_aliases() {
        assert_eq!(EmitterType::from_str("WLAN").unwrap(), EmitterType::Wifi);
        assert_eq!(EmitterType::from_str("ble").unwrap(), EmitterType::Bluetooth);
        assert_eq!(EmitterType::from_str("lte").unwrap(), EmitterType::Cell);
        assert!(EmitterType::from_str("sonar").is_err());
    }

    #[test]
    fn test_identity_equality() {
        let a = EmitterIdentity::new(EmitterType::Wifi, "00:11:22:33:44:55");
        let b = EmitterIdentity::new(EmitterType::Wifi, "00:11:22:33:44:55");
        let c = EmitterIdentity::new(EmitterType::Bluetooth, "00:11:22:33:44:55");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_record_builder() {
        let r = EmitterRecord::new(48.2, 16.4, 150.0, 10).with_note("university campus");
        assert_eq!(r.trust, 10);
        assert_eq!(r.note, "university campus");

        let bare = EmitterRecord::new(0.0, 0.0, 0.0, 0);
        assert_eq!(bare.note, "");
    }
}
