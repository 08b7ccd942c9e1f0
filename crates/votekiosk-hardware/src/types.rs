//! Common types shared across hardware device implementations.
//!
//! This module defines device metadata, the kiosk's indicator outputs and
//! the raw logic level read from button inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a peripheral such as name, model and firmware
/// version. Logged once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Indicator Panel", "Mock Buttons").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Proximity card reader information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Optional reader firmware version byte, as reported by the chip.
    pub version: Option<u8>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            version: None,
        }
    }

    /// Set the reader firmware version.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }
}

/// One of the kiosk's three indicator outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Lit while the host has authorized the current card.
    Authorize,

    /// Blinks once when the host denies a card.
    Reject,

    /// Latch lit by `STORE`; only `CLEAR` turns it off.
    Store,
}

impl Indicator {
    /// All indicators, in wiring order.
    pub const ALL: [Indicator; 3] = [Indicator::Authorize, Indicator::Reject, Indicator::Store];
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorize => write!(f, "authorize"),
            Self::Reject => write!(f, "reject"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Snapshot of the three indicator outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub authorize: bool,
    pub reject: bool,
    pub store: bool,
}

impl IndicatorSet {
    /// Whether the given indicator is lit.
    pub fn is_lit(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Authorize => self.authorize,
            Indicator::Reject => self.reject,
            Indicator::Store => self.store,
        }
    }

    /// Record the state of one indicator.
    pub fn set(&mut self, indicator: Indicator, lit: bool) {
        match indicator {
            Indicator::Authorize => self.authorize = lit,
            Indicator::Reject => self.reject = lit,
            Indicator::Store => self.store = lit,
        }
    }

    /// True when nothing is lit.
    pub fn is_dark(&self) -> bool {
        !(self.authorize || self.reject || self.store)
    }
}

impl fmt::Display for IndicatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |lit: bool| if lit { "on" } else { "off" };
        write!(
            f,
            "authorize={} reject={} store={}",
            mark(self.authorize),
            mark(self.reject),
            mark(self.store)
        )
    }
}

/// Raw logic level of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    pub fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Indicator Panel", "GPIO").with_firmware_version("1.0.0");

        assert_eq!(info.name, "Indicator Panel");
        assert_eq!(info.model, "GPIO");
        assert_eq!(info.firmware_version, Some("1.0.0".to_string()));
    }

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()]).with_version(0x92);

        assert_eq!(info.name, "MFRC522");
        assert_eq!(info.protocols, vec!["ISO14443A"]);
        assert_eq!(info.version, Some(0x92));
    }

    #[test]
    fn test_indicator_set_defaults_dark() {
        let set = IndicatorSet::default();
        assert!(set.is_dark());
        for indicator in Indicator::ALL {
            assert!(!set.is_lit(indicator));
        }
    }

    #[test]
    fn test_indicator_set_set_and_display() {
        let mut set = IndicatorSet::default();
        set.set(Indicator::Store, true);
        set.set(Indicator::Authorize, true);

        assert!(set.is_lit(Indicator::Store));
        assert!(!set.is_lit(Indicator::Reject));
        assert_eq!(set.to_string(), "authorize=on reject=off store=on");
    }

    #[test]
    fn test_level_serialization() {
        assert_eq!(serde_json::to_string(&Level::Low).unwrap(), "\"low\"");
        let level: Level = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, Level::High);
        assert_eq!(level.inverted(), Level::Low);
    }
}
