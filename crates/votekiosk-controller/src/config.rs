//! Controller timing configuration.
//!
//! Every field is optional in the JSON form; missing fields take the
//! defaults from [`votekiosk_core::constants`].
//!
//! ```json
//! {
//!   "decision_timeout_ms": 20000,
//!   "button_active_level": "high"
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use votekiosk_core::constants::{
    DEFAULT_DEBOUNCE_SETTLE_MS, DEFAULT_DECISION_TIMEOUT_MS, DEFAULT_DENY_HOLD_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_VOTE_GUARD_MS,
};
use votekiosk_core::{Error, Result};
use votekiosk_hardware::Level;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// How long the host has to answer a `CHECK`.
    pub decision_timeout_ms: u64,

    /// How long the reject indicator stays lit after `DENY`.
    pub deny_hold_ms: u64,

    /// Pause after a vote, during which nothing else is serviced.
    pub vote_guard_ms: u64,

    /// Delay between the two debounce samples of a button.
    pub debounce_settle_ms: u64,

    /// Period of the control loop.
    pub poll_interval_ms: u64,

    /// Input level that means "pressed".
    pub button_active_level: Level,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            decision_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            deny_hold_ms: DEFAULT_DENY_HOLD_MS,
            vote_guard_ms: DEFAULT_VOTE_GUARD_MS,
            debounce_settle_ms: DEFAULT_DEBOUNCE_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            button_active_level: Level::Low,
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON is malformed, has unknown
    /// fields, or fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero decision timeout or a zero poll
    /// interval.
    pub fn validate(&self) -> Result<()> {
        if self.decision_timeout_ms == 0 {
            return Err(Error::Config(
                "decision_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    pub fn deny_hold(&self) -> Duration {
        Duration::from_millis(self.deny_hold_ms)
    }

    pub fn vote_guard(&self) -> Duration {
        Duration::from_millis(self.vote_guard_ms)
    }

    pub fn debounce_settle(&self) -> Duration {
        Duration::from_millis(self.debounce_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();

        assert_eq!(config.decision_timeout(), Duration::from_secs(15));
        assert_eq!(config.deny_hold(), Duration::from_millis(700));
        assert_eq!(config.vote_guard(), Duration::from_millis(300));
        assert_eq!(config.debounce_settle(), Duration::from_millis(50));
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.button_active_level, Level::Low);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ControllerConfig::from_json_str(
            r#"{ "decision_timeout_ms": 20000, "button_active_level": "high" }"#,
        )
        .unwrap();

        assert_eq!(config.decision_timeout_ms, 20_000);
        assert_eq!(config.button_active_level, Level::High);
        assert_eq!(config.deny_hold_ms, DEFAULT_DENY_HOLD_MS);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = ControllerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[rstest]
    #[case(r#"{ "decision_timeout_ms": 0 }"#)]
    #[case(r#"{ "poll_interval_ms": 0 }"#)]
    #[case(r#"{ "button_active_level": "floating" }"#)]
    #[case(r#"{ "deny_hold": 700 }"#)]
    #[case("not json")]
    fn test_rejected_configs(#[case] json: &str) {
        assert!(matches!(
            ControllerConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ControllerConfig::from_file("/nonexistent/votekiosk.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "votekiosk-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "vote_guard_ms": 500 }"#).unwrap();

        let config = ControllerConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.vote_guard(), Duration::from_millis(500));
    }
}
