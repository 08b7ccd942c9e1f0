//! Protocol and timing constants for the kiosk line protocol.
//!
//! The kiosk talks to its host over a line-oriented text channel. Every
//! message is a single token (optionally followed by `:` and a payload)
//! terminated by a newline:
//!
//! ```text
//! CHECK:9E863AAA\n
//! ALLOW\n
//! VOTE:2\n
//! ```
//!
//! Tokens are case-sensitive and matched exactly after surrounding whitespace
//! is trimmed. Anything that is not a known inbound token is ignored.
//!
//! # Usage
//!
//! ```
//! use votekiosk_core::constants::*;
//!
//! assert_eq!(CMD_ALLOW, "ALLOW");
//! assert_eq!(format!("{EVT_CHECK}{PAYLOAD_SEPARATOR}9E863AAA"), "CHECK:9E863AAA");
//! ```

// ============================================================================
// Framing
// ============================================================================

/// Line terminator for every message in both directions.
pub const LINE_TERMINATOR: char = '\n';

/// Separator between an event token and its payload (`CHECK:<id>`, `VOTE:<n>`).
pub const PAYLOAD_SEPARATOR: char = ':';

/// Longest inbound line accepted, in bytes, excluding the terminator.
///
/// The longest legitimate inbound token is `ENABLE_VOTING`; anything past
/// this limit is noise on the wire and is discarded up to the next newline.
pub const MAX_LINE_LENGTH: usize = 256;

// ============================================================================
// Inbound commands (host -> kiosk)
// ============================================================================

/// Clear the session without touching indicators.
pub const CMD_ENABLE_VOTING: &str = "ENABLE_VOTING";

/// Host authorizes the card that was last checked.
pub const CMD_ALLOW: &str = "ALLOW";

/// Host rejects the card that was last checked.
pub const CMD_DENY: &str = "DENY";

/// Abort the current card session.
pub const CMD_RESET_CARD: &str = "RESET_CARD";

/// Host confirms the vote was stored; lights the store latch.
pub const CMD_STORE: &str = "STORE";

/// Clear the store latch and return to idle.
pub const CMD_CLEAR: &str = "CLEAR";

// ============================================================================
// Outbound events (kiosk -> host)
// ============================================================================

/// Kiosk is idle and scanning for cards.
pub const EVT_READY: &str = "READY";

/// Card detected; payload is the uppercase hex identifier.
pub const EVT_CHECK: &str = "CHECK";

/// Acknowledges `ALLOW`.
pub const EVT_ALLOWED: &str = "ALLOWED";

/// Acknowledges `DENY` once the reject blink has finished.
pub const EVT_DENIED: &str = "DENIED";

/// Acknowledges `STORE`.
pub const EVT_STORED: &str = "STORED";

/// Acknowledges `RESET_CARD` and `CLEAR`.
pub const EVT_RESET_CARD: &str = "RESET_CARD";

/// No decision arrived before the safety deadline.
pub const EVT_TIMEOUT: &str = "TIMEOUT";

/// Acknowledges `ENABLE_VOTING`.
pub const EVT_ENABLED: &str = "ENABLED";

/// Button press while authorized; payload is the button number.
pub const EVT_VOTE: &str = "VOTE";

// ============================================================================
// Identifier limits
// ============================================================================

/// Minimum card UID length in bytes (ISO 14443 single-size UID).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum card UID length in bytes (ISO 14443 triple-size UID).
pub const MAX_UID_LENGTH: usize = 10;

// ============================================================================
// Default timings (milliseconds)
// ============================================================================

/// How long the kiosk waits for `ALLOW`/`DENY` after sending `CHECK`.
///
/// The host may run face verification for up to ten seconds before it
/// answers, so the deadline leaves headroom above that.
pub const DEFAULT_DECISION_TIMEOUT_MS: u64 = 15_000;

/// How long the reject indicator stays lit after `DENY`.
pub const DEFAULT_DENY_HOLD_MS: u64 = 700;

/// Guard delay after a vote is emitted.
pub const DEFAULT_VOTE_GUARD_MS: u64 = 300;

/// Delay between the two samples of a button debounce.
pub const DEFAULT_DEBOUNCE_SETTLE_MS: u64 = 50;

/// Period of the main poll loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
