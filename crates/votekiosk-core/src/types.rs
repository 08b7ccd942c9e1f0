use crate::{
    Result,
    constants::{
        CMD_ALLOW, CMD_CLEAR, CMD_DENY, CMD_ENABLE_VOTING, CMD_RESET_CARD, CMD_STORE, EVT_ALLOWED,
        EVT_CHECK, EVT_DENIED, EVT_ENABLED, EVT_READY, EVT_RESET_CARD, EVT_STORED, EVT_TIMEOUT,
        EVT_VOTE, MAX_UID_LENGTH, MIN_UID_LENGTH, PAYLOAD_SEPARATOR,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card unique identifier (4-10 bytes, reader byte order).
///
/// Rendered on the wire as uppercase hex, two digits per byte, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>")]
pub struct Identifier(Vec<u8>);

impl Identifier {
    /// Create a new identifier with length validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentifier` if the UID is not 4-10 bytes long.
    pub fn new(uid: Vec<u8>) -> Result<Self> {
        let len = uid.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidIdentifier(format!(
                "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {len}"
            )));
        }
        Ok(Identifier(uid))
    }

    /// Create an identifier from a borrowed byte slice.
    pub fn from_slice(uid: &[u8]) -> Result<Self> {
        Self::new(uid.to_vec())
    }

    /// Parse an identifier from its hex rendering (case-insensitive).
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentifier` on odd length, non-hex digits or a
    /// decoded length outside 4-10 bytes.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 {
            return Err(Error::InvalidIdentifier(format!(
                "Hex identifier must have an even number of digits, got {}",
                hex.len()
            )));
        }

        // from_str_radix would accept a leading '+', so check digits up front
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidIdentifier(format!(
                "Invalid hex digits in {hex}"
            )));
        }

        let bytes = hex
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| Error::InvalidIdentifier(format!("Invalid hex digits in {hex}")))
            })
            .collect::<Result<Vec<u8>>>()?;

        Self::new(bytes)
    }

    /// Raw UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the UID.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; identifiers carry at least four bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex rendering used on the wire (`9E863AAA`).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<u8>> for Identifier {
    type Error = Error;

    fn try_from(uid: Vec<u8>) -> Result<Self> {
        Identifier::new(uid)
    }
}

impl std::str::FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Identifier::from_hex(s)
    }
}

/// Vote button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    One = 1,
    Two = 2,
}

impl Button {
    /// Both buttons, in polling order.
    pub const ALL: [Button; 2] = [Button::One, Button::Two];

    /// Wire number of the button (1 or 2).
    #[must_use]
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Zero-based index, for per-button arrays.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Button::One),
            2 => Some(Button::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Inbound host command.
///
/// Parsing never fails: anything that is not an exact known token becomes
/// [`Command::Unknown`], which the kiosk ignores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    EnableVoting,
    Allow,
    Deny,
    ResetCard,
    Store,
    Clear,
    Unknown(String),
}

impl Command {
    /// Parse one received line. Surrounding whitespace is trimmed first.
    ///
    /// ```
    /// use votekiosk_core::Command;
    ///
    /// assert_eq!(Command::parse(" ALLOW\r"), Command::Allow);
    /// assert_eq!(Command::parse("allow"), Command::Unknown("allow".to_string()));
    /// ```
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            CMD_ENABLE_VOTING => Command::EnableVoting,
            CMD_ALLOW => Command::Allow,
            CMD_DENY => Command::Deny,
            CMD_RESET_CARD => Command::ResetCard,
            CMD_STORE => Command::Store,
            CMD_CLEAR => Command::Clear,
            other => Command::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Command::Unknown(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let token = match self {
            Command::EnableVoting => CMD_ENABLE_VOTING,
            Command::Allow => CMD_ALLOW,
            Command::Deny => CMD_DENY,
            Command::ResetCard => CMD_RESET_CARD,
            Command::Store => CMD_STORE,
            Command::Clear => CMD_CLEAR,
            Command::Unknown(raw) => raw.as_str(),
        };
        f.write_str(token)
    }
}

/// Outbound event sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Ready,
    Check(Identifier),
    Allowed,
    Denied,
    Stored,
    ResetCard,
    Timeout,
    Enabled,
    Vote(Button),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Ready => f.write_str(EVT_READY),
            Event::Check(id) => write!(f, "{EVT_CHECK}{PAYLOAD_SEPARATOR}{id}"),
            Event::Allowed => f.write_str(EVT_ALLOWED),
            Event::Denied => f.write_str(EVT_DENIED),
            Event::Stored => f.write_str(EVT_STORED),
            Event::ResetCard => f.write_str(EVT_RESET_CARD),
            Event::Timeout => f.write_str(EVT_TIMEOUT),
            Event::Enabled => f.write_str(EVT_ENABLED),
            Event::Vote(button) => write!(f, "{EVT_VOTE}{PAYLOAD_SEPARATOR}{button}"),
        }
    }
}
