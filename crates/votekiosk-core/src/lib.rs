//! Shared types for the voting kiosk controller.
//!
//! Defines the card [`Identifier`], the host line protocol ([`Command`] in,
//! [`Event`] out), the vote [`Button`]s and the workspace-wide [`Error`].

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
