//! Mock device implementations for testing and development.
//!
//! This module provides simulated peripherals that can be controlled
//! programmatically through handles, without requiring physical hardware.

pub mod buttons;
pub mod indicators;
pub mod reader;

// Re-export commonly used types
pub use buttons::{MockButtons, MockButtonsHandle};
pub use indicators::{MockIndicators, MockIndicatorsHandle};
pub use reader::{MockCardReader, MockCardReaderHandle};
