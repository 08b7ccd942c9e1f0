//! Hardware device abstraction layer for the voting kiosk.
//!
//! This crate provides trait-based abstractions for the kiosk peripherals:
//! a proximity-card reader, an indicator panel (authorize, reject, store
//! latch) and two vote buttons. The traits enable easy substitution between
//! mock implementations (for development and testing) and real drivers.
//!
//! # Layers
//!
//! - **Capabilities** ([`traits`]): what a chip or GPIO bank can do, with
//!   `Result`-returning async methods.
//! - **Leaf drivers**: [`CardReaderAdapter`], [`IndicatorDriver`] and
//!   [`ButtonInput`] put kiosk policy on top of a capability. They never
//!   return errors; hardware faults are logged and degrade to "no card",
//!   "not pressed" or "indicator unchanged".
//! - **Mocks** ([`mock`]): simulated peripherals with control handles.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use votekiosk_core::Button;
//! use votekiosk_hardware::mock::{MockButtons, MockIndicators};
//! use votekiosk_hardware::{ButtonInput, IndicatorDriver, Level};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (panel, lights) = MockIndicators::new();
//!     let mut indicators = IndicatorDriver::new(panel);
//!     indicators.set_authorize(true).await;
//!     assert!(lights.state().authorize);
//!
//!     let (panel, buttons) = MockButtons::new();
//!     let mut input = ButtonInput::new(panel, Level::Low, Duration::from_millis(1));
//!     buttons.press(Button::One);
//!     assert!(input.is_pressed(Button::One).await);
//! }
//! ```
//!
//! # Error Handling
//!
//! Capability methods return [`Result<T>`][error::Result] with the
//! [`HardwareError`] error type.

pub mod buttons;
pub mod error;
pub mod indicators;
pub mod mock;
pub mod reader;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use buttons::ButtonInput;
pub use error::{HardwareError, Result};
pub use indicators::IndicatorDriver;
pub use reader::CardReaderAdapter;
pub use traits::{ButtonPanel, CardReader, IndicatorPanel};
pub use types::{DeviceInfo, Indicator, IndicatorSet, Level, ReaderInfo};
