//! Hardware device trait definitions.
//!
//! These traits are the raw capabilities the kiosk needs from its
//! peripherals: a proximity-card reader, an indicator panel and a pair of
//! momentary buttons. They deliberately stay close to what the chips expose;
//! the policy on top (release the card after every read, debounce, swallow
//! faults) lives in [`CardReaderAdapter`](crate::CardReaderAdapter),
//! [`IndicatorDriver`](crate::IndicatorDriver) and
//! [`ButtonInput`](crate::ButtonInput).
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro. Every method must return
//! promptly: the kiosk polls these from a single loop and never expects a
//! call to wait for a card or a key press.

#![allow(async_fn_in_trait)]

use votekiosk_core::Button;

use crate::error::Result;
use crate::types::{DeviceInfo, Indicator, Level, ReaderInfo};

/// Proximity-card reader capability (MFRC522-style).
///
/// A read is a four-step conversation with the chip: probe for a new card,
/// select it and read its serial number, then halt the card and stop any
/// crypto session so the next probe can see a card again.
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use votekiosk_hardware::traits::CardReader;
/// use votekiosk_hardware::error::Result;
///
/// async fn read_once<R: CardReader>(reader: &mut R) -> Result<Option<Vec<u8>>> {
///     if !reader.is_new_card_present().await? {
///         return Ok(None);
///     }
///     let uid = reader.read_uid().await?;
///     reader.halt().await?;
///     reader.stop_crypto().await?;
///     Ok(Some(uid))
/// }
/// ```
pub trait CardReader: Send {
    /// Probe the RF field for a card that has not been read yet.
    ///
    /// A card that was halted stays silent until it leaves and re-enters
    /// the field, so a card resting on the reader is reported once.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond.
    async fn is_new_card_present(&mut self) -> Result<bool>;

    /// Select the card found by the last probe and return its UID bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no card is selected or the anticollision loop fails.
    async fn read_uid(&mut self) -> Result<Vec<u8>>;

    /// Put the selected card into the HALT state.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond.
    async fn halt(&mut self) -> Result<()>;

    /// Stop any transport-level crypto session with the card.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond.
    async fn stop_crypto(&mut self) -> Result<()>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be queried.
    async fn get_reader_info(&self) -> Result<ReaderInfo>;
}

/// Indicator panel capability: three independent on/off outputs.
pub trait IndicatorPanel: Send {
    /// Drive one indicator output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    async fn set_indicator(&mut self, indicator: Indicator, lit: bool) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Button panel capability: raw level reads of the two vote buttons.
///
/// Inputs are level-sampled, never edge-triggered; debounce is applied by
/// [`ButtonInput`](crate::ButtonInput).
pub trait ButtonPanel: Send {
    /// Sample the current logic level of a button input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    async fn read_level(&mut self, button: Button) -> Result<Level>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
