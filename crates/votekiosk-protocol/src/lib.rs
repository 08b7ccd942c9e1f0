//! Host link for the voting kiosk.
//!
//! Newline-delimited text messages over TCP, serial or an in-memory mock,
//! behind one [`MessageChannel`] trait.

pub mod channel;
pub mod codec;
pub mod mock;
pub mod serial;

pub use channel::{AnyChannel, FramedChannel, MessageChannel};
pub use codec::LineCodec;
pub use mock::{MockChannel, MockChannelHandle};
pub use serial::SerialChannel;
