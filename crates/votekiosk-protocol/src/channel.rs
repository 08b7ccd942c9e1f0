//! Message channel abstraction for the host link.
//!
//! The kiosk loop exchanges at most one inbound line per iteration and never
//! waits for the host, so the read side is a non-blocking poll. Writes may
//! wait for the transport but are delivered in order, one line per call.
//!
//! Like the device traits, [`MessageChannel`] uses native `async fn`
//! methods and is not object-safe; [`AnyChannel`] provides concrete type
//! dispatch when the transport is chosen at runtime.

#![allow(async_fn_in_trait)]

use futures::{FutureExt, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

use votekiosk_core::{Error, Event, Result};

use crate::codec::LineCodec;
use crate::mock::MockChannel;
use crate::serial::SerialChannel;

/// Line-oriented, bidirectional link to the host controller.
pub trait MessageChannel: Send {
    /// Return the next complete inbound line, if one is already buffered.
    ///
    /// The line has its terminator removed and surrounding whitespace
    /// trimmed. Never waits for data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] once the host has gone away, or an
    /// I/O error from the transport.
    async fn try_read_line(&mut self) -> Result<Option<String>>;

    /// Write one line; the terminator is appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] or an I/O error if the line cannot
    /// be delivered.
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Write an outbound event in wire format.
    async fn send_event(&mut self, event: &Event) -> Result<()> {
        self.write_line(&event.to_string()).await
    }
}

/// Message channel over any async byte stream, framed with [`LineCodec`].
///
/// # Example
///
/// ```
/// use tokio::io::{AsyncReadExt, AsyncWriteExt};
/// use votekiosk_core::Event;
/// use votekiosk_protocol::{FramedChannel, MessageChannel};
///
/// #[tokio::main]
/// async fn main() -> votekiosk_core::Result<()> {
///     let (kiosk, mut host) = tokio::io::duplex(256);
///     let mut channel = FramedChannel::new(kiosk);
///
///     channel.send_event(&Event::Ready).await?;
///
///     let mut buf = [0u8; 6];
///     host.read_exact(&mut buf).await?;
///     assert_eq!(&buf, b"READY\n");
///
///     host.write_all(b"ALLOW\n").await?;
///     tokio::task::yield_now().await;
///     assert_eq!(channel.try_read_line().await?.as_deref(), Some("ALLOW"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FramedChannel<T> {
    framed: Framed<T, LineCodec>,
}

impl<T> FramedChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(io: T) -> Self {
        Self::with_codec(io, LineCodec::new())
    }

    pub fn with_codec(io: T, codec: LineCodec) -> Self {
        Self {
            framed: Framed::new(io, codec),
        }
    }

    pub fn get_ref(&self) -> &T {
        self.framed.get_ref()
    }

    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }
}

impl<T> MessageChannel for FramedChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn try_read_line(&mut self) -> Result<Option<String>> {
        // Framed keeps partial input in its buffer, so dropping a pending
        // `next()` loses nothing.
        match self.framed.next().now_or_never() {
            None => Ok(None),
            Some(Some(line)) => line.map(Some),
            Some(None) => {
                debug!("Host closed the connection");
                Err(Error::ChannelClosed)
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.framed.send(line.to_string()).await
    }
}

/// Enum wrapper for message channel dispatch.
///
/// The CLI picks the transport at runtime (TCP or serial); tests use the
/// in-memory mock. All three are reachable through one concrete type.
///
/// # Examples
///
/// ```
/// use votekiosk_protocol::{AnyChannel, MessageChannel};
/// use votekiosk_protocol::mock::MockChannel;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_core::Result<()> {
///     let (channel, host) = MockChannel::new();
///     let mut channel = AnyChannel::Mock(channel);
///
///     channel.write_line("READY").await?;
///     assert_eq!(host.sent(), vec!["READY"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyChannel {
    /// Host link over TCP.
    Tcp(FramedChannel<TcpStream>),
    /// Host link over a serial device.
    Serial(SerialChannel),
    /// In-memory link for development and testing.
    Mock(MockChannel),
}

impl MessageChannel for AnyChannel {
    async fn try_read_line(&mut self) -> Result<Option<String>> {
        match self {
            Self::Tcp(channel) => channel.try_read_line().await,
            Self::Serial(channel) => channel.try_read_line().await,
            Self::Mock(channel) => channel.try_read_line().await,
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        match self {
            Self::Tcp(channel) => channel.write_line(line).await,
            Self::Serial(channel) => channel.write_line(line).await,
            Self::Mock(channel) => channel.write_line(line).await,
        }
    }
}

impl From<TcpStream> for AnyChannel {
    fn from(stream: TcpStream) -> Self {
        Self::Tcp(FramedChannel::new(stream))
    }
}

impl From<SerialChannel> for AnyChannel {
    fn from(channel: SerialChannel) -> Self {
        Self::Serial(channel)
    }
}

impl From<MockChannel> for AnyChannel {
    fn from(channel: MockChannel) -> Self {
        Self::Mock(channel)
    }
}
