//! In-memory message channel for development and testing.
//!
//! [`MockChannel`] is handed to the kiosk; the paired [`MockChannelHandle`]
//! plays the host: it queues inbound lines and inspects what the kiosk sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use votekiosk_core::{Error, Result};

use crate::channel::MessageChannel;

#[derive(Debug, Default)]
struct ChannelState {
    inbound: VecDeque<String>,
    outbound: Vec<String>,
    closed: bool,
}

type SharedState = Arc<Mutex<ChannelState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ChannelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Kiosk side of an in-memory host link.
///
/// # Example
///
/// ```
/// use votekiosk_protocol::MessageChannel;
/// use votekiosk_protocol::mock::MockChannel;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_core::Result<()> {
///     let (mut channel, host) = MockChannel::new();
///
///     host.send_line(" DENY \n");
///     assert_eq!(channel.try_read_line().await?.as_deref(), Some("DENY"));
///     assert_eq!(channel.try_read_line().await?, None);
///
///     channel.write_line("DENIED").await?;
///     assert_eq!(host.sent(), vec!["DENIED"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockChannel {
    state: SharedState,
}

impl MockChannel {
    pub fn new() -> (Self, MockChannelHandle) {
        let state = SharedState::default();
        let handle = MockChannelHandle {
            state: Arc::clone(&state),
        };
        (Self { state }, handle)
    }
}

impl MessageChannel for MockChannel {
    async fn try_read_line(&mut self) -> Result<Option<String>> {
        let mut state = lock(&self.state);
        match state.inbound.pop_front() {
            Some(line) => Ok(Some(line)),
            None if state.closed => Err(Error::ChannelClosed),
            None => Ok(None),
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(Error::ChannelClosed);
        }
        trace!("-> {:?}", line);
        state.outbound.push(line.to_string());
        Ok(())
    }
}

/// Host side of a [`MockChannel`].
#[derive(Debug, Clone)]
pub struct MockChannelHandle {
    state: SharedState,
}

impl MockChannelHandle {
    /// Queue one inbound line. The terminator and surrounding whitespace are
    /// stripped, as a real link would.
    pub fn send_line(&self, line: &str) {
        lock(&self.state).inbound.push_back(line.trim().to_string());
    }

    /// Number of inbound lines not yet consumed by the kiosk.
    pub fn pending(&self) -> usize {
        lock(&self.state).inbound.len()
    }

    /// Every line the kiosk has written, in order.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).outbound.clone()
    }

    /// Take the lines written so far, leaving the log empty.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut lock(&self.state).outbound)
    }

    /// Hang up. Queued inbound lines can still be read; after that every
    /// call fails with [`Error::ChannelClosed`].
    pub fn close(&self) {
        lock(&self.state).closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_delivered_in_order() {
        let (mut channel, host) = MockChannel::new();

        host.send_line("STORE");
        host.send_line("CLEAR");
        assert_eq!(host.pending(), 2);

        assert_eq!(channel.try_read_line().await.unwrap().as_deref(), Some("STORE"));
        assert_eq!(channel.try_read_line().await.unwrap().as_deref(), Some("CLEAR"));
        assert_eq!(channel.try_read_line().await.unwrap(), None);
        assert_eq!(host.pending(), 0);
    }

    #[tokio::test]
    async fn test_take_sent_drains_log() {
        let (mut channel, host) = MockChannel::new();

        channel.write_line("READY").await.unwrap();
        assert_eq!(host.take_sent(), vec!["READY"]);
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_close_after_queued_lines() {
        let (mut channel, host) = MockChannel::new();

        host.send_line("ALLOW");
        host.close();

        assert_eq!(channel.try_read_line().await.unwrap().as_deref(), Some("ALLOW"));
        assert!(matches!(
            channel.try_read_line().await,
            Err(Error::ChannelClosed)
        ));
        assert!(matches!(
            channel.write_line("ALLOWED").await,
            Err(Error::ChannelClosed)
        ));
    }
}
