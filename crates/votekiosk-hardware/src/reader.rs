//! Card reader adapter.
//!
//! Wraps a [`CardReader`] capability into the single non-blocking operation
//! the kiosk loop needs: `poll() -> Option<Identifier>`.

use tracing::{debug, warn};
use votekiosk_core::Identifier;

use crate::traits::CardReader;

/// Polls a card reader and releases every card it reads.
///
/// Reader faults are indistinguishable from an empty field: they are logged
/// at `debug` and reported as `None`.
///
/// # Examples
///
/// ```
/// use votekiosk_hardware::CardReaderAdapter;
/// use votekiosk_hardware::mock::MockCardReader;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_hardware::Result<()> {
///     let (reader, handle) = MockCardReader::new();
///     let mut adapter = CardReaderAdapter::new(reader);
///
///     assert!(adapter.poll().await.is_none());
///
///     handle.present_uid(vec![0x9E, 0x86, 0x3A, 0xAA]).await?;
///     let id = adapter.poll().await.unwrap();
///     assert_eq!(id.to_hex(), "9E863AAA");
///     assert_eq!(handle.halt_count(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CardReaderAdapter<R> {
    reader: R,
    cards_read: u64,
}

impl<R: CardReader> CardReaderAdapter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cards_read: 0,
        }
    }

    /// Check for a new card and return its identifier.
    ///
    /// When a card was selected it is halted and its crypto session stopped
    /// before returning, whether or not the UID could be read, so the card
    /// does not have to leave the field before another read is possible.
    pub async fn poll(&mut self) -> Option<Identifier> {
        match self.reader.is_new_card_present().await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                debug!("Card probe failed: {}", e);
                return None;
            }
        }

        let uid = self.reader.read_uid().await;
        self.release().await;

        let uid = match uid {
            Ok(uid) => uid,
            Err(e) => {
                debug!("Card serial read failed: {}", e);
                return None;
            }
        };

        match Identifier::new(uid) {
            Ok(id) => {
                self.cards_read += 1;
                debug!("Read card {} ({} bytes)", id, id.len());
                Some(id)
            }
            Err(e) => {
                warn!("Discarding card with unusable UID: {}", e);
                None
            }
        }
    }

    /// Halt the selected card and stop its crypto session.
    async fn release(&mut self) {
        if let Err(e) = self.reader.halt().await {
            debug!("Card halt failed: {}", e);
        }
        if let Err(e) = self.reader.stop_crypto().await {
            debug!("Stop crypto failed: {}", e);
        }
    }

    /// Number of cards successfully read since startup.
    pub fn cards_read(&self) -> u64 {
        self.cards_read
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCardReader;

    #[tokio::test]
    async fn test_poll_empty_field() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);

        assert!(adapter.poll().await.is_none());
        assert_eq!(handle.halt_count(), 0);
        assert_eq!(adapter.cards_read(), 0);
    }

    #[tokio::test]
    async fn test_poll_reads_and_releases_card() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);

        let uid = vec![0x04, 0x22, 0x51, 0x6A, 0x2B, 0x5C, 0x80];
        handle.present_uid(uid.clone()).await.unwrap();

        let id = adapter.poll().await.unwrap();
        assert_eq!(id.as_bytes(), uid.as_slice());
        assert_eq!(handle.halt_count(), 1);
        assert_eq!(handle.crypto_stop_count(), 1);
        assert_eq!(adapter.cards_read(), 1);

        // Released card is not reported again
        assert!(adapter.poll().await.is_none());
    }

    #[tokio::test]
    async fn test_poll_same_card_twice_after_release() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);

        let uid = vec![0x9E, 0x86, 0x3A, 0xAA];
        handle.present_uid(uid.clone()).await.unwrap();
        handle.present_uid(uid.clone()).await.unwrap();

        assert!(adapter.poll().await.is_some());
        assert!(adapter.poll().await.is_some());
        assert_eq!(handle.halt_count(), 2);
    }

    #[tokio::test]
    async fn test_poll_read_failure_is_no_card() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);

        handle.fail_next_read();
        handle.present_uid(vec![0x01, 0x02, 0x03, 0x04]).await.unwrap();

        assert!(adapter.poll().await.is_none());
        // The card was selected, so it is still released
        assert_eq!(handle.halt_count(), 1);
        assert_eq!(adapter.cards_read(), 0);
    }

    #[tokio::test]
    async fn test_poll_rejects_short_uid() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);

        handle.present_uid(vec![0x01, 0x02]).await.unwrap();

        assert!(adapter.poll().await.is_none());
        assert_eq!(handle.halt_count(), 1);
    }

    #[tokio::test]
    async fn test_poll_disconnected_reader() {
        let (reader, handle) = MockCardReader::new();
        let mut adapter = CardReaderAdapter::new(reader);
        drop(handle);

        assert!(adapter.poll().await.is_none());
    }
}
