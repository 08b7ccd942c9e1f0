//! Mock proximity-card reader for testing and development.
//!
//! Cards are queued through a [`MockCardReaderHandle`]; each queued card is
//! reported once by the probe, mirroring a real reader where a halted card
//! stays silent.

use crate::{
    Result,
    traits::CardReader,
    types::ReaderInfo,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use votekiosk_core::Identifier;

/// Mock card reader for testing and development.
///
/// # Examples
///
/// ```
/// use votekiosk_hardware::mock::MockCardReader;
/// use votekiosk_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_hardware::Result<()> {
///     let (mut reader, handle) = MockCardReader::new();
///
///     assert!(!reader.is_new_card_present().await?);
///
///     handle.present_uid(vec![0x04, 0xAB, 0xCD, 0xEF]).await?;
///     assert!(reader.is_new_card_present().await?);
///     assert_eq!(reader.read_uid().await?, vec![0x04, 0xAB, 0xCD, 0xEF]);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    /// Channel receiver for presented cards
    card_rx: mpsc::Receiver<Vec<u8>>,

    /// Card selected by the last successful probe
    selected: Option<Vec<u8>>,

    /// Device name
    name: String,

    /// Counters shared with the handle
    shared: Arc<ReaderShared>,
}

#[derive(Debug, Default)]
struct ReaderShared {
    halts: AtomicU32,
    crypto_stops: AtomicU32,
    fail_next_read: AtomicBool,
}

impl MockCardReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockCardReaderHandle) {
        Self::with_name("Mock Card Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockCardReaderHandle) {
        let (card_tx, card_rx) = mpsc::channel(32);
        let shared = Arc::new(ReaderShared::default());

        let reader = Self {
            card_rx,
            selected: None,
            name,
            shared: Arc::clone(&shared),
        };

        let handle = MockCardReaderHandle { card_tx, shared };

        (reader, handle)
    }
}

impl CardReader for MockCardReader {
    async fn is_new_card_present(&mut self) -> Result<bool> {
        if self.selected.is_some() {
            return Ok(true);
        }

        match self.card_rx.try_recv() {
            Ok(uid) => {
                self.selected = Some(uid);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(crate::HardwareError::disconnected(
                "Card reader channel closed",
            )),
        }
    }

    async fn read_uid(&mut self) -> Result<Vec<u8>> {
        if self.shared.fail_next_read.swap(false, Ordering::SeqCst) {
            self.selected = None;
            return Err(crate::HardwareError::card_read("Anticollision failed"));
        }

        self.selected
            .take()
            .ok_or_else(|| crate::HardwareError::card_read("No card selected"))
    }

    async fn halt(&mut self) -> Result<()> {
        self.shared.halts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_crypto(&mut self) -> Result<()> {
        self.shared.crypto_stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_reader_info(&self) -> Result<ReaderInfo> {
        Ok(ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()]).with_version(0x92))
    }
}

/// Handle for controlling a mock card reader.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    /// Channel sender for presented cards
    card_tx: mpsc::Sender<Vec<u8>>,

    /// Counters shared with the reader
    shared: Arc<ReaderShared>,
}

impl MockCardReaderHandle {
    /// Present a card with raw UID bytes to the reader.
    ///
    /// The bytes are not validated, so tests can present malformed UIDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_uid(&self, uid: Vec<u8>) -> Result<()> {
        self.card_tx
            .send(uid)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Card reader channel closed"))
    }

    /// Present a card with a valid identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_card(&self, id: &Identifier) -> Result<()> {
        self.present_uid(id.as_bytes().to_vec()).await
    }

    /// Make the next `read_uid` fail as if anticollision went wrong.
    pub fn fail_next_read(&self) {
        self.shared.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Number of `halt` calls so far.
    pub fn halt_count(&self) -> u32 {
        self.shared.halts.load(Ordering::SeqCst)
    }

    /// Number of `stop_crypto` calls so far.
    pub fn crypto_stop_count(&self) -> u32 {
        self.shared.crypto_stops.load(Ordering::SeqCst)
    }
}
