//! Message channel over a serial device.
//!
//! The host usually sits on the other end of a USB-serial adapter. Reads
//! never block: each poll drains only the bytes the driver reports as
//! already received, then decodes from the local buffer with [`LineCodec`].

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::BytesMut;
use serialport::SerialPort;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info};

use votekiosk_core::{Error, Result};

use crate::channel::MessageChannel;
use crate::codec::LineCodec;

/// Default line speed for the host link.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Write timeout on the port; reads never wait.
const PORT_TIMEOUT: Duration = Duration::from_millis(100);

pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    codec: LineCodec,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl SerialChannel {
    /// Open a serial device.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the device cannot be opened or configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use votekiosk_protocol::SerialChannel;
    /// use votekiosk_protocol::serial::DEFAULT_BAUD_RATE;
    ///
    /// let channel = SerialChannel::open("/dev/ttyUSB0", DEFAULT_BAUD_RATE)?;
    /// # Ok::<(), votekiosk_core::Error>(())
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(io::Error::from)?;

        info!("Opened serial port {} at {} baud", path, baud_rate);
        Ok(Self::from_port(port))
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            codec: LineCodec::new(),
            read_buf: BytesMut::with_capacity(256),
            write_buf: BytesMut::with_capacity(64),
        }
    }

    pub fn port_name(&self) -> Option<String> {
        self.port.name()
    }
}

impl fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.port.name())
            .field("buffered", &self.read_buf.len())
            .finish()
    }
}

impl MessageChannel for SerialChannel {
    async fn try_read_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.codec.decode(&mut self.read_buf)? {
            return Ok(Some(line));
        }

        let available = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if available == 0 {
            return Ok(None);
        }

        match drain_available(&mut self.port, available, &mut self.read_buf) {
            Ok(0) => {
                debug!("Serial port reported data but returned none");
                Err(Error::ChannelClosed)
            }
            Ok(_) => self.codec.decode(&mut self.read_buf),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_buf.clear();
        self.codec.encode(line.to_string(), &mut self.write_buf)?;
        self.port.write_all(&self.write_buf)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Read exactly the bytes a driver reports as pending into `buffer`.
///
/// Returns the number of bytes appended; `0` means the reader is at end of
/// stream.
fn drain_available<R: Read + ?Sized>(
    reader: &mut R,
    available: usize,
    buffer: &mut BytesMut,
) -> io::Result<usize> {
    let mut chunk = vec![0u8; available];
    let n = reader.read(&mut chunk)?;
    buffer.extend_from_slice(&chunk[..n]);
    Ok(n)
}
