//! Voting kiosk emulator.
//!
//! Runs the kiosk controller against simulated peripherals driven from the
//! console, talking to a real host over TCP or a serial device.
//!
//! # Usage
//!
//! ```bash
//! # Wait for a host on the default TCP port
//! votekiosk
//!
//! # Talk to the host over a USB-serial adapter
//! votekiosk --serial /dev/ttyUSB0 --baud 115200
//!
//! # Custom timings
//! votekiosk --config kiosk.json --log-level debug
//! ```

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use votekiosk_controller::{ControllerConfig, KioskController};
use votekiosk_hardware::mock::{MockButtons, MockCardReader, MockIndicators};
use votekiosk_protocol::serial::DEFAULT_BAUD_RATE;
use votekiosk_protocol::{AnyChannel, SerialChannel};

use crate::console::Peripherals;

/// Voting kiosk emulator
#[derive(Parser, Debug)]
#[command(name = "votekiosk")]
#[command(about = "Voting kiosk controller with simulated peripherals")]
#[command(version)]
struct Args {
    /// Address to accept the host connection on
    #[arg(short, long, default_value = "127.0.0.1:7878", conflicts_with = "serial")]
    listen: String,

    /// Serial device connected to the host, instead of TCP
    #[arg(short, long)]
    serial: Option<String>,

    /// Serial line speed
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Controller configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = match &args.config {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    let (reader, reader_handle) = MockCardReader::new();
    let (lights, lights_handle) = MockIndicators::new();
    let (buttons, buttons_handle) = MockButtons::with_active_level(config.button_active_level);
    let peripherals = Peripherals {
        reader: reader_handle,
        lights: lights_handle,
        buttons: buttons_handle,
    };

    let channel = open_host_link(&args).await?;

    let quit = Arc::new(Notify::new());
    tokio::spawn(console::run(peripherals, Arc::clone(&quit)));

    let mut controller = KioskController::new(reader, lights, buttons, channel, config);
    controller.start().await.context("host link failed at startup")?;

    let shutdown = async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                }
            }
            () = quit.notified() => {}
        }
    };

    controller
        .run_until(shutdown)
        .await
        .context("host link failed")?;

    let session = controller.session();
    tracing::info!(
        "Stopped in state {} after {} transitions",
        session.current_state(),
        session.history().len()
    );

    Ok(())
}

async fn open_host_link(args: &Args) -> Result<AnyChannel> {
    if let Some(path) = &args.serial {
        let channel = SerialChannel::open(path, args.baud)
            .with_context(|| format!("failed to open serial port {path}"))?;
        return Ok(channel.into());
    }

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    tracing::info!("Waiting for host on {}", listener.local_addr()?);

    let (stream, peer) = listener.accept().await?;
    tracing::info!("Host connected from {}", peer);
    Ok(stream.into())
}
