//! Stdin console for driving the simulated peripherals.
//!
//! ```text
//! card 9E863AAA    present a card to the reader
//! press 2          tap button 2
//! hold 1           hold button 1 down
//! release 1        let button 1 go
//! bounce 1         a single-sample glitch on button 1
//! status           print indicators and buttons
//! quit             stop the kiosk
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{info, warn};

use votekiosk_core::{Button, Identifier};
use votekiosk_hardware::mock::{MockButtonsHandle, MockCardReaderHandle, MockIndicatorsHandle};

/// How long `press` keeps a button down; comfortably past the debounce.
const TAP_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Card(Identifier),
    Press(Button),
    Hold(Button),
    Release(Button),
    Bounce(Button),
    Status,
    Quit,
}

impl ConsoleCommand {
    /// Parse one console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("too many arguments");
        }

        let command = match verb {
            "card" => {
                let hex = arg.ok_or_else(|| anyhow!("usage: card <HEX>"))?;
                ConsoleCommand::Card(
                    Identifier::from_hex(hex).with_context(|| format!("bad card UID {hex:?}"))?,
                )
            }
            "press" => ConsoleCommand::Press(parse_button(arg)?),
            "hold" => ConsoleCommand::Hold(parse_button(arg)?),
            "release" => ConsoleCommand::Release(parse_button(arg)?),
            "bounce" => ConsoleCommand::Bounce(parse_button(arg)?),
            "status" => ConsoleCommand::Status,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command {other:?}"),
        };
        Ok(Some(command))
    }
}

fn parse_button(arg: Option<&str>) -> Result<Button> {
    arg.and_then(|n| n.parse::<u8>().ok())
        .and_then(Button::from_number)
        .ok_or_else(|| anyhow!("expected button 1 or 2"))
}

/// Control handles for every simulated peripheral.
#[derive(Debug, Clone)]
pub struct Peripherals {
    pub reader: MockCardReaderHandle,
    pub lights: MockIndicatorsHandle,
    pub buttons: MockButtonsHandle,
}

impl Peripherals {
    async fn apply(&self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Card(id) => {
                self.reader.present_card(&id).await?;
                info!("Card {} placed on reader", id);
            }
            ConsoleCommand::Press(button) => {
                self.buttons.press(button);
                let buttons = self.buttons.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(TAP_DURATION).await;
                    buttons.release(button);
                });
            }
            ConsoleCommand::Hold(button) => self.buttons.press(button),
            ConsoleCommand::Release(button) => self.buttons.release(button),
            ConsoleCommand::Bounce(button) => self.buttons.bounce(button),
            ConsoleCommand::Status => println!("{}", self.status()),
            ConsoleCommand::Quit => {}
        }
        Ok(())
    }

    fn status(&self) -> String {
        let held: Vec<String> = Button::ALL
            .iter()
            .filter(|b| self.buttons.is_held(**b))
            .map(ToString::to_string)
            .collect();
        let held = if held.is_empty() {
            "none".to_string()
        } else {
            held.join(",")
        };

        format!(
            "indicators: {} | buttons held: {} | cards released: {}",
            self.lights.state(),
            held,
            self.reader.halt_count()
        )
    }
}

/// Read console commands from stdin until `quit` or end of input, then
/// signal `quit`.
pub async fn run(peripherals: Peripherals, quit: Arc<Notify>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };

        match ConsoleCommand::parse(&line) {
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = peripherals.apply(command).await {
                    warn!("{:#}", e);
                }
            }
            Ok(None) => {}
            Err(e) => println!("{e:#}"),
        }
    }

    quit.notify_one();
}
