//! The kiosk control loop.
//!
//! [`KioskController`] owns every peripheral and the session state machine.
//! Each [`step`](KioskController::step) does, in order:
//!
//! 1. read at most one line from the host and apply it
//! 2. check the decision deadline
//! 3. when Idle, poll the card reader
//! 4. when Authorized, poll button 1 then button 2
//!
//! The `DENY` hold and the post-vote guard are awaited in place, so nothing
//! else is serviced while they run.

use std::future::Future;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use votekiosk_core::{Button, Command, Event, Result};
use votekiosk_hardware::{
    ButtonInput, ButtonPanel, CardReader, CardReaderAdapter, IndicatorDriver, IndicatorPanel,
    IndicatorSet,
};
use votekiosk_protocol::MessageChannel;

use crate::config::ControllerConfig;
use crate::state_machine::{SessionMachine, SessionState};

/// Voting kiosk controller.
///
/// Generic over the three peripherals and the host link so the same loop
/// runs against real hardware, the mocks in `votekiosk_hardware::mock`, or
/// any mix of the two.
pub struct KioskController<R, P, B, C> {
    reader: CardReaderAdapter<R>,
    indicators: IndicatorDriver<P>,
    buttons: ButtonInput<B>,
    channel: C,
    session: SessionMachine,
    config: ControllerConfig,
}

impl<R, P, B, C> KioskController<R, P, B, C>
where
    R: CardReader,
    P: IndicatorPanel,
    B: ButtonPanel,
    C: MessageChannel,
{
    /// Create a controller in the Idle state.
    ///
    /// Nothing touches the hardware or the host link until
    /// [`start`](Self::start) is called.
    pub fn new(reader: R, indicators: P, buttons: B, channel: C, config: ControllerConfig) -> Self {
        let buttons = ButtonInput::new(
            buttons,
            config.button_active_level,
            config.debounce_settle(),
        );

        Self {
            reader: CardReaderAdapter::new(reader),
            indicators: IndicatorDriver::new(indicators),
            buttons,
            channel,
            session: SessionMachine::new(),
            config,
        }
    }

    /// Log the attached devices, zero every indicator and announce `READY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host link fails.
    pub async fn start(&mut self) -> Result<()> {
        self.log_devices().await;
        self.indicators.all_off().await;
        info!(
            "Kiosk started (decision timeout {:?})",
            self.config.decision_timeout()
        );
        self.emit(Event::Ready).await
    }

    /// Run one loop iteration.
    ///
    /// # Errors
    ///
    /// Returns an error only if the host link fails; protocol and hardware
    /// faults are absorbed.
    pub async fn step(&mut self) -> Result<()> {
        if let Some(line) = self.channel.try_read_line().await? {
            self.handle_line(&line).await?;
        }

        if self.session.has_timed_out(Instant::now()) {
            self.handle_timeout().await?;
        }

        if self.session.current_state().scans_cards() {
            self.scan_card().await?;
        }

        if self.session.current_state().accepts_votes() {
            self.scan_buttons().await?;
        }

        Ok(())
    }

    /// Run [`step`](Self::step) at the configured poll interval until
    /// `shutdown` resolves or the host link fails.
    ///
    /// Shutdown is only observed between iterations; a hold in progress
    /// always completes. Call [`start`](Self::start) first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](votekiosk_core::Error::Config) if the
    /// configuration is invalid, otherwise the host link error that stopped
    /// the loop.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.config.validate()?;

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Kiosk loop stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            self.step().await?;
        }
    }

    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    /// What the indicators were last commanded to show.
    pub fn indicators(&self) -> IndicatorSet {
        self.indicators.state()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Device details are informational; a device that cannot describe
    /// itself is still used.
    async fn log_devices(&self) {
        match self.reader.reader().get_reader_info().await {
            Ok(info) => info!(
                "Card reader: {} (protocols {}, version {:?})",
                info.name,
                info.protocols.join(","),
                info.version
            ),
            Err(e) => warn!("Card reader did not report its info: {}", e),
        }

        match self.indicators.panel().get_info().await {
            Ok(info) => info!("Indicator panel: {} ({})", info.name, info.model),
            Err(e) => warn!("Indicator panel did not report its info: {}", e),
        }

        match self.buttons.panel().get_info().await {
            Ok(info) => info!("Button panel: {} ({})", info.name, info.model),
            Err(e) => warn!("Button panel did not report its info: {}", e),
        }
    }

    async fn handle_line(&mut self, line: &str) -> Result<()> {
        match Command::parse(line) {
            Command::EnableVoting => {
                self.session.reset();
                self.emit(Event::Enabled).await
            }
            Command::Allow => self.handle_allow().await,
            Command::Deny => self.handle_deny().await,
            Command::ResetCard => self.handle_reset_card().await,
            Command::Store => {
                self.indicators.set_store(true).await;
                self.emit(Event::Stored).await
            }
            Command::Clear => {
                self.indicators.set_store(false).await;
                self.indicators.set_authorize(false).await;
                self.session.reset();
                self.emit(Event::ResetCard).await?;
                self.emit(Event::Ready).await
            }
            Command::Unknown(raw) => {
                debug!("Ignoring unrecognized input {:?}", raw);
                Ok(())
            }
        }
    }

    async fn handle_allow(&mut self) -> Result<()> {
        if !self.awaiting_decision("ALLOW") {
            return Ok(());
        }

        self.indicators.set_reject(false).await;
        self.indicators.set_authorize(true).await;
        self.session.transition_to(SessionState::Authorized)?;
        self.emit(Event::Allowed).await
    }

    async fn handle_deny(&mut self) -> Result<()> {
        if !self.awaiting_decision("DENY") {
            return Ok(());
        }

        self.indicators.set_authorize(false).await;
        self.indicators.set_reject(true).await;
        tokio::time::sleep(self.config.deny_hold()).await;
        self.indicators.set_reject(false).await;

        self.session.transition_to(SessionState::Idle)?;
        self.emit(Event::Denied).await?;
        self.emit(Event::Ready).await
    }

    async fn handle_reset_card(&mut self) -> Result<()> {
        let state = self.session.current_state();

        self.indicators.set_authorize(false).await;
        self.indicators.set_reject(false).await;
        self.session.reset();

        // Aborting an authorized session is silent
        if state == SessionState::Authorized {
            return Ok(());
        }
        self.emit(Event::ResetCard).await?;
        self.emit(Event::Ready).await
    }

    async fn handle_timeout(&mut self) -> Result<()> {
        if let Some(id) = self.session.identifier() {
            info!("No decision for card {}", id);
        }
        self.session.transition_to(SessionState::Idle)?;
        self.emit(Event::Timeout).await?;
        self.emit(Event::Ready).await
    }

    async fn scan_card(&mut self) -> Result<()> {
        let Some(id) = self.reader.poll().await else {
            return Ok(());
        };

        info!("Card {} presented", id);
        self.emit(Event::Check(id.clone())).await?;
        self.session.enter_awaiting_decision(id, self.config.decision_timeout())?;
        Ok(())
    }

    async fn scan_buttons(&mut self) -> Result<()> {
        for button in Button::ALL {
            if self.buttons.is_pressed(button).await {
                return self.cast_vote(button).await;
            }
        }
        Ok(())
    }

    async fn cast_vote(&mut self, button: Button) -> Result<()> {
        if let Some(id) = self.session.identifier() {
            info!("Card {} voted {}", id, button);
        }
        self.emit(Event::Vote(button)).await?;
        tokio::time::sleep(self.config.vote_guard()).await;
        self.session.transition_to(SessionState::Idle)?;
        Ok(())
    }

    fn awaiting_decision(&self, command: &str) -> bool {
        let state = self.session.current_state();
        if state != SessionState::AwaitingDecision {
            debug!("Ignoring {} in state {}", command, state);
            return false;
        }
        true
    }

    async fn emit(&mut self, event: Event) -> Result<()> {
        info!("-> {}", event);
        self.channel.send_event(&event).await
    }
}
