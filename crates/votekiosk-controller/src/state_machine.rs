//! Kiosk session state machine.
//!
//! Tracks where the kiosk is in a voting session, from card detection
//! through the host's decision to the vote itself.
//!
//! # States
//!
//! - `Idle`: Scanning for a card; voting disabled
//! - `AwaitingDecision`: A card was checked, waiting for `ALLOW`/`DENY`
//! - `Authorized`: The host allowed the card; the buttons are live
//!
//! # Valid Transitions
//!
//! - Idle → AwaitingDecision
//! - AwaitingDecision → Authorized | Idle
//! - Authorized → Idle
//!
//! [`SessionMachine::reset`] returns to Idle from anywhere and is what host
//! commands that clear the session use.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use votekiosk_controller::{SessionMachine, SessionState};
//! use votekiosk_core::Identifier;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut machine = SessionMachine::new();
//! assert_eq!(machine.current_state(), SessionState::Idle);
//!
//! let card = Identifier::from_hex("9E863AAA").unwrap();
//! machine
//!     .enter_awaiting_decision(card, Duration::from_secs(15))
//!     .unwrap();
//! machine.transition_to(SessionState::Authorized).unwrap();
//!
//! // Illegal: a decision cannot be awaited from Authorized
//! assert!(machine.transition_to(SessionState::AwaitingDecision).is_err());
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use votekiosk_core::{Error, Identifier, Result};

/// Maximum number of state transitions to keep in history.
///
/// A full session is two or three transitions, so this covers the last few
/// dozen sessions.
const MAX_HISTORY_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Scanning for a card. Buttons are ignored.
    Idle,

    /// A `CHECK` was sent; waiting for the host within the decision window.
    AwaitingDecision,

    /// The host allowed the card; one vote may be cast.
    Authorized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SessionState::Idle => "Idle",
            SessionState::AwaitingDecision => "AwaitingDecision",
            SessionState::Authorized => "Authorized",
        };
        write!(f, "{}", state_str)
    }
}

impl SessionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use votekiosk_controller::SessionState;
    ///
    /// assert!(SessionState::Idle.can_transition_to(&SessionState::AwaitingDecision));
    /// assert!(!SessionState::Idle.can_transition_to(&SessionState::Authorized));
    /// ```
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::AwaitingDecision)
                | (
                    SessionState::AwaitingDecision,
                    SessionState::Authorized | SessionState::Idle
                )
                | (SessionState::Authorized, SessionState::Idle)
        )
    }

    /// Whether the card reader is polled in this state.
    pub fn scans_cards(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Whether the vote buttons are polled in this state.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, SessionState::Authorized)
    }
}

/// Represents a single state transition with timestamp.
///
/// # Serialization Note
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
/// When deserializing, the timestamp will be set to the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine for one kiosk.
///
/// Owns the session state, the decision deadline and the identifier of the
/// card being decided on. It is mutated only by the controller loop.
///
/// The deadline is set when AwaitingDecision is entered and is meaningless
/// in any other state; the identifier is kept until the session returns to
/// Idle.
#[derive(Debug)]
pub struct SessionMachine {
    current_state: SessionState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
    deadline: Option<Instant>,
    identifier: Option<Identifier>,
}

impl SessionMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for constructing a state machine with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use votekiosk_controller::{SessionMachine, SessionState};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let machine = SessionMachine::builder()
    ///     .with_initial_state(SessionState::AwaitingDecision)
    ///     .with_timeout(Duration::from_secs(10))
    ///     .build();
    ///
    /// assert_eq!(machine.current_state(), SessionState::AwaitingDecision);
    /// assert!(machine.time_remaining(tokio::time::Instant::now()).is_some());
    /// # }
    /// ```
    pub fn builder() -> SessionMachineBuilder {
        SessionMachineBuilder::default()
    }

    pub fn current_state(&self) -> SessionState {
        self.current_state
    }

    /// Get the time elapsed in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Card being decided on or voted with, if a session is open.
    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    /// Check whether the decision window has closed at `now`.
    ///
    /// Always `false` outside AwaitingDecision.
    pub fn has_timed_out(&self, now: Instant) -> bool {
        self.current_state == SessionState::AwaitingDecision
            && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Get the time left in the decision window at `now`.
    ///
    /// Returns `None` outside AwaitingDecision or once the window has closed.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        if self.current_state != SessionState::AwaitingDecision {
            return None;
        }
        self.deadline
            .and_then(|deadline| deadline.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Get a reference to the state transition history, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// valid for the current state.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());
        Ok(transition)
    }

    /// Open a session for `identifier` and start the decision window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] unless the machine is Idle.
    pub fn enter_awaiting_decision(
        &mut self,
        identifier: Identifier,
        timeout: Duration,
    ) -> Result<StateTransition> {
        let transition = self.transition_to(SessionState::AwaitingDecision)?;
        self.deadline = Some(transition.timestamp + timeout);
        self.identifier = Some(identifier);
        Ok(transition)
    }

    /// Force the machine back to Idle from any state.
    ///
    /// Returns the transition record, or `None` if the machine was already
    /// Idle (nothing is added to the history in that case).
    pub fn reset(&mut self) -> Option<StateTransition> {
        if self.current_state == SessionState::Idle {
            return None;
        }
        let transition = StateTransition::new(self.current_state, SessionState::Idle);
        self.perform_state_change(SessionState::Idle, transition.clone());
        Some(transition)
    }

    fn perform_state_change(&mut self, new_state: SessionState, transition: StateTransition) {
        debug!("Session {} -> {}", transition.from, transition.to);

        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        self.deadline = None;
        if new_state == SessionState::Idle {
            self.identifier = None;
        }

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `SessionMachine` instances with custom configuration.
#[derive(Debug)]
pub struct SessionMachineBuilder {
    initial_state: SessionState,
    history: VecDeque<StateTransition>,
    timeout: Option<Duration>,
    identifier: Option<Identifier>,
}

impl SessionMachineBuilder {
    pub fn with_initial_state(mut self, state: SessionState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_history(mut self, history: VecDeque<StateTransition>) -> Self {
        self.history = history;
        self
    }

    /// Decision window, counted from `build()`. Only used when the initial
    /// state is AwaitingDecision.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn build(self) -> SessionMachine {
        let now = Instant::now();
        let deadline = match self.initial_state {
            SessionState::AwaitingDecision => self.timeout.map(|timeout| now + timeout),
            _ => None,
        };
        let identifier = match self.initial_state {
            SessionState::Idle => None,
            _ => self.identifier,
        };

        SessionMachine {
            current_state: self.initial_state,
            state_entered_at: now,
            history: self.history,
            deadline,
            identifier,
        }
    }
}

impl Default for SessionMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: SessionState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            timeout: None,
            identifier: None,
        }
    }
}
