//! Voting kiosk controller.
//!
//! This crate contains the session state machine and the control loop that
//! ties the card reader, indicators, buttons and host link together.

pub mod config;
pub mod controller;
pub mod state_machine;

pub use config::ControllerConfig;
pub use controller::KioskController;
pub use state_machine::{SessionMachine, SessionMachineBuilder, SessionState, StateTransition};
