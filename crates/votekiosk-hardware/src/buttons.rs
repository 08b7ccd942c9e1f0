//! Button input with two-sample debounce.
//!
//! The vote buttons are wired to pull their input to a reference level when
//! pressed (to ground with the default pull-up wiring). A press is only
//! accepted if the input reads active, then reads active again after a short
//! settle delay; a single bouncy sample is rejected.

use std::time::Duration;

use tracing::{debug, warn};
use votekiosk_core::Button;

use crate::traits::ButtonPanel;
use crate::types::Level;

#[derive(Debug)]
pub struct ButtonInput<P> {
    panel: P,
    active_level: Level,
    settle: Duration,
}

impl<P: ButtonPanel> ButtonInput<P> {
    /// Create a button input.
    ///
    /// * `active_level` - level that means "pressed" (`Level::Low` for pull-up wiring)
    /// * `settle` - delay between the two debounce samples
    pub fn new(panel: P, active_level: Level, settle: Duration) -> Self {
        Self {
            panel,
            active_level,
            settle,
        }
    }

    /// Sample a button once. Read failures count as not pressed.
    pub async fn read(&mut self, button: Button) -> bool {
        match self.panel.read_level(button).await {
            Ok(level) => level == self.active_level,
            Err(e) => {
                warn!("Failed to read button {}: {}", button, e);
                false
            }
        }
    }

    /// Debounced press check: active, settle, active again.
    ///
    /// Costs one settle delay whenever the first sample is active.
    pub async fn is_pressed(&mut self, button: Button) -> bool {
        if !self.read(button).await {
            return false;
        }

        tokio::time::sleep(self.settle).await;

        if self.read(button).await {
            true
        } else {
            debug!("Rejected bounce on button {}", button);
            false
        }
    }

    pub fn active_level(&self) -> Level {
        self.active_level
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockButtons;
    use rstest::rstest;

    const SETTLE: Duration = Duration::from_millis(50);

    #[tokio::test(start_paused = true)]
    async fn test_idle_button_not_pressed() {
        let (panel, _handle) = MockButtons::new();
        let mut input = ButtonInput::new(panel, Level::Low, SETTLE);

        let start = tokio::time::Instant::now();
        assert!(!input.is_pressed(Button::One).await);
        // No settle delay when the first sample is inactive
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_button_is_pressed_after_settle() {
        let (panel, handle) = MockButtons::new();
        let mut input = ButtonInput::new(panel, Level::Low, SETTLE);

        handle.press(Button::Two);
        let start = tokio::time::Instant::now();

        assert!(input.is_pressed(Button::Two).await);
        assert!(start.elapsed() >= SETTLE);
        assert_eq!(handle.read_count(Button::Two), 2);
        assert!(!input.is_pressed(Button::One).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_sample_bounce_rejected() {
        let (panel, handle) = MockButtons::new();
        let mut input = ButtonInput::new(panel, Level::Low, SETTLE);

        handle.bounce(Button::One);

        assert!(!input.is_pressed(Button::One).await);
        assert_eq!(handle.read_count(Button::One), 2);
    }

    #[rstest]
    #[case(Level::Low)]
    #[case(Level::High)]
    #[tokio::test(start_paused = true)]
    async fn test_active_level_respected(#[case] active: Level) {
        let (panel, handle) = MockButtons::with_active_level(active);
        let mut input = ButtonInput::new(panel, active, SETTLE);

        assert!(!input.read(Button::One).await);
        handle.press(Button::One);
        assert!(input.read(Button::One).await);
        handle.release(Button::One);
        assert!(!input.read(Button::One).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_is_not_pressed() {
        let (panel, handle) = MockButtons::new();
        let mut input = ButtonInput::new(panel, Level::Low, SETTLE);

        handle.press(Button::One);
        handle.set_failing(true);

        assert!(!input.is_pressed(Button::One).await);
    }
}
