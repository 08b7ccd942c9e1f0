//! Mock button panel for testing and development.
//!
//! Each button has a held level (pressed or released) and an optional queue
//! of scripted samples that are returned before the held level. A single
//! scripted active sample followed by the released level is a bounce.

use crate::{
    Result,
    traits::ButtonPanel,
    types::{DeviceInfo, Level},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use votekiosk_core::Button;

/// Mock button panel.
///
/// # Examples
///
/// ```
/// use votekiosk_core::Button;
/// use votekiosk_hardware::mock::MockButtons;
/// use votekiosk_hardware::traits::ButtonPanel;
/// use votekiosk_hardware::types::Level;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_hardware::Result<()> {
///     let (mut panel, handle) = MockButtons::new();
///
///     assert_eq!(panel.read_level(Button::One).await?, Level::High);
///     handle.press(Button::One);
///     assert_eq!(panel.read_level(Button::One).await?, Level::Low);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockButtons {
    /// Device name
    name: String,

    /// State shared with the handle
    shared: Arc<Mutex<ButtonState>>,
}

#[derive(Debug)]
struct ButtonState {
    active_level: Level,
    held: [Level; 2],
    scripted: [VecDeque<Level>; 2],
    reads: [u32; 2],
    failing: bool,
}

fn lock(shared: &Mutex<ButtonState>) -> MutexGuard<'_, ButtonState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockButtons {
    /// Create a mock panel with pull-up wiring (pressed reads low).
    pub fn new() -> (Self, MockButtonsHandle) {
        Self::with_active_level(Level::Low)
    }

    /// Create a mock panel whose buttons read `active_level` when pressed.
    pub fn with_active_level(active_level: Level) -> (Self, MockButtonsHandle) {
        let released = active_level.inverted();
        let shared = Arc::new(Mutex::new(ButtonState {
            active_level,
            held: [released; 2],
            scripted: [VecDeque::new(), VecDeque::new()],
            reads: [0; 2],
            failing: false,
        }));

        let panel = Self {
            name: "Mock Buttons".to_string(),
            shared: Arc::clone(&shared),
        };

        (panel, MockButtonsHandle { shared })
    }
}

impl ButtonPanel for MockButtons {
    async fn read_level(&mut self, button: Button) -> Result<Level> {
        let mut state = lock(&self.shared);
        if state.failing {
            return Err(crate::HardwareError::communication(format!(
                "Button {button} input not responding"
            )));
        }

        let idx = button.index();
        state.reads[idx] += 1;
        let held = state.held[idx];
        Ok(state.scripted[idx].pop_front().unwrap_or(held))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        if lock(&self.shared).failing {
            return Err(crate::HardwareError::disconnected(self.name.clone()));
        }
        Ok(DeviceInfo::new(self.name.clone(), "Mock Buttons v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for driving a mock button panel.
#[derive(Debug, Clone)]
pub struct MockButtonsHandle {
    shared: Arc<Mutex<ButtonState>>,
}

impl MockButtonsHandle {
    /// Hold a button down until [`release`](Self::release).
    pub fn press(&self, button: Button) {
        let mut state = lock(&self.shared);
        let active = state.active_level;
        state.held[button.index()] = active;
    }

    /// Let a button go.
    pub fn release(&self, button: Button) {
        let mut state = lock(&self.shared);
        let released = state.active_level.inverted();
        state.held[button.index()] = released;
    }

    /// Press and release within one sample: the next read is active, the
    /// one after falls back to the released level.
    pub fn bounce(&self, button: Button) {
        let mut state = lock(&self.shared);
        let idx = button.index();
        let active = state.active_level;
        state.held[idx] = active.inverted();
        state.scripted[idx].push_back(active);
    }

    /// Queue raw samples to be returned before the held level.
    pub fn script(&self, button: Button, samples: impl IntoIterator<Item = Level>) {
        let mut state = lock(&self.shared);
        state.scripted[button.index()].extend(samples);
    }

    /// Whether a button is currently held down.
    pub fn is_held(&self, button: Button) -> bool {
        let state = lock(&self.shared);
        state.held[button.index()] == state.active_level
    }

    /// Number of level reads of a button so far.
    pub fn read_count(&self, button: Button) -> u32 {
        lock(&self.shared).reads[button.index()]
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        lock(&self.shared).failing = failing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_buttons_press_release() {
        let (mut panel, handle) = MockButtons::new();

        handle.press(Button::Two);
        assert_eq!(panel.read_level(Button::Two).await.unwrap(), Level::Low);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::High);

        handle.release(Button::Two);
        assert_eq!(panel.read_level(Button::Two).await.unwrap(), Level::High);
        assert_eq!(handle.read_count(Button::Two), 2);
        assert_eq!(handle.read_count(Button::One), 1);
    }

    #[tokio::test]
    async fn test_mock_buttons_bounce_is_one_sample() {
        let (mut panel, handle) = MockButtons::new();

        handle.bounce(Button::One);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::Low);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::High);
    }

    #[tokio::test]
    async fn test_mock_buttons_script() {
        let (mut panel, handle) = MockButtons::with_active_level(Level::High);

        handle.script(Button::One, [Level::High, Level::Low, Level::High]);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::High);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::Low);
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::High);
        // Held level for active-high wiring is low when released
        assert_eq!(panel.read_level(Button::One).await.unwrap(), Level::Low);
    }

    #[tokio::test]
    async fn test_mock_buttons_failing() {
        let (mut panel, handle) = MockButtons::new();
        handle.set_failing(true);
        assert!(panel.read_level(Button::One).await.is_err());
        assert!(panel.get_info().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_buttons_info() {
        let (panel, _handle) = MockButtons::new();
        let info = panel.get_info().await.unwrap();
        assert_eq!(info.name, "Mock Buttons");
        assert_eq!(info.firmware_version.as_deref(), Some("1.0.0"));
    }
}
