//! Mock indicator panel for testing and development.
//!
//! The panel publishes its output state on a `watch` channel so a handle can
//! observe the lights after the panel has been moved into a driver.

use crate::{
    Result,
    traits::IndicatorPanel,
    types::{DeviceInfo, Indicator, IndicatorSet},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::watch;

/// Mock indicator panel.
///
/// # Examples
///
/// ```
/// use votekiosk_hardware::mock::MockIndicators;
/// use votekiosk_hardware::traits::IndicatorPanel;
/// use votekiosk_hardware::types::Indicator;
///
/// #[tokio::main]
/// async fn main() -> votekiosk_hardware::Result<()> {
///     let (mut panel, handle) = MockIndicators::new();
///
///     panel.set_indicator(Indicator::Authorize, true).await?;
///     assert!(handle.state().authorize);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockIndicators {
    /// Publishes the current output state
    state_tx: watch::Sender<IndicatorSet>,

    /// Device name
    name: String,

    /// Flags shared with the handle
    shared: Arc<PanelShared>,
}

#[derive(Debug, Default)]
struct PanelShared {
    writes: AtomicU32,
    failing: AtomicBool,
}

impl MockIndicators {
    /// Create a new mock panel with every output off.
    pub fn new() -> (Self, MockIndicatorsHandle) {
        Self::with_name("Mock Indicator Panel".to_string())
    }

    /// Create a new mock panel with a custom name.
    pub fn with_name(name: String) -> (Self, MockIndicatorsHandle) {
        let (state_tx, state_rx) = watch::channel(IndicatorSet::default());
        let shared = Arc::new(PanelShared::default());

        let panel = Self {
            state_tx,
            name,
            shared: Arc::clone(&shared),
        };

        let handle = MockIndicatorsHandle { state_rx, shared };

        (panel, handle)
    }
}

impl IndicatorPanel for MockIndicators {
    async fn set_indicator(&mut self, indicator: Indicator, lit: bool) -> Result<()> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(crate::HardwareError::communication(format!(
                "{indicator} output not responding"
            )));
        }

        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        self.state_tx.send_modify(|state| state.set(indicator, lit));
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(crate::HardwareError::disconnected(self.name.clone()));
        }
        Ok(DeviceInfo::new(self.name.clone(), "Mock Indicators v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for observing a mock indicator panel.
#[derive(Debug, Clone)]
pub struct MockIndicatorsHandle {
    state_rx: watch::Receiver<IndicatorSet>,
    shared: Arc<PanelShared>,
}

impl MockIndicatorsHandle {
    /// Current output state of the panel.
    pub fn state(&self) -> IndicatorSet {
        *self.state_rx.borrow()
    }

    /// Whether one indicator is currently lit.
    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.state().is_lit(indicator)
    }

    /// Number of successful output writes.
    pub fn write_count(&self) -> u32 {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }
}
