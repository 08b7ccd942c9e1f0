//! Indicator driver.
//!
//! Three independent set operations over an [`IndicatorPanel`], plus a
//! shadow copy of what was last commanded. There is no read-back from the
//! hardware and no error path: a panel fault is logged and the kiosk keeps
//! going.

use tracing::{trace, warn};

use crate::traits::IndicatorPanel;
use crate::types::{Indicator, IndicatorSet};

#[derive(Debug)]
pub struct IndicatorDriver<P> {
    panel: P,
    state: IndicatorSet,
}

impl<P: IndicatorPanel> IndicatorDriver<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            state: IndicatorSet::default(),
        }
    }

    /// Light or clear the authorize indicator.
    pub async fn set_authorize(&mut self, lit: bool) {
        self.set(Indicator::Authorize, lit).await;
    }

    /// Light or clear the reject indicator.
    pub async fn set_reject(&mut self, lit: bool) {
        self.set(Indicator::Reject, lit).await;
    }

    /// Light or clear the store latch.
    pub async fn set_store(&mut self, lit: bool) {
        self.set(Indicator::Store, lit).await;
    }

    /// Drive every output low, regardless of the shadow state.
    pub async fn all_off(&mut self) {
        for indicator in Indicator::ALL {
            self.set(indicator, false).await;
        }
    }

    pub async fn set(&mut self, indicator: Indicator, lit: bool) {
        trace!("Indicator {} -> {}", indicator, lit);
        if let Err(e) = self.panel.set_indicator(indicator, lit).await {
            warn!("Failed to drive {} indicator: {}", indicator, e);
        }
        self.state.set(indicator, lit);
    }

    /// What the driver last commanded.
    pub fn state(&self) -> IndicatorSet {
        self.state
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}
