//! Confirmation delays relative to a unit's own timestamp.

use dagview_types::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tracer::ConfirmationTimes;

/// Seconds from a unit's timestamp until it was final for full nodes and
/// for light clients. `None` where the corresponding moment has not been
/// observed yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDelays {
    pub full_node_confirmation_delay: Option<i64>,
    pub light_node_confirmation_delay: Option<i64>,
}

impl ConfirmationDelays {
    /// Delays of `times` measured from `t0`.
    ///
    /// Negative delays mean the store recorded stabilization before the unit
    /// itself. They are returned as they are and logged.
    pub fn from_times(t0: Timestamp, times: &ConfirmationTimes) -> Self {
        let full = times.full.map(|t| t.signed_delta_since(t0));
        let light = times.light.map(|t| t.signed_delta_since(t0));
        if full.is_some_and(|d| d < 0) || light.is_some_and(|d| d < 0) {
            warn!(
                t0 = t0.as_secs(),
                full = ?full,
                light = ?light,
                "negative confirmation delay; store timestamps are inconsistent"
            );
        }
        Self {
            full_node_confirmation_delay: full,
            light_node_confirmation_delay: light,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_node_confirmation_delay.is_none() && self.light_node_confirmation_delay.is_none()
    }
}
