//! Caller-facing confirmation-delay entry point.

use dagview_store::{Ledger, StoreError, UnitStore};
use dagview_types::{UnitProps, WitnessParams};
use dagview_utils::spans::confirmation_span;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::delay::ConfirmationDelays;
use crate::error::ExplorerResult;
use crate::tracer::ConfirmationTracer;
use crate::witness::WitnessResolver;

/// Computes confirmation delays for stored units.
pub struct ConfirmationResolver<'a, L, W> {
    ledger: &'a L,
    witnesses: &'a W,
    params: WitnessParams,
}

impl<'a, L: Ledger, W: WitnessResolver> ConfirmationResolver<'a, L, W> {
    pub fn new(ledger: &'a L, witnesses: &'a W, params: WitnessParams) -> Self {
        Self {
            ledger,
            witnesses,
            params,
        }
    }

    /// Full-node and light-client confirmation delays of the unit described
    /// by `props`.
    ///
    /// Units that are not stable yet (or have no main-chain index) have no
    /// delays; this is not an error. The trace starts from the main-chain
    /// unit at the unit's main-chain index.
    pub fn confirmation_delays(
        &self,
        props: &UnitProps,
        cancel: &CancelToken,
    ) -> ExplorerResult<ConfirmationDelays> {
        let _span = confirmation_span(props.unit.as_str()).entered();
        let Some(mci) = props.main_chain_index.filter(|_| props.is_stable) else {
            debug!(unit = %props.unit, "unit not stable; no confirmation delays");
            return Ok(ConfirmationDelays::default());
        };

        let start = if props.is_on_main_chain {
            props.unit.clone()
        } else {
            cancel.check()?;
            self.ledger
                .unit_store()
                .main_chain_unit_at(mci)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!(
                        "stable unit {} has main-chain index {mci} but no main-chain unit there",
                        props.unit
                    ))
                })?
                .unit
        };

        let times = ConfirmationTracer::new(self.ledger, self.witnesses, self.params)
            .trace_confirmation(&start, cancel)?;
        let delays = ConfirmationDelays::from_times(props.resolved_timestamp(), &times);
        debug!(
            unit = %props.unit,
            start = %start,
            full = ?delays.full_node_confirmation_delay,
            light = ?delays.light_node_confirmation_delay,
            "confirmation delays"
        );
        Ok(delays)
    }
}
