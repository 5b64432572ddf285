//! The explorer facade: one handle over a ledger plus its witness settings.
//!
//! Graph listings, unit details and confirmation delays are all methods on
//! [`Explorer`]; they live in their own modules as separate `impl` blocks.

use std::sync::Arc;

use dagview_store::{Ledger, UnitStore};
use dagview_types::{Address, UnitHash, WitnessParams};

use crate::cancel::CancelToken;
use crate::confirmation::ConfirmationResolver;
use crate::delay::ConfirmationDelays;
use crate::error::{ExplorerError, ExplorerResult};
use crate::tracer::{ConfirmationTimes, ConfirmationTracer};
use crate::witness::LedgerWitnessResolver;

/// Witness configuration supplied by the ledger engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorerSettings {
    pub witness_params: WitnessParams,
    /// Witness list of protocol version 4 and later units.
    pub op_list: Vec<Address>,
}

pub struct Explorer<L> {
    ledger: Arc<L>,
    settings: ExplorerSettings,
}

impl<L> Clone for Explorer<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            settings: self.settings.clone(),
        }
    }
}

impl<L: Ledger> Explorer<L> {
    pub fn new(ledger: Arc<L>, settings: ExplorerSettings) -> Self {
        Self { ledger, settings }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn witness_resolver(&self) -> LedgerWitnessResolver<'_, L> {
        LedgerWitnessResolver::new(&self.ledger, &self.settings.op_list)
    }

    /// Confirmation delays of `unit`; `UnitNotFound` if it is not stored.
    pub fn confirmation_delays(
        &self,
        unit: &UnitHash,
        cancel: &CancelToken,
    ) -> ExplorerResult<ConfirmationDelays> {
        cancel.check()?;
        let props = self
            .ledger
            .unit_store()
            .get_props(unit)?
            .ok_or_else(|| ExplorerError::UnitNotFound(unit.clone()))?;
        let witnesses = self.witness_resolver();
        ConfirmationResolver::new(self.ledger(), &witnesses, self.settings.witness_params)
            .confirmation_delays(&props, cancel)
    }

    /// Raw confirmation times starting from the main-chain unit `start`.
    pub fn trace_confirmation(
        &self,
        start: &UnitHash,
        cancel: &CancelToken,
    ) -> ExplorerResult<ConfirmationTimes> {
        let witnesses = self.witness_resolver();
        ConfirmationTracer::new(self.ledger(), &witnesses, self.settings.witness_params)
            .trace_confirmation(start, cancel)
    }
}
