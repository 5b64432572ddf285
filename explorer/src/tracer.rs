//! Witness-majority confirmation tracer.
//!
//! Full nodes treat a unit as final once a main-chain unit stabilizes it.
//! Light clients cannot validate that themselves; they wait until a majority
//! of the witnesses have authored main-chain units from the stabilization
//! point on. The tracer finds both moments.

use std::collections::HashSet;

use dagview_store::{AuthorStore, Ledger};
use dagview_types::{Address, Timestamp, UnitHash, WitnessParams};
use dagview_utils::spans::descent_span;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::ExplorerResult;
use crate::locator::StabilizationLocator;
use crate::walker::MainChainWalker;
use crate::witness::{validate_witness_set, WitnessResolver};

/// When a unit became final for full nodes and for light clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfirmationTimes {
    /// Timestamp of the stabilization point; `None` if not stable yet.
    pub full: Option<Timestamp>,
    /// Timestamp of the main-chain unit at which the witness majority was
    /// reached; `None` if not reached yet.
    pub light: Option<Timestamp>,
}

impl ConfirmationTimes {
    pub const NOT_STABLE: Self = Self {
        full: None,
        light: None,
    };
}

/// Distinct witnesses seen among main-chain authors.
///
/// Each witness counts once no matter how many units it authors.
#[derive(Debug)]
pub struct WitnessTally {
    witnesses: HashSet<Address>,
    found: HashSet<Address>,
    majority: usize,
}

impl WitnessTally {
    pub fn new(witnesses: &[Address], majority: usize) -> Self {
        Self {
            witnesses: witnesses.iter().cloned().collect(),
            found: HashSet::new(),
            majority,
        }
    }

    /// Record the authors of one unit; returns how many witnesses were new.
    pub fn record<'a>(&mut self, authors: impl IntoIterator<Item = &'a Address>) -> usize {
        let mut added = 0;
        for author in authors {
            if self.witnesses.contains(author) && self.found.insert(author.clone()) {
                added += 1;
            }
        }
        added
    }

    pub fn found(&self) -> usize {
        self.found.len()
    }

    pub fn has_majority(&self) -> bool {
        self.found.len() >= self.majority
    }
}

pub struct ConfirmationTracer<'a, L, W> {
    ledger: &'a L,
    witnesses: &'a W,
    params: WitnessParams,
}

impl<'a, L: Ledger, W: WitnessResolver> ConfirmationTracer<'a, L, W> {
    pub fn new(ledger: &'a L, witnesses: &'a W, params: WitnessParams) -> Self {
        Self {
            ledger,
            witnesses,
            params,
        }
    }

    /// Trace the full-node and light-client confirmation times of `start`,
    /// a main-chain unit.
    ///
    /// The stabilization point's own authors count toward the majority
    /// before the walk descends any further. Store failures abort the whole
    /// trace; no partial result is returned for them.
    pub fn trace_confirmation(
        &self,
        start: &UnitHash,
        cancel: &CancelToken,
    ) -> ExplorerResult<ConfirmationTimes> {
        let units = self.ledger.unit_store();
        let locator = StabilizationLocator::new(units);
        let Some(stabilizer) = locator.find_stabilization_point(start, cancel)? else {
            return Ok(ConfirmationTimes::NOT_STABLE);
        };

        let witnesses = self.witnesses.witnesses_for(&stabilizer.unit)?;
        if let Err(e) = validate_witness_set(&stabilizer.unit, &witnesses, &self.params) {
            warn!(unit = %stabilizer.unit, error = %e, "cannot assess witness majority");
            return Err(e);
        }

        let full = stabilizer.timestamp;
        let mut tally = WitnessTally::new(&witnesses, self.params.majority_of_witnesses);
        let walker = MainChainWalker::new(units);
        let _span = descent_span(stabilizer.unit.as_str()).entered();

        let mut current = stabilizer;
        loop {
            cancel.check()?;
            let authors = self.ledger.author_store().authors_of(&current.unit)?;
            let added = tally.record(authors.iter().map(|a| &a.address));
            debug!(
                unit = %current.unit,
                mci = ?current.main_chain_index,
                added,
                found = tally.found(),
                "visited main-chain unit"
            );

            if tally.has_majority() {
                if current.timestamp < full {
                    warn!(
                        start = %start,
                        full = %full,
                        light = %current.timestamp,
                        "majority reached at a unit timestamped before the stabilization point"
                    );
                }
                return Ok(ConfirmationTimes {
                    full: Some(full),
                    light: Some(current.timestamp),
                });
            }

            cancel.check()?;
            match walker.step(&current.unit)? {
                Some(next) => current = next,
                None => {
                    debug!(start = %start, found = tally.found(), "witness majority not reached yet");
                    return Ok(ConfirmationTimes {
                        full: Some(full),
                        light: None,
                    });
                }
            }
        }
    }
}
