//! Snapshot import.
//!
//! Loads a [`LedgerSnapshot`] into the LMDB environment in one write
//! transaction. Either every record of the snapshot becomes visible or none
//! does.

use tracing::{info, warn};

use dagview_store::{LedgerSnapshot, StoreError};
use dagview_utils::spans::import_span;

use crate::environment::LmdbEnvironment;

/// Counts of what an import wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub units: usize,
    pub commission_outputs: usize,
    pub aa_responses: usize,
    pub assets: usize,
    pub definitions: usize,
}

impl LmdbEnvironment {
    /// Import `snapshot`. Units that are already stored are refused with
    /// [`StoreError::Duplicate`] and nothing is written.
    pub fn import_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<ImportReport, StoreError> {
        let _span = import_span(snapshot.units.len()).entered();
        snapshot.validate()?;

        let mut batch = self.write_batch()?;
        for stored in &snapshot.units {
            if batch.contains_unit(&stored.props.unit)? {
                warn!(unit = %stored.props.unit, "unit already stored, aborting import");
                return Err(StoreError::Duplicate(format!("unit {}", stored.props.unit)));
            }
            batch.put_unit(stored)?;
        }
        for commission in &snapshot.commission_outputs {
            batch.put_commission(commission)?;
        }
        for response in &snapshot.aa_responses {
            batch.put_aa_response(response)?;
        }
        for asset in &snapshot.assets {
            batch.put_asset(asset)?;
        }
        for (chash, definition) in &snapshot.definitions {
            batch.put_definition(chash, definition)?;
        }
        batch.commit()?;

        let report = ImportReport {
            units: snapshot.units.len(),
            commission_outputs: snapshot.commission_outputs.len(),
            aa_responses: snapshot.aa_responses.len(),
            assets: snapshot.assets.len(),
            definitions: snapshot.definitions.len(),
        };
        info!(
            units = report.units,
            commissions = report.commission_outputs,
            aa_responses = report.aa_responses,
            assets = report.assets,
            definitions = report.definitions,
            "snapshot imported"
        );
        Ok(report)
    }
}
