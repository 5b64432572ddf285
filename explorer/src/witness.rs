//! Witness resolution: which addresses count toward the majority for a unit.

use std::collections::HashSet;

use dagview_store::{AuthorStore, Ledger, UnitStore};
use dagview_types::{Address, UnitHash, WitnessParams};

use crate::error::{ExplorerError, ExplorerResult};

/// Returns the ordered witness list of a unit.
pub trait WitnessResolver {
    fn witnesses_for(&self, unit: &UnitHash) -> ExplorerResult<Vec<Address>>;
}

/// Resolves witnesses from the ledger store.
///
/// - Protocol version 4 and later: the externally determined operator list
///   (`op_list`), which units no longer embed.
/// - Older units: the list stored for the unit itself, else the list stored
///   for the unit it references as `witness_list_unit`.
pub struct LedgerWitnessResolver<'a, L> {
    ledger: &'a L,
    op_list: &'a [Address],
}

impl<'a, L: Ledger> LedgerWitnessResolver<'a, L> {
    pub fn new(ledger: &'a L, op_list: &'a [Address]) -> Self {
        Self { ledger, op_list }
    }
}

impl<L: Ledger> WitnessResolver for LedgerWitnessResolver<'_, L> {
    fn witnesses_for(&self, unit: &UnitHash) -> ExplorerResult<Vec<Address>> {
        let props = self
            .ledger
            .unit_store()
            .get_props(unit)?
            .ok_or_else(|| ExplorerError::UnitNotFound(unit.clone()))?;
        if props.protocol_major_version() >= 4 {
            return Ok(self.op_list.to_vec());
        }

        let own = self.ledger.author_store().unit_witnesses(unit)?;
        if !own.is_empty() {
            return Ok(own);
        }
        match &props.witness_list_unit {
            Some(list_unit) => Ok(self.ledger.author_store().unit_witnesses(list_unit)?),
            None => Ok(Vec::new()),
        }
    }
}

/// A fixed witness list, for callers that resolve witnesses elsewhere.
impl WitnessResolver for Vec<Address> {
    fn witnesses_for(&self, _unit: &UnitHash) -> ExplorerResult<Vec<Address>> {
        Ok(self.clone())
    }
}

/// Reject witness lists the majority count cannot be assessed against:
/// empty, containing duplicates, or not of the protocol's size.
pub fn validate_witness_set(
    unit: &UnitHash,
    witnesses: &[Address],
    params: &WitnessParams,
) -> ExplorerResult<()> {
    let reason = if witnesses.is_empty() {
        Some("witness list is empty".to_string())
    } else if witnesses.iter().collect::<HashSet<_>>().len() != witnesses.len() {
        Some("witness list contains duplicates".to_string())
    } else if witnesses.len() != params.count_witnesses {
        Some(format!(
            "expected {} witnesses, found {}",
            params.count_witnesses,
            witnesses.len()
        ))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ExplorerError::InconsistentWitnessSet {
            unit: unit.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagview_nullables::{witness_addresses, NullStore, UnitFixture};
    use dagview_store::LedgerSnapshot;

    fn store(witnesses: &[Address]) -> NullStore {
        let snapshot = LedgerSnapshot {
            units: vec![
                UnitFixture::new("g", 1)
                    .on_main_chain(0)
                    .witnesses(witnesses)
                    .build(),
                UnitFixture::new("old", 2)
                    .best_parent("g")
                    .witness_list_unit("g")
                    .build(),
                UnitFixture::new("own", 3)
                    .best_parent("g")
                    .stored_witnesses(&witnesses[..3])
                    .witness_list_unit("g")
                    .build(),
                UnitFixture::new("v4", 4)
                    .best_parent("g")
                    .version("4.0")
                    .build(),
            ],
            ..Default::default()
        };
        NullStore::from_snapshot(&snapshot).unwrap()
    }

    #[test]
    fn resolution_order() {
        let witnesses = witness_addresses(12);
        let op_list = witness_addresses(20)[8..].to_vec();
        let store = store(&witnesses);
        let resolver = LedgerWitnessResolver::new(&store, &op_list);

        assert_eq!(resolver.witnesses_for(&UnitHash::new("g")).unwrap(), witnesses);
        assert_eq!(resolver.witnesses_for(&UnitHash::new("old")).unwrap(), witnesses);
        assert_eq!(
            resolver.witnesses_for(&UnitHash::new("own")).unwrap(),
            witnesses[..3].to_vec()
        );
        assert_eq!(resolver.witnesses_for(&UnitHash::new("v4")).unwrap(), op_list);
    }

    #[test]
    fn unknown_unit() {
        let store = store(&witness_addresses(12));
        let resolver = LedgerWitnessResolver::new(&store, &[]);
        let err = resolver.witnesses_for(&UnitHash::new("nope")).unwrap_err();
        assert!(matches!(err, ExplorerError::UnitNotFound(_)));
    }

    #[test]
    fn validation_rejects_malformed_lists() {
        let params = WitnessParams::MAINNET;
        let unit = UnitHash::new("u");
        let good = witness_addresses(12);
        assert!(validate_witness_set(&unit, &good, &params).is_ok());
        assert!(validate_witness_set(&unit, &[], &params).is_err());
        assert!(validate_witness_set(&unit, &good[..11], &params).is_err());

        let mut duplicated = good.clone();
        duplicated[11] = duplicated[0].clone();
        let err = validate_witness_set(&unit, &duplicated, &params).unwrap_err();
        assert!(matches!(err, ExplorerError::InconsistentWitnessSet { .. }));
    }
}
