//! Witness parameters supplied by the surrounding ledger engine.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Size of every witness list and the number of distinct witnesses that make
/// a majority. Both are protocol constants of the ledger engine; they are
/// passed in rather than hard-coded so test networks can shrink them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessParams {
    pub count_witnesses: usize,
    pub majority_of_witnesses: usize,
}

impl WitnessParams {
    pub const MAINNET: Self = Self {
        count_witnesses: 12,
        majority_of_witnesses: 7,
    };

    pub fn new(count_witnesses: usize, majority_of_witnesses: usize) -> Result<Self, TypesError> {
        let params = Self {
            count_witnesses,
            majority_of_witnesses,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), TypesError> {
        if self.majority_of_witnesses == 0 {
            return Err(TypesError::InvalidWitnessParams(
                "majority must be at least 1".into(),
            ));
        }
        if self.majority_of_witnesses > self.count_witnesses {
            return Err(TypesError::InvalidWitnessParams(format!(
                "majority {} exceeds witness count {}",
                self.majority_of_witnesses, self.count_witnesses
            )));
        }
        Ok(())
    }
}

impl Default for WitnessParams {
    fn default() -> Self {
        Self::MAINNET
    }
}
