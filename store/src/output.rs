//! Output, input and commission storage traits.

use crate::StoreError;
use dagview_types::{Address, CommissionKind, Input, Output, UnitHash};

pub trait OutputStore {
    /// Outputs of a unit ordered by `(message_index, output_index)`.
    fn outputs_of(&self, unit: &UnitHash) -> Result<Vec<Output>, StoreError>;

    /// Inputs of a unit ordered by `(message_index, input_index)`.
    fn inputs_of(&self, unit: &UnitHash) -> Result<Vec<Input>, StoreError>;

    /// The unit whose input spends the given output, if it has been spent.
    fn spender_of(
        &self,
        src_unit: &UnitHash,
        message_index: u32,
        output_index: u32,
    ) -> Result<Option<UnitHash>, StoreError>;

    /// A single output by position.
    fn output_at(
        &self,
        unit: &UnitHash,
        message_index: u32,
        output_index: u32,
    ) -> Result<Option<Output>, StoreError> {
        Ok(self
            .outputs_of(unit)?
            .into_iter()
            .find(|o| o.message_index == message_index && o.output_index == output_index))
    }
}

pub trait CommissionStore {
    /// Sum of `kind` commissions credited to `address` over the inclusive
    /// main-chain index range `[from_mci, to_mci]`.
    fn commission_sum(
        &self,
        kind: CommissionKind,
        address: &Address,
        from_mci: u64,
        to_mci: u64,
    ) -> Result<u64, StoreError>;
}
