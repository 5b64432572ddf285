//! Autonomous-agent response storage trait.

use crate::StoreError;
use dagview_types::{AaResponse, UnitHash};

pub trait AaResponseStore {
    /// Responses triggered by `trigger_unit`, sorted by agent address.
    fn responses_to(&self, trigger_unit: &UnitHash) -> Result<Vec<AaResponse>, StoreError>;

    /// The unit that triggered `response_unit`, if it is an agent response.
    fn trigger_of(&self, response_unit: &UnitHash) -> Result<Option<UnitHash>, StoreError>;
}
