//! Autonomous-agent response records.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::unit::UnitHash;

/// The response of an autonomous agent to a triggering unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaResponse {
    pub trigger_unit: UnitHash,
    pub aa_address: Address,
    /// Response object as the agent emitted it (JSON text).
    pub response: Option<String>,
    pub bounced: bool,
    pub response_unit: Option<UnitHash>,
}
