//! Outputs, inputs and commission records.
//!
//! All structures here are bincode-safe (no self-describing payloads).

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::unit::UnitHash;

/// A payment output. `asset == None` denotes the base currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub output_id: u64,
    pub message_index: u32,
    pub output_index: u32,
    pub address: Address,
    pub amount: u64,
    pub asset: Option<UnitHash>,
    pub denomination: u32,
    pub is_spent: bool,
}

/// Kinds of commission that can be claimed through inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommissionKind {
    Headers,
    Witnessing,
}

impl CommissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionKind::Headers => "headers",
            CommissionKind::Witnessing => "witnessing",
        }
    }

    /// Single-byte tag used in storage keys.
    pub fn tag(&self) -> u8 {
        match self {
            CommissionKind::Headers => 1,
            CommissionKind::Witnessing => 2,
        }
    }
}

/// What an input consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Transfer {
        src_unit: UnitHash,
        src_message_index: u32,
        src_output_index: u32,
    },
    HeadersCommission {
        address: Address,
        from_main_chain_index: u64,
        to_main_chain_index: u64,
    },
    Witnessing {
        address: Address,
        from_main_chain_index: u64,
        to_main_chain_index: u64,
    },
    Issue {
        serial_number: u64,
        amount: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub message_index: u32,
    pub input_index: u32,
    pub asset: Option<UnitHash>,
    pub kind: InputKind,
}

impl Input {
    /// The commission claim carried by this input, if any.
    pub fn commission_claim(&self) -> Option<(CommissionKind, &Address, u64, u64)> {
        match &self.kind {
            InputKind::HeadersCommission {
                address,
                from_main_chain_index,
                to_main_chain_index,
            } => Some((
                CommissionKind::Headers,
                address,
                *from_main_chain_index,
                *to_main_chain_index,
            )),
            InputKind::Witnessing {
                address,
                from_main_chain_index,
                to_main_chain_index,
            } => Some((
                CommissionKind::Witnessing,
                address,
                *from_main_chain_index,
                *to_main_chain_index,
            )),
            _ => None,
        }
    }
}

/// A commission credited to `address` at `main_chain_index`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionOutput {
    pub kind: CommissionKind,
    pub address: Address,
    pub main_chain_index: u64,
    pub amount: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_claim_only_for_commission_inputs() {
        let transfer = Input {
            message_index: 0,
            input_index: 0,
            asset: None,
            kind: InputKind::Transfer {
                src_unit: UnitHash::new("src"),
                src_message_index: 0,
                src_output_index: 1,
            },
        };
        assert!(transfer.commission_claim().is_none());

        let witnessing = Input {
            kind: InputKind::Witnessing {
                address: Address::new("W"),
                from_main_chain_index: 5,
                to_main_chain_index: 9,
            },
            ..transfer
        };
        let (kind, address, from, to) = witnessing.commission_claim().unwrap();
        assert_eq!(kind, CommissionKind::Witnessing);
        assert_eq!(address.as_str(), "W");
        assert_eq!((from, to), (5, 9));
    }

    #[test]
    fn inputs_survive_bincode() {
        let input = Input {
            message_index: 1,
            input_index: 2,
            asset: Some(UnitHash::new("asset")),
            kind: InputKind::HeadersCommission {
                address: Address::new("A"),
                from_main_chain_index: 1,
                to_main_chain_index: 3,
            },
        };
        let bytes = bincode::serialize(&input).unwrap();
        let decoded: Input = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, input);
    }
}
