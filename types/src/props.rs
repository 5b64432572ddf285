//! Per-unit properties maintained by the ledger engine.
//!
//! These are the derived, indexed attributes of a unit (main-chain placement,
//! stability, best parent, fees). The unit's signed content lives in
//! [`crate::joint::Joint`].

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;
use crate::unit::UnitHash;

/// Validation outcome of a unit as recorded by the ledger engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sequence {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "temp-bad")]
    TempBad,
    #[serde(rename = "final-bad")]
    FinalBad,
}

impl Sequence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sequence::Good => "good",
            Sequence::TempBad => "temp-bad",
            Sequence::FinalBad => "final-bad",
        }
    }
}

/// Stored properties of a single unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitProps {
    pub unit: UnitHash,
    /// Insertion order in the store; used as the listing cursor.
    pub rowid: u64,
    /// Protocol version string, e.g. `"1.0"`, `"4.0"`.
    pub version: String,
    pub main_chain_index: Option<u64>,
    pub latest_included_mc_index: Option<u64>,
    pub level: u64,
    pub witnessed_level: u64,
    pub is_on_main_chain: bool,
    pub is_stable: bool,
    pub sequence: Sequence,
    /// `None` only for the genesis unit.
    pub best_parent_unit: Option<UnitHash>,
    pub last_ball_unit: Option<UnitHash>,
    pub witness_list_unit: Option<UnitHash>,
    /// Explicit timestamp in seconds; `0` when the unit does not carry one.
    pub timestamp: u64,
    /// Time the unit was first stored, in seconds.
    pub creation_date: u64,
    pub headers_commission: u64,
    pub payload_commission: u64,
    pub tps_fee: Option<u64>,
    pub actual_tps_fee: Option<u64>,
    pub burn_fee: Option<u64>,
    pub oversize_fee: Option<u64>,
}

impl UnitProps {
    /// The unit's effective timestamp.
    ///
    /// Units from older protocol versions carry no timestamp (stored as `0`);
    /// their creation date stands in. Every reader of unit time goes through
    /// this method.
    pub fn resolved_timestamp(&self) -> Timestamp {
        if self.timestamp == 0 {
            Timestamp::new(self.creation_date)
        } else {
            Timestamp::new(self.timestamp)
        }
    }

    /// Major component of the protocol version (`"4.0t"` -> 4).
    pub fn protocol_major_version(&self) -> u32 {
        self.version
            .split('.')
            .next()
            .and_then(|major| major.parse().ok())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(timestamp: u64, creation_date: u64, version: &str) -> UnitProps {
        UnitProps {
            unit: UnitHash::new("unit-a"),
            rowid: 1,
            version: version.to_string(),
            main_chain_index: Some(10),
            latest_included_mc_index: Some(9),
            level: 20,
            witnessed_level: 15,
            is_on_main_chain: true,
            is_stable: true,
            sequence: Sequence::Good,
            best_parent_unit: None,
            last_ball_unit: None,
            witness_list_unit: None,
            timestamp,
            creation_date,
            headers_commission: 344,
            payload_commission: 157,
            tps_fee: None,
            actual_tps_fee: None,
            burn_fee: None,
            oversize_fee: None,
        }
    }

    #[test]
    fn explicit_timestamp_wins() {
        assert_eq!(props(1500, 1400, "4.0").resolved_timestamp(), Timestamp::new(1500));
    }

    #[test]
    fn zero_timestamp_falls_back_to_creation_date() {
        assert_eq!(props(0, 1400, "1.0").resolved_timestamp(), Timestamp::new(1400));
    }

    #[test]
    fn protocol_major_version_parsing() {
        assert_eq!(props(0, 0, "1.0").protocol_major_version(), 1);
        assert_eq!(props(0, 0, "4.0t").protocol_major_version(), 4);
        assert_eq!(props(0, 0, "garbage").protocol_major_version(), 1);
    }

    #[test]
    fn props_survive_bincode() {
        let original = props(0, 1400, "3.0");
        let bytes = bincode::serialize(&original).unwrap();
        let decoded: UnitProps = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn sequence_wire_names() {
        let json = serde_json::to_string(&Sequence::TempBad).unwrap();
        assert_eq!(json, "\"temp-bad\"");
        assert_eq!(Sequence::FinalBad.as_str(), "final-bad");
    }
}
