//! Unit detail record: everything the explorer shows for one unit.

use std::collections::BTreeMap;

use dagview_store::{Ledger, UnitStore};
use dagview_types::{AaResponse, Address, Author, Joint, Message, Sequence, UnitHash};
use dagview_utils::spans::unit_info_span;
use serde::Serialize;
use tracing::debug;

use crate::assets::{decorate_payment_messages, LedgerAssetNames};
use crate::cancel::CancelToken;
use crate::confirmation::ConfirmationResolver;
use crate::delay::ConfirmationDelays;
use crate::details::{TransferInfo, UnitCommissions, UnitOutput};
use crate::error::ExplorerResult;
use crate::explorer::Explorer;
use crate::witness::WitnessResolver;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitInfo {
    pub unit: UnitHash,
    pub sequence: Sequence,
    /// Children of the unit.
    pub child: Vec<UnitHash>,
    pub parents: Vec<UnitHash>,
    pub authors: Vec<Author>,
    pub headers_commission: u64,
    pub payload_commission: u64,
    pub main_chain_index: Option<u64>,
    pub latest_included_mc_index: Option<u64>,
    pub level: u64,
    pub tps_fee: Option<u64>,
    pub actual_tps_fee: Option<u64>,
    pub burn_fee: Option<u64>,
    pub oversize_fee: Option<u64>,
    pub witnessed_level: u64,
    pub is_stable: bool,
    pub last_ball_unit: Option<UnitHash>,
    pub messages: Vec<Message>,
    #[serde(rename = "transfersInfo")]
    pub transfers_info: BTreeMap<String, TransferInfo>,
    #[serde(rename = "outputsUnit")]
    pub outputs_unit: BTreeMap<String, Vec<UnitOutput>>,
    pub timestamp: Option<u64>,
    #[serde(rename = "assocCommissions")]
    pub assoc_commissions: UnitCommissions,
    #[serde(rename = "arrAaResponses")]
    pub aa_responses: Option<Vec<AaResponse>>,
    pub trigger_unit: Option<UnitHash>,
    #[serde(rename = "isAsset")]
    pub is_asset: bool,
    #[serde(rename = "objJoint")]
    pub joint: Joint,
    /// Present only for stable units.
    #[serde(flatten)]
    pub confirmation: Option<ConfirmationDelays>,
    /// Present only for protocol versions before 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<Vec<Address>>,
}

impl<L: Ledger> Explorer<L> {
    /// The detail record of `unit`, `None` if it is not stored.
    ///
    /// Confirmation delays are computed only for stable units; failures of
    /// that computation fail the whole record.
    pub fn unit_info(&self, unit: &UnitHash, cancel: &CancelToken) -> ExplorerResult<Option<UnitInfo>> {
        let _span = unit_info_span(unit.as_str()).entered();
        let units = self.ledger().unit_store();
        let Some(props) = units.get_props(unit)? else {
            debug!(unit = %unit, "unit not found");
            return Ok(None);
        };
        let Some(mut joint) = units.read_joint(unit)? else {
            debug!(unit = %unit, "unit has props but no content");
            return Ok(None);
        };

        let family = self.parents_and_children(unit)?;
        let transfers_info = self.transfers_info(unit)?;
        let outputs_unit = self.unit_outputs(unit)?;
        let assoc_commissions = self.unit_commissions(unit)?;
        joint.unit.authors =
            self.authors_with_definitions(unit, std::mem::take(&mut joint.unit.authors))?;
        let aa_responses = self.aa_responses(unit)?;
        let trigger_unit = self.trigger_unit(unit)?;
        decorate_payment_messages(&mut joint.unit.messages, &LedgerAssetNames::new(self.ledger()))?;
        let is_asset = self.is_asset(unit)?;

        let witness_resolver = self.witness_resolver();
        let confirmation = if props.is_stable {
            let resolver = ConfirmationResolver::new(
                self.ledger(),
                &witness_resolver,
                self.settings().witness_params,
            );
            Some(resolver.confirmation_delays(&props, cancel)?)
        } else {
            None
        };

        let witnesses = if props.protocol_major_version() >= 4 {
            None
        } else if let Some(embedded) = &joint.unit.witnesses {
            Some(embedded.clone())
        } else {
            Some(witness_resolver.witnesses_for(unit)?)
        };

        Ok(Some(UnitInfo {
            unit: unit.clone(),
            sequence: props.sequence,
            child: family.children,
            parents: family.parents,
            authors: joint.unit.authors.clone(),
            headers_commission: joint.unit.headers_commission,
            payload_commission: joint.unit.payload_commission,
            main_chain_index: props.main_chain_index,
            latest_included_mc_index: props.latest_included_mc_index,
            level: props.level,
            tps_fee: props.tps_fee,
            actual_tps_fee: props.actual_tps_fee,
            burn_fee: props.burn_fee,
            oversize_fee: props.oversize_fee,
            witnessed_level: props.witnessed_level,
            is_stable: props.is_stable,
            last_ball_unit: joint.unit.last_ball_unit.clone(),
            messages: joint.unit.messages.clone(),
            transfers_info,
            outputs_unit,
            timestamp: joint.unit.timestamp,
            assoc_commissions,
            aa_responses,
            trigger_unit,
            is_asset,
            joint,
            confirmation,
            witnesses,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExplorerSettings;
    use dagview_nullables::{witness_addresses, NullStore, UnitFixture};
    use dagview_store::LedgerSnapshot;
    use dagview_types::{AssetRecord, WitnessParams};
    use serde_json::json;
    use std::sync::Arc;

    const PARAMS: WitnessParams = WitnessParams {
        count_witnesses: 3,
        majority_of_witnesses: 2,
    };

    fn explorer() -> Explorer<NullStore> {
        let w = witness_addresses(3);
        let snapshot = LedgerSnapshot {
            units: vec![
                UnitFixture::new("g", 1)
                    .on_main_chain(0)
                    .stable()
                    .timestamp(1000)
                    .witnesses(&w)
                    .build(),
                UnitFixture::new("a", 2)
                    .on_main_chain(1)
                    .stable()
                    .best_parent("g")
                    .witness_list_unit("g")
                    .timestamp(1010)
                    .message(Message {
                        app: "payment".into(),
                        payload_location: "inline".into(),
                        payload_hash: None,
                        payload: Some(json!({ "asset": "tok", "outputs": [] })),
                    })
                    .build(),
                UnitFixture::new("b", 3)
                    .on_main_chain(2)
                    .best_parent("a")
                    .last_ball("a")
                    .timestamp(1040)
                    .authored_by(&w[..2])
                    .witness_list_unit("g")
                    .build(),
                UnitFixture::new("v4", 4)
                    .best_parent("b")
                    .version("4.0")
                    .timestamp(1050)
                    .build(),
            ],
            assets: vec![AssetRecord {
                asset: UnitHash::new("tok"),
                name: Some("TOK".into()),
                decimals: Some(0),
            }],
            ..Default::default()
        };
        let store = NullStore::from_snapshot(&snapshot).unwrap();
        Explorer::new(
            Arc::new(store),
            ExplorerSettings {
                witness_params: PARAMS,
                op_list: Vec::new(),
            },
        )
    }

    #[test]
    fn stable_unit_carries_delays_and_witnesses() {
        let explorer = explorer();
        let info = explorer
            .unit_info(&UnitHash::new("a"), &CancelToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            info.confirmation,
            Some(ConfirmationDelays {
                full_node_confirmation_delay: Some(30),
                light_node_confirmation_delay: Some(30),
            })
        );
        assert_eq!(info.witnesses, Some(witness_addresses(3)));
        assert_eq!(info.child, vec![UnitHash::new("b")]);
        assert_eq!(info.messages[0].payload.as_ref().unwrap()["assetName"], json!("TOK"));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["full_node_confirmation_delay"], json!(30));
        assert_eq!(json["objJoint"]["unit"]["unit"], json!("a"));
        assert!(json.get("arrAaResponses").unwrap().is_null());
    }

    #[test]
    fn unstable_v4_unit_has_neither_delays_nor_witnesses() {
        let explorer = explorer();
        let info = explorer
            .unit_info(&UnitHash::new("v4"), &CancelToken::new())
            .unwrap()
            .unwrap();
        assert!(info.confirmation.is_none());
        assert!(info.witnesses.is_none());
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("full_node_confirmation_delay").is_none());
        assert!(json.get("witnesses").is_none());
    }

    #[test]
    fn unknown_unit_is_none() {
        let explorer = explorer();
        assert!(explorer
            .unit_info(&UnitHash::new("nope"), &CancelToken::new())
            .unwrap()
            .is_none());
    }
}
