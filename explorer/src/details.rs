//! Per-unit detail lookups: parenthood, transfers, outputs, commissions,
//! author definitions and AA responses.

use std::collections::BTreeMap;

use dagview_store::{
    AaResponseStore, AssetStore, AuthorStore, CommissionStore, Ledger, OutputStore,
    ParenthoodStore,
};
use dagview_types::{AaResponse, Address, Author, CommissionKind, InputKind, UnitHash};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ExplorerResult;
use crate::explorer::Explorer;

/// Key used for amounts in the base currency.
pub const BASE_ASSET_KEY: &str = "base";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParentsAndChildren {
    pub parents: Vec<UnitHash>,
    pub children: Vec<UnitHash>,
}

/// A source output consumed by one of the unit's transfer inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferInfo {
    pub address: Address,
    pub unit: UnitHash,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnitOutput {
    pub output_id: u64,
    pub address: Address,
    pub amount: u64,
    pub asset: Option<UnitHash>,
    pub denomination: u32,
    pub is_spent: bool,
    /// The spending unit, serialized as `false` while unspent.
    #[serde(serialize_with = "unit_or_false")]
    pub spent: Option<UnitHash>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommissionSummary {
    pub address: Address,
    pub from_mci: u64,
    pub to_mci: u64,
    pub sum: u64,
}

/// Commission claims of a unit keyed `"{from_mci}_{to_mci}"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UnitCommissions {
    pub headers: BTreeMap<String, CommissionSummary>,
    pub witnessing: BTreeMap<String, CommissionSummary>,
}

fn unit_or_false<S: Serializer>(spent: &Option<UnitHash>, serializer: S) -> Result<S::Ok, S::Error> {
    match spent {
        Some(unit) => unit.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

fn asset_key(asset: Option<&UnitHash>) -> String {
    asset.map_or_else(|| BASE_ASSET_KEY.to_string(), |a| a.to_string())
}

impl<L: Ledger> Explorer<L> {
    pub fn parents_and_children(&self, unit: &UnitHash) -> ExplorerResult<ParentsAndChildren> {
        let parenthoods = self.ledger().parenthood_store();
        Ok(ParentsAndChildren {
            parents: parenthoods.parents_of(unit)?,
            children: parenthoods.children_of(unit)?,
        })
    }

    /// Source outputs spent by the unit's transfer inputs, keyed
    /// `"{src_unit}_{output_index}_{asset}"`.
    pub fn transfers_info(&self, unit: &UnitHash) -> ExplorerResult<BTreeMap<String, TransferInfo>> {
        let outputs = self.ledger().output_store();
        let mut transfers = BTreeMap::new();
        for input in outputs.inputs_of(unit)? {
            let InputKind::Transfer {
                src_unit,
                src_message_index,
                src_output_index,
            } = &input.kind
            else {
                continue;
            };
            if let Some(output) = outputs.output_at(src_unit, *src_message_index, *src_output_index)? {
                transfers.insert(
                    format!(
                        "{src_unit}_{}_{}",
                        output.output_index,
                        asset_key(output.asset.as_ref())
                    ),
                    TransferInfo {
                        address: output.address,
                        unit: src_unit.clone(),
                        amount: output.amount,
                    },
                );
            }
        }
        Ok(transfers)
    }

    /// The unit's outputs grouped by asset, in output order.
    pub fn unit_outputs(&self, unit: &UnitHash) -> ExplorerResult<BTreeMap<String, Vec<UnitOutput>>> {
        let store = self.ledger().output_store();
        let mut grouped: BTreeMap<String, Vec<UnitOutput>> = BTreeMap::new();
        for output in store.outputs_of(unit)? {
            let spent = if output.is_spent {
                store.spender_of(unit, output.message_index, output.output_index)?
            } else {
                None
            };
            grouped
                .entry(asset_key(output.asset.as_ref()))
                .or_default()
                .push(UnitOutput {
                    output_id: output.output_id,
                    address: output.address,
                    amount: output.amount,
                    asset: output.asset,
                    denomination: output.denomination,
                    is_spent: output.is_spent,
                    spent,
                });
        }
        Ok(grouped)
    }

    /// Headers and witnessing commission claims with the amounts they sum.
    pub fn unit_commissions(&self, unit: &UnitHash) -> ExplorerResult<UnitCommissions> {
        let commissions = self.ledger().commission_store();
        let mut result = UnitCommissions::default();
        for input in self.ledger().output_store().inputs_of(unit)? {
            let Some((kind, address, from, to)) = input.commission_claim() else {
                continue;
            };
            let sum = commissions.commission_sum(kind, address, from, to)?;
            let target = match kind {
                CommissionKind::Headers => &mut result.headers,
                CommissionKind::Witnessing => &mut result.witnessing,
            };
            target.insert(
                format!("{from}_{to}"),
                CommissionSummary {
                    address: address.clone(),
                    from_mci: from,
                    to_mci: to,
                    sum,
                },
            );
        }
        Ok(result)
    }

    /// Fill each author's `definition` from the definitions revealed in this
    /// unit; authors that revealed none get `false`.
    pub fn authors_with_definitions(
        &self,
        unit: &UnitHash,
        mut authors: Vec<Author>,
    ) -> ExplorerResult<Vec<Author>> {
        let store = self.ledger().author_store();
        let stored = store.authors_of(unit)?;
        for author in &mut authors {
            let chash = stored
                .iter()
                .find(|a| a.address == author.address)
                .and_then(|a| a.definition_chash.as_deref());
            let definition = match chash {
                Some(chash) => store.definition(chash)?,
                None => None,
            };
            author.definition = Some(definition.unwrap_or(Value::Bool(false)));
        }
        Ok(authors)
    }

    /// AA responses triggered by `unit`; `None` if there are none.
    pub fn aa_responses(&self, unit: &UnitHash) -> ExplorerResult<Option<Vec<AaResponse>>> {
        let responses = self.ledger().aa_response_store().responses_to(unit)?;
        Ok((!responses.is_empty()).then_some(responses))
    }

    /// Whether `unit` defines an asset.
    pub fn is_asset(&self, unit: &UnitHash) -> ExplorerResult<bool> {
        Ok(self.ledger().asset_store().get_asset(unit)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExplorerSettings;
    use dagview_nullables::{NullStore, UnitFixture};
    use dagview_store::{LedgerSnapshot, UnitStore};
    use dagview_types::{AssetRecord, CommissionOutput, Input, Output};
    use serde_json::json;
    use std::sync::Arc;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn output(
        id: u64,
        index: u32,
        address: &str,
        amount: u64,
        asset: Option<&str>,
        spent: bool,
    ) -> Output {
        Output {
            output_id: id,
            message_index: 0,
            output_index: index,
            address: addr(address),
            amount,
            asset: asset.map(UnitHash::new),
            denomination: 1,
            is_spent: spent,
        }
    }

    fn transfer(index: u32, src: &str, out: u32) -> Input {
        Input {
            message_index: 0,
            input_index: index,
            asset: None,
            kind: InputKind::Transfer {
                src_unit: UnitHash::new(src),
                src_message_index: 0,
                src_output_index: out,
            },
        }
    }

    fn explorer() -> Explorer<NullStore> {
        let snapshot = LedgerSnapshot {
            units: vec![
                UnitFixture::new("src", 1)
                    .on_main_chain(0)
                    .output(output(10, 0, "ALICE", 500, None, true))
                    .output(output(11, 1, "BOB", 70, Some("tok"), true))
                    .output(output(12, 2, "CAROL", 3, None, false))
                    .build(),
                UnitFixture::new("tok", 2)
                    .best_parent("src")
                    .authored_with_definition(&addr("ISSUER"), "CHASH1")
                    .authored_by(&[addr("COSIGNER")])
                    .build(),
                UnitFixture::new("spend", 3)
                    .best_parent("src")
                    .parent("tok")
                    .input(transfer(0, "src", 0))
                    .input(transfer(1, "src", 1))
                    .input(Input {
                        message_index: 0,
                        input_index: 2,
                        asset: None,
                        kind: InputKind::HeadersCommission {
                            address: addr("ALICE"),
                            from_main_chain_index: 1,
                            to_main_chain_index: 3,
                        },
                    })
                    .input(Input {
                        message_index: 0,
                        input_index: 3,
                        asset: None,
                        kind: InputKind::Witnessing {
                            address: addr("ALICE"),
                            from_main_chain_index: 2,
                            to_main_chain_index: 2,
                        },
                    })
                    .build(),
            ],
            commission_outputs: vec![
                CommissionOutput {
                    kind: CommissionKind::Headers,
                    address: addr("ALICE"),
                    main_chain_index: 1,
                    amount: 40,
                },
                CommissionOutput {
                    kind: CommissionKind::Headers,
                    address: addr("ALICE"),
                    main_chain_index: 3,
                    amount: 2,
                },
                CommissionOutput {
                    kind: CommissionKind::Headers,
                    address: addr("ALICE"),
                    main_chain_index: 4,
                    amount: 1000,
                },
                CommissionOutput {
                    kind: CommissionKind::Witnessing,
                    address: addr("ALICE"),
                    main_chain_index: 2,
                    amount: 9,
                },
            ],
            aa_responses: vec![AaResponse {
                trigger_unit: UnitHash::new("spend"),
                aa_address: addr("AA"),
                response: Some("{\"ok\":true}".into()),
                bounced: false,
                response_unit: None,
            }],
            assets: vec![AssetRecord {
                asset: UnitHash::new("tok"),
                name: Some("TOK".into()),
                decimals: Some(2),
            }],
            definitions: [("CHASH1".to_string(), json!(["sig", { "pubkey": "Ak..." }]))]
                .into_iter()
                .collect(),
        };
        let store = NullStore::from_snapshot(&snapshot).unwrap();
        Explorer::new(Arc::new(store), ExplorerSettings::default())
    }

    #[test]
    fn parents_and_children_are_sorted() {
        let explorer = explorer();
        let pc = explorer.parents_and_children(&UnitHash::new("spend")).unwrap();
        assert_eq!(pc.parents, vec![UnitHash::new("src"), UnitHash::new("tok")]);
        assert!(pc.children.is_empty());
        let pc = explorer.parents_and_children(&UnitHash::new("src")).unwrap();
        assert_eq!(pc.children, vec![UnitHash::new("spend"), UnitHash::new("tok")]);
    }

    #[test]
    fn transfers_are_keyed_by_source_and_asset() {
        let explorer = explorer();
        let transfers = explorer.transfers_info(&UnitHash::new("spend")).unwrap();
        let keys: Vec<&str> = transfers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["src_0_base", "src_1_tok"]);
        assert_eq!(transfers["src_0_base"].amount, 500);
        assert_eq!(transfers["src_1_tok"].address, addr("BOB"));
    }

    #[test]
    fn outputs_grouped_with_spender() {
        let explorer = explorer();
        let outputs = explorer.unit_outputs(&UnitHash::new("src")).unwrap();
        assert_eq!(outputs["base"].len(), 2);
        assert_eq!(outputs["tok"].len(), 1);
        assert_eq!(outputs["base"][0].spent, Some(UnitHash::new("spend")));
        assert_eq!(outputs["base"][1].spent, None);

        let json = serde_json::to_value(&outputs["base"]).unwrap();
        assert_eq!(json[0]["spent"], json!("spend"));
        assert_eq!(json[1]["spent"], json!(false));
    }

    #[test]
    fn commissions_sum_their_ranges() {
        let explorer = explorer();
        let commissions = explorer.unit_commissions(&UnitHash::new("spend")).unwrap();
        assert_eq!(commissions.headers["1_3"].sum, 42);
        assert_eq!(commissions.witnessing["2_2"].sum, 9);
        assert!(explorer
            .unit_commissions(&UnitHash::new("src"))
            .unwrap()
            .headers
            .is_empty());
    }

    #[test]
    fn definitions_or_false() {
        let explorer = explorer();
        let unit = UnitHash::new("tok");
        let joint = explorer
            .ledger()
            .unit_store()
            .read_joint(&unit)
            .unwrap()
            .unwrap();
        let authors = explorer
            .authors_with_definitions(&unit, joint.unit.authors)
            .unwrap();
        let issuer = authors.iter().find(|a| a.address == addr("ISSUER")).unwrap();
        assert_eq!(issuer.definition.as_ref().unwrap()[0], json!("sig"));
        let cosigner = authors.iter().find(|a| a.address == addr("COSIGNER")).unwrap();
        assert_eq!(cosigner.definition, Some(json!(false)));
    }

    #[test]
    fn aa_responses_and_assets() {
        let explorer = explorer();
        let responses = explorer.aa_responses(&UnitHash::new("spend")).unwrap().unwrap();
        assert_eq!(responses.len(), 1);
        assert!(explorer.aa_responses(&UnitHash::new("src")).unwrap().is_none());
        assert!(explorer.is_asset(&UnitHash::new("tok")).unwrap());
        assert!(!explorer.is_asset(&UnitHash::new("spend")).unwrap());
    }
}
