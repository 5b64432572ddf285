//! Asset name and decimals decoration of payment messages.

use dagview_store::{AssetStore, Ledger};
use dagview_types::{AssetRecord, Message, UnitHash};
use serde_json::Value;

use crate::error::ExplorerResult;

/// Looks up the registered name and decimals of an asset.
pub trait AssetNameResolver {
    fn asset_name(&self, asset: &UnitHash) -> ExplorerResult<Option<AssetRecord>>;
}

/// Asset names from the ledger's asset registry.
pub struct LedgerAssetNames<'a, L> {
    ledger: &'a L,
}

impl<'a, L: Ledger> LedgerAssetNames<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }
}

impl<L: Ledger> AssetNameResolver for LedgerAssetNames<'_, L> {
    fn asset_name(&self, asset: &UnitHash) -> ExplorerResult<Option<AssetRecord>> {
        Ok(self.ledger.asset_store().get_asset(asset)?)
    }
}

/// Add `assetName` and `assetDecimals` to the payload of every payment
/// message in a registered asset. Other messages pass through untouched.
pub fn decorate_payment_messages<R: AssetNameResolver>(
    messages: &mut [Message],
    names: &R,
) -> ExplorerResult<()> {
    for message in messages.iter_mut() {
        let Some(asset) = message.payment_asset() else {
            continue;
        };
        let Some(record) = names.asset_name(&asset)? else {
            continue;
        };
        if let Some(Value::Object(payload)) = message.payload.as_mut() {
            payload.insert("assetName".into(), record.name.map_or(Value::Null, Value::from));
            payload.insert(
                "assetDecimals".into(),
                record.decimals.map_or(Value::Null, Value::from),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct FixedNames(HashMap<UnitHash, AssetRecord>);

    impl AssetNameResolver for FixedNames {
        fn asset_name(&self, asset: &UnitHash) -> ExplorerResult<Option<AssetRecord>> {
            Ok(self.0.get(asset).cloned())
        }
    }

    fn payment(asset: Option<&str>) -> Message {
        let mut payload = json!({ "outputs": [{ "address": "X", "amount": 5 }] });
        if let Some(asset) = asset {
            payload["asset"] = json!(asset);
        }
        Message {
            app: "payment".into(),
            payload_location: "inline".into(),
            payload_hash: None,
            payload: Some(payload),
        }
    }

    #[test]
    fn known_assets_are_decorated() {
        let usd = UnitHash::new("usd");
        let names = FixedNames(HashMap::from([(
            usd.clone(),
            AssetRecord {
                asset: usd,
                name: Some("USDC".into()),
                decimals: Some(4),
            },
        )]));
        let mut messages = vec![payment(Some("usd")), payment(Some("other")), payment(None)];
        decorate_payment_messages(&mut messages, &names).unwrap();

        let decorated = messages[0].payload.as_ref().unwrap();
        assert_eq!(decorated["assetName"], json!("USDC"));
        assert_eq!(decorated["assetDecimals"], json!(4));
        assert!(messages[1].payload.as_ref().unwrap().get("assetName").is_none());
        assert!(messages[2].payload.as_ref().unwrap().get("assetName").is_none());
    }
}
