//! Signed unit content as stored by the ledger engine.
//!
//! Payloads and authentifiers are application-defined JSON, so they are kept
//! as [`serde_json::Value`]. These structures are persisted as JSON only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;
use crate::unit::UnitHash;

/// A unit wrapped for transport, the shape the ledger engine reads back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub unit: UnitContent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitContent {
    pub unit: UnitHash,
    pub version: String,
    pub alt: String,
    pub authors: Vec<Author>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub parent_units: Vec<UnitHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ball: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ball_unit: Option<UnitHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_list_unit: Option<UnitHash>,
    /// Embedded witness list (older protocol versions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<Vec<Address>>,
    #[serde(default)]
    pub headers_commission: u64,
    #[serde(default)]
    pub payload_commission: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub address: Address,
    #[serde(default)]
    pub authentifiers: Value,
    /// Definition revealed in this unit, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub app: String,
    pub payload_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Message {
    /// Asset id of a payment message, `None` for base-currency payments and
    /// for every other app.
    pub fn payment_asset(&self) -> Option<UnitHash> {
        if self.app != "payment" {
            return None;
        }
        self.payload
            .as_ref()?
            .get("asset")?
            .as_str()
            .map(UnitHash::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_asset_extraction() {
        let msg = Message {
            app: "payment".into(),
            payload_location: "inline".into(),
            payload_hash: None,
            payload: Some(json!({ "asset": "asset-unit", "outputs": [] })),
        };
        assert_eq!(msg.payment_asset(), Some(UnitHash::new("asset-unit")));

        let base = Message {
            payload: Some(json!({ "outputs": [] })),
            ..msg.clone()
        };
        assert_eq!(base.payment_asset(), None);

        let data = Message {
            app: "data".into(),
            ..msg
        };
        assert_eq!(data.payment_asset(), None);
    }

    #[test]
    fn minimal_content_deserializes() {
        let content: UnitContent = serde_json::from_value(json!({
            "unit": "u1",
            "version": "1.0",
            "alt": "1",
            "authors": [{ "address": "BVVJ2K7ENPZZ3VYZFWQWK7ISPCATFIW3" }]
        }))
        .unwrap();
        assert!(content.messages.is_empty());
        assert!(content.witnesses.is_none());
        assert_eq!(content.authors.len(), 1);
    }
}
