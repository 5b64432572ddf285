//! Declarative unit fixtures for building test DAGs.
//!
//! ```ignore
//! let unit = UnitFixture::new("u5", 5)
//!     .on_main_chain(5)
//!     .best_parent("u4")
//!     .last_ball("u1")
//!     .timestamp(1050)
//!     .authored_by(&witnesses[..3])
//!     .build();
//! ```

use dagview_store::{StoredUnit, UnitAuthor};
use dagview_types::{
    Address, Author, Input, Output, Sequence, UnitContent, UnitHash, UnitProps,
};
use serde_json::json;

/// `n` distinct witness-style addresses (`WITNESSAAAA...`, `WITNESSAAAB...`, ...).
pub fn witness_addresses(n: usize) -> Vec<Address> {
    (0..n).map(|i| Address::new(fixture_address("WITNESS", i))).collect()
}

/// A deterministic 32-character address with the given prefix.
pub fn fixture_address(prefix: &str, i: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
    let mut suffix = Vec::new();
    let mut n = i;
    for _ in 0..4 {
        suffix.push(ALPHABET[n % 32]);
        n /= 32;
    }
    suffix.reverse();
    let suffix = String::from_utf8_lossy(&suffix).into_owned();
    let padding = Address::LENGTH.saturating_sub(prefix.len() + suffix.len());
    format!("{prefix}{}{suffix}", "A".repeat(padding))
}

/// Builder for a [`StoredUnit`] with sane defaults: protocol version 1.0,
/// good sequence, off the main chain, unstable, no timestamp.
pub struct UnitFixture {
    stored: StoredUnit,
}

impl UnitFixture {
    pub fn new(unit: &str, rowid: u64) -> Self {
        let unit = UnitHash::new(unit);
        let props = UnitProps {
            unit: unit.clone(),
            rowid,
            version: "1.0".into(),
            main_chain_index: None,
            latest_included_mc_index: None,
            level: rowid,
            witnessed_level: rowid.saturating_sub(1),
            is_on_main_chain: false,
            is_stable: false,
            sequence: Sequence::Good,
            best_parent_unit: None,
            last_ball_unit: None,
            witness_list_unit: None,
            timestamp: 0,
            creation_date: 0,
            headers_commission: 344,
            payload_commission: 197,
            tps_fee: None,
            actual_tps_fee: None,
            burn_fee: None,
            oversize_fee: None,
        };
        let content = UnitContent {
            unit,
            version: "1.0".into(),
            alt: "1".into(),
            authors: Vec::new(),
            messages: Vec::new(),
            parent_units: Vec::new(),
            last_ball: None,
            last_ball_unit: None,
            witness_list_unit: None,
            witnesses: None,
            headers_commission: 344,
            payload_commission: 197,
            timestamp: None,
        };
        Self {
            stored: StoredUnit {
                props,
                content,
                parents: Vec::new(),
                authors: Vec::new(),
                witnesses: Vec::new(),
                outputs: Vec::new(),
                inputs: Vec::new(),
            },
        }
    }

    /// Place the unit on the main chain at `mci`.
    pub fn on_main_chain(mut self, mci: u64) -> Self {
        self.stored.props.is_on_main_chain = true;
        self.stored.props.main_chain_index = Some(mci);
        self.stored.props.latest_included_mc_index = mci.checked_sub(1);
        self
    }

    /// Give an off-chain unit a main-chain index (the index of the main-chain
    /// unit that first included it).
    pub fn included_at(mut self, mci: u64) -> Self {
        self.stored.props.main_chain_index = Some(mci);
        self
    }

    pub fn stable(mut self) -> Self {
        self.stored.props.is_stable = true;
        self
    }

    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.stored.props.sequence = sequence;
        self
    }

    pub fn best_parent(mut self, parent: &str) -> Self {
        self.stored.props.best_parent_unit = Some(UnitHash::new(parent));
        self.parent(parent)
    }

    pub fn parent(mut self, parent: &str) -> Self {
        let parent = UnitHash::new(parent);
        if !self.stored.parents.contains(&parent) {
            self.stored.parents.push(parent.clone());
            self.stored.content.parent_units.push(parent);
        }
        self
    }

    pub fn last_ball(mut self, unit: &str) -> Self {
        let unit = UnitHash::new(unit);
        self.stored.props.last_ball_unit = Some(unit.clone());
        self.stored.content.last_ball_unit = Some(unit);
        self
    }

    /// Explicit timestamp (protocol versions that carry one).
    pub fn timestamp(mut self, secs: u64) -> Self {
        self.stored.props.timestamp = secs;
        self.stored.content.timestamp = Some(secs);
        self
    }

    pub fn created_at(mut self, secs: u64) -> Self {
        self.stored.props.creation_date = secs;
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.stored.props.version = version.into();
        self.stored.content.version = version.into();
        self
    }

    pub fn authored_by(mut self, addresses: &[Address]) -> Self {
        for address in addresses {
            self.stored.authors.push(UnitAuthor {
                address: address.clone(),
                definition_chash: None,
            });
            self.stored.content.authors.push(Author {
                address: address.clone(),
                authentifiers: json!({ "r": "sig" }),
                definition: None,
            });
        }
        self
    }

    /// Author that revealed its definition in this unit.
    pub fn authored_with_definition(mut self, address: &Address, definition_chash: &str) -> Self {
        self.stored.authors.push(UnitAuthor {
            address: address.clone(),
            definition_chash: Some(definition_chash.into()),
        });
        self.stored.content.authors.push(Author {
            address: address.clone(),
            authentifiers: json!({ "r": "sig" }),
            definition: None,
        });
        self
    }

    /// Witness list carried by this unit (stored and embedded).
    pub fn witnesses(mut self, witnesses: &[Address]) -> Self {
        self.stored.witnesses = witnesses.to_vec();
        self.stored.content.witnesses = Some(witnesses.to_vec());
        self
    }

    /// Witness list recorded in the store only, not embedded in content.
    pub fn stored_witnesses(mut self, witnesses: &[Address]) -> Self {
        self.stored.witnesses = witnesses.to_vec();
        self
    }

    pub fn witness_list_unit(mut self, unit: &str) -> Self {
        let unit = UnitHash::new(unit);
        self.stored.props.witness_list_unit = Some(unit.clone());
        self.stored.content.witness_list_unit = Some(unit);
        self
    }

    pub fn message(mut self, message: dagview_types::Message) -> Self {
        self.stored.content.messages.push(message);
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.stored.outputs.push(output);
        self
    }

    pub fn input(mut self, input: Input) -> Self {
        self.stored.inputs.push(input);
        self
    }

    pub fn fees(mut self, tps_fee: u64, burn_fee: u64) -> Self {
        self.stored.props.tps_fee = Some(tps_fee);
        self.stored.props.actual_tps_fee = Some(tps_fee);
        self.stored.props.burn_fee = Some(burn_fee);
        self.stored.props.oversize_fee = Some(0);
        self
    }

    pub fn build(self) -> StoredUnit {
        self.stored
    }
}
