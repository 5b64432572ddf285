//! DAG listings for the graph view.
//!
//! Pages are cut by rowid. Edges are keyed `"{child}_{parent}"` and cover
//! every parenthood touching a unit of the page, on either side.

use std::collections::{BTreeMap, HashMap, HashSet};

use dagview_store::{AaResponseStore, Ledger, ParenthoodStore, UnitStore};
use dagview_types::{Sequence, UnitHash, UnitProps};
use dagview_utils::spans::listing_span;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExplorerResult;
use crate::explorer::Explorer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub unit: UnitHash,
    /// Abbreviated unit id used as the node label.
    pub unit_s: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub data: NodeData,
    pub rowid: u64,
    pub is_on_main_chain: bool,
    pub is_stable: bool,
    pub sequence: Sequence,
}

impl GraphNode {
    fn from_props(props: &UnitProps) -> Self {
        Self {
            data: NodeData {
                unit: props.unit.clone(),
                unit_s: props.unit.short(),
            },
            rowid: props.rowid,
            is_on_main_chain: props.is_on_main_chain,
            is_stable: props.is_stable,
            sequence: props.sequence,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Child unit.
    pub source: UnitHash,
    /// Parent unit.
    pub target: UnitHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub data: EdgeData,
    /// Whether the parent is the child's best parent.
    pub best_parent_unit: bool,
}

/// A page of the DAG: nodes newest first, plus their edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: BTreeMap<String, GraphEdge>,
}

/// Stability flags of a unit, as reported to clients polling for changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableUnit {
    pub unit: UnitHash,
    pub is_on_main_chain: bool,
    pub is_stable: bool,
}

pub fn edge_key(child: &UnitHash, parent: &UnitHash) -> String {
    format!("{child}_{parent}")
}

impl<L: Ledger> Explorer<L> {
    /// The `limit` most recently stored units.
    pub fn last_units(&self, limit: usize) -> ExplorerResult<GraphView> {
        let _span = listing_span("last", limit).entered();
        let page = self.ledger().unit_store().last_units(limit)?;
        self.graph_view(page)
    }

    /// Up to `limit` units stored before `rowid`.
    pub fn units_before_rowid(&self, rowid: u64, limit: usize) -> ExplorerResult<GraphView> {
        let _span = listing_span("before", limit).entered();
        let page = self.ledger().unit_store().units_before_rowid(rowid, limit)?;
        self.graph_view(page)
    }

    /// Up to `limit` units stored after `rowid`.
    pub fn units_after_rowid(&self, rowid: u64, limit: usize) -> ExplorerResult<GraphView> {
        let _span = listing_span("after", limit).entered();
        let page = self.ledger().unit_store().units_after_rowid(rowid, limit)?;
        self.graph_view(page)
    }

    /// The stable subset of `units`. Unknown units are skipped.
    pub fn units_that_became_stable(&self, units: &[UnitHash]) -> ExplorerResult<Vec<StableUnit>> {
        let store = self.ledger().unit_store();
        let mut seen = HashSet::new();
        let mut stable = Vec::new();
        for unit in units {
            if !seen.insert(unit) {
                continue;
            }
            if let Some(props) = store.get_props(unit)? {
                if props.is_stable {
                    stable.push(StableUnit {
                        unit: props.unit,
                        is_on_main_chain: props.is_on_main_chain,
                        is_stable: true,
                    });
                }
            }
        }
        Ok(stable)
    }

    pub fn rowid_of(&self, unit: &UnitHash) -> ExplorerResult<Option<u64>> {
        Ok(self.ledger().unit_store().get_props(unit)?.map(|p| p.rowid))
    }

    /// The trigger of an autonomous-agent response unit.
    pub fn trigger_unit(&self, unit: &UnitHash) -> ExplorerResult<Option<UnitHash>> {
        Ok(self.ledger().aa_response_store().trigger_of(unit)?)
    }

    fn graph_view(&self, mut page: Vec<UnitProps>) -> ExplorerResult<GraphView> {
        let units = self.ledger().unit_store();
        let parenthoods = self.ledger().parenthood_store();

        page.sort_by(|a, b| b.rowid.cmp(&a.rowid));
        let best_parents: HashMap<&UnitHash, Option<&UnitHash>> = page
            .iter()
            .map(|p| (&p.unit, p.best_parent_unit.as_ref()))
            .collect();

        let mut edges = BTreeMap::new();
        for props in &page {
            for parent in parenthoods.parents_of(&props.unit)? {
                let best = props.best_parent_unit.as_ref() == Some(&parent);
                edges.insert(
                    edge_key(&props.unit, &parent),
                    GraphEdge {
                        data: EdgeData {
                            source: props.unit.clone(),
                            target: parent,
                        },
                        best_parent_unit: best,
                    },
                );
            }
            for child in parenthoods.children_of(&props.unit)? {
                let key = edge_key(&child, &props.unit);
                if edges.contains_key(&key) {
                    continue;
                }
                let best = match best_parents.get(&child) {
                    Some(best_parent) => *best_parent == Some(&props.unit),
                    None => units
                        .get_props(&child)?
                        .and_then(|p| p.best_parent_unit)
                        .as_ref()
                        == Some(&props.unit),
                };
                edges.insert(
                    key,
                    GraphEdge {
                        data: EdgeData {
                            source: child,
                            target: props.unit.clone(),
                        },
                        best_parent_unit: best,
                    },
                );
            }
        }

        let nodes: Vec<GraphNode> = page.iter().map(GraphNode::from_props).collect();
        debug!(nodes = nodes.len(), edges = edges.len(), "built graph page");
        Ok(GraphView { nodes, edges })
    }
}
