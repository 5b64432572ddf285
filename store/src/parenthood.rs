//! Parenthood (DAG edge) storage trait.

use crate::StoreError;
use dagview_types::UnitHash;

/// Directed `child -> parent` edges. A unit may have several parents.
pub trait ParenthoodStore {
    /// Parents of `child`, sorted by unit id.
    fn parents_of(&self, child: &UnitHash) -> Result<Vec<UnitHash>, StoreError>;

    /// Children of `parent`, sorted by unit id.
    fn children_of(&self, parent: &UnitHash) -> Result<Vec<UnitHash>, StoreError>;
}
