//! Asset storage trait.

use crate::StoreError;
use dagview_types::{AssetRecord, UnitHash};

pub trait AssetStore {
    /// The asset defined by `asset`, `None` if that unit defines no asset.
    fn get_asset(&self, asset: &UnitHash) -> Result<Option<AssetRecord>, StoreError>;
}
