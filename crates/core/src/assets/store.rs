use async_trait::async_trait;

use super::model::Asset;
use crate::errors::Result;

/// Source of truth for which symbols are actively tracked.
#[async_trait]
pub trait AssetDirectory: Send + Sync {
    /// Active assets in listing order.
    async fn list_active(&self) -> Result<Vec<Asset>>;
}
