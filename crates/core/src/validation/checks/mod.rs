//! Built-in quality checks.
//!
//! - `completeness` - Enough rows inside the trailing window
//! - `freshness` - Newest row is recent enough
//! - `quality` - Null-close ratio (advisory)
//! - `asset_coverage` - Enough active assets

mod asset_coverage;
mod completeness;
mod freshness;
mod quality;

pub use asset_coverage::AssetCoverageCheck;
pub use completeness::CompletenessCheck;
pub use freshness::FreshnessCheck;
pub use quality::NullCloseCheck;
