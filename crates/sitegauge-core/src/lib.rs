pub mod analysis;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod report;
pub mod rules;
pub mod source;
pub mod util;
pub mod weather;

pub use analysis::model::{AnalysisResult, Location};
pub use analysis::normalize::{
    Clock, FixedClock, NormalizeContext, SystemClock, normalize, normalize_traced,
};

pub const TOOL_NAME: &str = "sitegauge";

/// Version of the site report JSON layout.
/// Bump only when the report layout changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Embedded in every cache key. Bumping it invalidates all cached analyses.
pub const CACHE_VERSION: &str = "v3";
