//! Transit data models, types, and traits.

pub mod dataset;
pub mod records;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use dataset::Dataset;
pub use records::{Route, Stop};
pub use traits::TransitQueries;
pub use types::{LanguageChain, LocalizedName, Result, TransitError, FALLBACK_LANGUAGE};
