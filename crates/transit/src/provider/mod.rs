//! Query snapshots and the reloadable service that serves them.

pub mod service;
pub mod static_provider;

pub use service::TransitService;
pub use static_provider::StaticTransitProvider;
