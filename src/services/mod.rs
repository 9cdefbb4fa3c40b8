//! Business logic
//!
//! Pure derivation rules (matching, URL rendering, resolution tiers) sit next
//! to the services that orchestrate them against the repositories.

pub mod catalog_service;
pub mod endpoint_generation;
pub mod endpoint_service;
pub mod matching;
pub mod resolution;
pub mod stream_prober;
pub mod url_builder;

pub use catalog_service::CatalogService;
pub use endpoint_generation::{CatalogSnapshot, DesiredSet, RegenerationController, plan_endpoints};
pub use endpoint_service::EndpointService;
pub use stream_prober::{HttpFlvPuller, ProbeOutcome, StreamProber};
