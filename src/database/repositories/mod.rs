//! SeaORM repository implementations
//!
//! Each base entity gets its own repository; [`CatalogSeaOrmRepository`]
//! bundles them behind the [`crate::repositories::BaseEntityStore`] trait and
//! [`EndpointSeaOrmRepository`] implements [`crate::repositories::EndpointStore`].

pub mod catalog;
pub mod domain;
pub mod endpoint;
pub mod line;
pub mod provider;
pub mod stats;
pub mod stream;
pub mod stream_path;

pub use catalog::CatalogSeaOrmRepository;
pub use domain::DomainSeaOrmRepository;
pub use endpoint::EndpointSeaOrmRepository;
pub use line::LineSeaOrmRepository;
pub use provider::ProviderSeaOrmRepository;
pub use stats::StatsSeaOrmRepository;
pub use stream::StreamSeaOrmRepository;
pub use stream_path::StreamPathSeaOrmRepository;
