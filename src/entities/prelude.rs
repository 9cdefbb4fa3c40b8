pub use super::domains::Entity as Domains;
pub use super::endpoints::Entity as Endpoints;
pub use super::lines::Entity as Lines;
pub use super::providers::Entity as Providers;
pub use super::stream_paths::Entity as StreamPaths;
pub use super::streams::Entity as Streams;
