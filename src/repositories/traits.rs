//! Repository trait definitions

use async_trait::async_trait;

use crate::config::RegenerationStrategy;
use crate::errors::RepositoryResult;
use crate::models::{
    Domain, Endpoint, EndpointFilter, EndpointKey, EndpointStatus, GenerationReport, Line,
    NewEndpoint, Provider, Resolution, Stream, StreamPath,
};

/// Read access to the base catalog entities
///
/// Listing methods return rows ordered by id so that a regeneration pass over
/// identical data is deterministic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BaseEntityStore: Send + Sync {
    async fn list_providers(&self) -> RepositoryResult<Vec<Provider>>;
    async fn list_lines(&self) -> RepositoryResult<Vec<Line>>;
    async fn list_domains(&self) -> RepositoryResult<Vec<Domain>>;
    async fn list_streams(&self) -> RepositoryResult<Vec<Stream>>;
    async fn list_stream_paths(&self) -> RepositoryResult<Vec<StreamPath>>;

    async fn get_provider(&self, id: i32) -> RepositoryResult<Option<Provider>>;
    async fn get_line(&self, id: i32) -> RepositoryResult<Option<Line>>;
    async fn get_domain(&self, id: i32) -> RepositoryResult<Option<Domain>>;
    async fn get_stream(&self, id: i32) -> RepositoryResult<Option<Stream>>;
    async fn get_stream_path(&self, id: i32) -> RepositoryResult<Option<StreamPath>>;
}

/// Persistence of the derived endpoint set
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// List endpoints matching every populated field of `filter`, ordered by id
    async fn list(&self, filter: EndpointFilter) -> RepositoryResult<Vec<Endpoint>>;

    async fn get(&self, id: i32) -> RepositoryResult<Option<Endpoint>>;

    /// Find the endpoint holding a (line, domain, stream path) combination
    async fn find_by_key(&self, key: EndpointKey) -> RepositoryResult<Option<Endpoint>>;

    /// Insert a single endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Endpoint)` - Stored endpoint with its assigned id
    /// * `Err(RepositoryError::ConstraintViolation)` - Combination already taken
    ///   or a referenced row is missing
    async fn insert(&self, endpoint: NewEndpoint) -> RepositoryResult<Endpoint>;

    /// Overwrite every column of endpoint `id` except `created_at`
    async fn update(&self, id: i32, endpoint: NewEndpoint) -> RepositoryResult<Endpoint>;

    /// Delete endpoint `id`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A row was removed
    /// * `Ok(false)` - No endpoint has this id
    async fn delete(&self, id: i32) -> RepositoryResult<bool>;

    async fn set_status(&self, id: i32, status: EndpointStatus) -> RepositoryResult<Endpoint>;

    async fn set_resolution(&self, id: i32, resolution: Resolution)
    -> RepositoryResult<Endpoint>;

    /// Replace the stored set with `desired` inside one transaction
    ///
    /// Row-level insert and update failures are rolled back to a savepoint and
    /// reported in [`GenerationReport::failures`]; any other error aborts the
    /// transaction and nothing changes.
    async fn apply_generation(
        &self,
        desired: Vec<NewEndpoint>,
        strategy: RegenerationStrategy,
    ) -> RepositoryResult<GenerationReport>;
}
