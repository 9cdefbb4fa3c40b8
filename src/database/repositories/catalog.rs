//! [`BaseEntityStore`] backed by the per-entity SeaORM repositories

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::{
    DomainSeaOrmRepository, LineSeaOrmRepository, ProviderSeaOrmRepository,
    StreamPathSeaOrmRepository, StreamSeaOrmRepository,
};
use crate::errors::RepositoryResult;
use crate::models::{Domain, Line, Provider, Stream, StreamPath};
use crate::repositories::BaseEntityStore;

#[derive(Clone)]
pub struct CatalogSeaOrmRepository {
    pub providers: ProviderSeaOrmRepository,
    pub lines: LineSeaOrmRepository,
    pub domains: DomainSeaOrmRepository,
    pub streams: StreamSeaOrmRepository,
    pub stream_paths: StreamPathSeaOrmRepository,
}

impl CatalogSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            providers: ProviderSeaOrmRepository::new(connection.clone()),
            lines: LineSeaOrmRepository::new(connection.clone()),
            domains: DomainSeaOrmRepository::new(connection.clone()),
            streams: StreamSeaOrmRepository::new(connection.clone()),
            stream_paths: StreamPathSeaOrmRepository::new(connection),
        }
    }
}

#[async_trait]
impl BaseEntityStore for CatalogSeaOrmRepository {
    async fn list_providers(&self) -> RepositoryResult<Vec<Provider>> {
        self.providers.find_all().await
    }

    async fn list_lines(&self) -> RepositoryResult<Vec<Line>> {
        self.lines.find_all().await
    }

    async fn list_domains(&self) -> RepositoryResult<Vec<Domain>> {
        self.domains.find_all().await
    }

    async fn list_streams(&self) -> RepositoryResult<Vec<Stream>> {
        self.streams.find_all().await
    }

    async fn list_stream_paths(&self) -> RepositoryResult<Vec<StreamPath>> {
        self.stream_paths.find_all().await
    }

    async fn get_provider(&self, id: i32) -> RepositoryResult<Option<Provider>> {
        self.providers.find_by_id(id).await
    }

    async fn get_line(&self, id: i32) -> RepositoryResult<Option<Line>> {
        self.lines.find_by_id(id).await
    }

    async fn get_domain(&self, id: i32) -> RepositoryResult<Option<Domain>> {
        self.domains.find_by_id(id).await
    }

    async fn get_stream(&self, id: i32) -> RepositoryResult<Option<Stream>> {
        self.streams.find_by_id(id).await
    }

    async fn get_stream_path(&self, id: i32) -> RepositoryResult<Option<StreamPath>> {
        self.stream_paths.find_by_id(id).await
    }
}
