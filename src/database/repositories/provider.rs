//! SeaORM-based provider repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{endpoints, lines, prelude::*, providers, streams};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Provider, ProviderRequest};

#[derive(Clone)]
pub struct ProviderSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ProviderSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: ProviderRequest) -> RepositoryResult<Provider> {
        let now = Utc::now();
        let model = providers::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.connection)
        .await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Provider>> {
        let model = Providers::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<Provider>> {
        let models = Providers::find()
            .order_by_asc(providers::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn update(&self, id: i32, request: ProviderRequest) -> RepositoryResult<Provider> {
        let existing = Providers::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("provider", id))?;

        let mut active: providers::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.code = Set(request.code);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    /// Number of streams scoped to this provider
    pub async fn count_scoped_streams(&self, id: i32) -> RepositoryResult<u64> {
        let count = Streams::find()
            .filter(streams::Column::ProviderId.eq(id))
            .count(&*self.connection)
            .await?;
        Ok(count)
    }

    /// Delete a provider together with its lines and every endpoint that references either
    pub async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let txn = self.connection.begin().await?;

        let endpoints_removed = Endpoints::delete_many()
            .filter(endpoints::Column::ProviderId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let lines_removed = Lines::delete_many()
            .filter(lines::Column::ProviderId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = Providers::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::not_found("provider", id));
        }

        txn.commit().await?;
        debug!(
            provider_id = id,
            lines_removed, endpoints_removed, "Deleted provider"
        );
        Ok(())
    }
}
