//! SeaORM-based domain repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{domains, endpoints, prelude::*};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Domain, DomainRequest};

#[derive(Clone)]
pub struct DomainSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl DomainSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: DomainRequest) -> RepositoryResult<Domain> {
        let now = Utc::now();
        let model = domains::ActiveModel {
            name: Set(request.name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.connection)
        .await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Domain>> {
        let model = Domains::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<Domain>> {
        let models = Domains::find()
            .order_by_asc(domains::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn update(&self, id: i32, request: DomainRequest) -> RepositoryResult<Domain> {
        let existing = Domains::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("domain", id))?;

        let mut active: domains::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    pub async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let txn = self.connection.begin().await?;

        let endpoints_removed = Endpoints::delete_many()
            .filter(endpoints::Column::DomainId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = Domains::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::not_found("domain", id));
        }

        txn.commit().await?;
        debug!(domain_id = id, endpoints_removed, "Deleted domain");
        Ok(())
    }
}
