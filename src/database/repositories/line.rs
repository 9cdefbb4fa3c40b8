//! SeaORM-based line repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{endpoints, lines, prelude::*};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Line, LineRequest};

#[derive(Clone)]
pub struct LineSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl LineSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: LineRequest) -> RepositoryResult<Line> {
        let now = Utc::now();
        let model = lines::ActiveModel {
            provider_id: Set(request.provider_id),
            name: Set(request.name),
            code: Set(request.code),
            display_name: Set(request.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.connection)
        .await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Line>> {
        let model = Lines::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<Line>> {
        let models = Lines::find()
            .order_by_asc(lines::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_provider(&self, provider_id: i32) -> RepositoryResult<Vec<Line>> {
        let models = Lines::find()
            .filter(lines::Column::ProviderId.eq(provider_id))
            .order_by_asc(lines::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn update(&self, id: i32, request: LineRequest) -> RepositoryResult<Line> {
        let existing = Lines::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("line", id))?;

        let mut active: lines::ActiveModel = existing.into();
        active.provider_id = Set(request.provider_id);
        active.name = Set(request.name);
        active.code = Set(request.code);
        active.display_name = Set(request.display_name);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    pub async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let txn = self.connection.begin().await?;

        let endpoints_removed = Endpoints::delete_many()
            .filter(endpoints::Column::LineId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = Lines::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::not_found("line", id));
        }

        txn.commit().await?;
        debug!(line_id = id, endpoints_removed, "Deleted line");
        Ok(())
    }
}
