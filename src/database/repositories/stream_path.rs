//! SeaORM-based stream path repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{endpoints, prelude::*, stream_paths};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{StreamPath, StreamPathRequest};

#[derive(Clone)]
pub struct StreamPathSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StreamPathSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: StreamPathRequest) -> RepositoryResult<StreamPath> {
        let now = Utc::now();
        let model = stream_paths::ActiveModel {
            stream_id: Set(request.stream_id),
            table_id: Set(request.table_id),
            full_path: Set(request.full_path),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.connection)
        .await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<StreamPath>> {
        let model = StreamPaths::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<StreamPath>> {
        let models = StreamPaths::find()
            .order_by_asc(stream_paths::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_table_id(&self, table_id: &str) -> RepositoryResult<Option<StreamPath>> {
        let model = StreamPaths::find()
            .filter(stream_paths::Column::TableId.eq(table_id))
            .one(&*self.connection)
            .await?;
        Ok(model.map(Into::into))
    }

    pub async fn update(
        &self,
        id: i32,
        request: StreamPathRequest,
    ) -> RepositoryResult<StreamPath> {
        let existing = StreamPaths::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("stream_path", id))?;

        let mut active: stream_paths::ActiveModel = existing.into();
        active.stream_id = Set(request.stream_id);
        active.table_id = Set(request.table_id);
        active.full_path = Set(request.full_path);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    pub async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let txn = self.connection.begin().await?;

        let endpoints_removed = Endpoints::delete_many()
            .filter(endpoints::Column::StreamPathId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = StreamPaths::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::not_found("stream_path", id));
        }

        txn.commit().await?;
        debug!(stream_path_id = id, endpoints_removed, "Deleted stream path");
        Ok(())
    }
}
