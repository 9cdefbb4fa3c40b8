//! SeaORM-based stream repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{endpoints, prelude::*, stream_paths, streams};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Stream, StreamRequest};

#[derive(Clone)]
pub struct StreamSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StreamSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: StreamRequest) -> RepositoryResult<Stream> {
        let now = Utc::now();
        let model = streams::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            provider_id: Set(request.provider_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.connection)
        .await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Stream>> {
        let model = Streams::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<Stream>> {
        let models = Streams::find()
            .order_by_asc(streams::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn update(&self, id: i32, request: StreamRequest) -> RepositoryResult<Stream> {
        let existing = Streams::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("stream", id))?;

        let mut active: streams::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.code = Set(request.code);
        active.provider_id = Set(request.provider_id);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    /// Delete a stream, its paths and their endpoints
    pub async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let txn = self.connection.begin().await?;

        let endpoints_removed = Endpoints::delete_many()
            .filter(endpoints::Column::StreamId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let paths_removed = StreamPaths::delete_many()
            .filter(stream_paths::Column::StreamId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = Streams::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::not_found("stream", id));
        }

        txn.commit().await?;
        debug!(
            stream_id = id,
            paths_removed, endpoints_removed, "Deleted stream"
        );
        Ok(())
    }
}
