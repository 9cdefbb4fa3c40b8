//! SeaORM-based endpoint repository
//!
//! Besides plain CRUD this owns the transactional application of a
//! regeneration pass (see [`EndpointStore::apply_generation`]).

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RegenerationStrategy;
use crate::entities::{endpoints, prelude::*, stream_paths};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{
    Endpoint, EndpointFilter, EndpointKey, EndpointStatus, GenerationFailure, GenerationReport,
    NewEndpoint, ReconcilePlan, Resolution,
};
use crate::repositories::EndpointStore;

/// Upper bound on ids per `IN (...)` clause, below SQLite's variable limit
const DELETE_BATCH_SIZE: usize = 500;

#[derive(Clone)]
pub struct EndpointSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl EndpointSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    async fn require(&self, id: i32) -> RepositoryResult<endpoints::Model> {
        Endpoints::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| RepositoryError::not_found("endpoint", id))
    }

    /// Insert one row under a savepoint, recording a failure instead of propagating it
    async fn insert_row(
        txn: &DatabaseTransaction,
        endpoint: NewEndpoint,
        report: &mut GenerationReport,
    ) -> RepositoryResult<()> {
        let savepoint = txn.begin().await?;
        match new_active_model(&endpoint).insert(&savepoint).await {
            Ok(_) => {
                savepoint.commit().await?;
                report.inserted += 1;
            }
            Err(err) => {
                savepoint.rollback().await?;
                record_failure(report, &endpoint, "insert", err);
            }
        }
        Ok(())
    }

    /// Refresh the derived columns of one row under a savepoint; status is kept
    async fn update_row(
        txn: &DatabaseTransaction,
        id: i32,
        endpoint: NewEndpoint,
        report: &mut GenerationReport,
    ) -> RepositoryResult<()> {
        let savepoint = txn.begin().await?;
        let active = endpoints::ActiveModel {
            id: Set(id),
            provider_id: Set(endpoint.provider_id),
            stream_id: Set(endpoint.stream_id),
            full_url: Set(endpoint.full_url.clone()),
            resolution: Set(endpoint.resolution),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        match active.update(&savepoint).await {
            Ok(_) => {
                savepoint.commit().await?;
                report.updated += 1;
            }
            Err(err) => {
                savepoint.rollback().await?;
                record_failure(report, &endpoint, "update", err);
            }
        }
        Ok(())
    }
}

fn new_active_model(endpoint: &NewEndpoint) -> endpoints::ActiveModel {
    let now = Utc::now();
    endpoints::ActiveModel {
        provider_id: Set(endpoint.provider_id),
        line_id: Set(endpoint.line_id),
        domain_id: Set(endpoint.domain_id),
        stream_id: Set(endpoint.stream_id),
        stream_path_id: Set(endpoint.stream_path_id),
        full_url: Set(endpoint.full_url.clone()),
        status: Set(endpoint.status),
        resolution: Set(endpoint.resolution),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

fn record_failure(report: &mut GenerationReport, endpoint: &NewEndpoint, action: &str, err: DbErr) {
    let reason = RepositoryError::from(err).to_string();
    warn!(
        line_id = endpoint.line_id,
        domain_id = endpoint.domain_id,
        stream_path_id = endpoint.stream_path_id,
        "Endpoint {} failed: {}",
        action,
        reason
    );
    report.failures.push(GenerationFailure {
        line_id: Some(endpoint.line_id),
        domain_id: Some(endpoint.domain_id),
        stream_path_id: endpoint.stream_path_id,
        reason: format!("{action} failed: {reason}"),
    });
}

#[async_trait]
impl EndpointStore for EndpointSeaOrmRepository {
    async fn list(&self, filter: EndpointFilter) -> RepositoryResult<Vec<Endpoint>> {
        let mut query = Endpoints::find();
        if let Some(line_id) = filter.line_id {
            query = query.filter(endpoints::Column::LineId.eq(line_id));
        }
        if let Some(domain_id) = filter.domain_id {
            query = query.filter(endpoints::Column::DomainId.eq(domain_id));
        }
        if let Some(stream_id) = filter.stream_id {
            query = query.filter(endpoints::Column::StreamId.eq(stream_id));
        }
        if let Some(provider_id) = filter.provider_id {
            query = query.filter(endpoints::Column::ProviderId.eq(provider_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(endpoints::Column::Status.eq(status));
        }
        if let Some(resolution) = filter.resolution {
            query = query.filter(endpoints::Column::Resolution.eq(resolution));
        }
        if let Some(table_id) = filter.table_id {
            query = query
                .inner_join(StreamPaths)
                .filter(stream_paths::Column::TableId.eq(table_id));
        }

        let models = query
            .order_by_asc(endpoints::Column::Id)
            .all(&*self.connection)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i32) -> RepositoryResult<Option<Endpoint>> {
        let model = Endpoints::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_key(&self, key: EndpointKey) -> RepositoryResult<Option<Endpoint>> {
        let model = Endpoints::find()
            .filter(endpoints::Column::LineId.eq(key.line_id))
            .filter(endpoints::Column::DomainId.eq(key.domain_id))
            .filter(endpoints::Column::StreamPathId.eq(key.stream_path_id))
            .one(&*self.connection)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn insert(&self, endpoint: NewEndpoint) -> RepositoryResult<Endpoint> {
        let model = new_active_model(&endpoint)
            .insert(&*self.connection)
            .await?;
        Ok(model.into())
    }

    async fn update(&self, id: i32, endpoint: NewEndpoint) -> RepositoryResult<Endpoint> {
        let existing = self.require(id).await?;

        let mut active: endpoints::ActiveModel = existing.into();
        active.provider_id = Set(endpoint.provider_id);
        active.line_id = Set(endpoint.line_id);
        active.domain_id = Set(endpoint.domain_id);
        active.stream_id = Set(endpoint.stream_id);
        active.stream_path_id = Set(endpoint.stream_path_id);
        active.full_url = Set(endpoint.full_url);
        active.status = Set(endpoint.status);
        active.resolution = Set(endpoint.resolution);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> RepositoryResult<bool> {
        let result = Endpoints::delete_by_id(id).exec(&*self.connection).await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_status(&self, id: i32, status: EndpointStatus) -> RepositoryResult<Endpoint> {
        let mut active: endpoints::ActiveModel = self.require(id).await?.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    async fn set_resolution(
        &self,
        id: i32,
        resolution: Resolution,
    ) -> RepositoryResult<Endpoint> {
        let mut active: endpoints::ActiveModel = self.require(id).await?.into();
        active.resolution = Set(resolution);
        active.updated_at = Set(Utc::now());
        let model = active.update(&*self.connection).await?;
        Ok(model.into())
    }

    async fn apply_generation(
        &self,
        desired: Vec<NewEndpoint>,
        strategy: RegenerationStrategy,
    ) -> RepositoryResult<GenerationReport> {
        let txn = self.connection.begin().await?;
        let mut report = GenerationReport::default();

        match strategy {
            RegenerationStrategy::Rebuild => {
                let removed = Endpoints::delete_many().exec(&txn).await?.rows_affected;
                report.removed = removed as usize;
                for endpoint in desired {
                    Self::insert_row(&txn, endpoint, &mut report).await?;
                }
            }
            RegenerationStrategy::Reconcile => {
                let existing: Vec<Endpoint> = Endpoints::find()
                    .order_by_asc(endpoints::Column::Id)
                    .all(&txn)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                let plan = ReconcilePlan::diff(&existing, desired);
                debug!(
                    existing = existing.len(),
                    insert = plan.insert.len(),
                    update = plan.update.len(),
                    delete = plan.delete.len(),
                    unchanged = plan.unchanged,
                    "Reconciling endpoints"
                );

                for batch in plan.delete.chunks(DELETE_BATCH_SIZE) {
                    let removed = Endpoints::delete_many()
                        .filter(endpoints::Column::Id.is_in(batch.iter().copied()))
                        .exec(&txn)
                        .await?
                        .rows_affected;
                    report.removed += removed as usize;
                }
                report.unchanged = plan.unchanged;
                for (id, endpoint) in plan.update {
                    Self::update_row(&txn, id, endpoint, &mut report).await?;
                }
                for endpoint in plan.insert {
                    Self::insert_row(&txn, endpoint, &mut report).await?;
                }
            }
        }

        txn.commit().await?;
        report.generated = report.inserted + report.updated + report.unchanged;
        Ok(report)
    }
}
