//! Aggregate queries behind the catalog statistics endpoint

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect, sea_query::Expr,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{endpoints, lines, prelude::*};
use crate::errors::RepositoryResult;
use crate::models::{CatalogStats, EndpointStatus, GroupCount};

#[derive(Debug, FromQueryResult)]
struct GroupRow {
    id: i32,
    count: i64,
}

#[derive(Clone)]
pub struct StatsSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StatsSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn collect(&self) -> RepositoryResult<CatalogStats> {
        let db = &*self.connection;

        let providers = Providers::find().all(db).await?;
        let domains = Domains::find().all(db).await?;
        let streams = Streams::find().all(db).await?;

        let provider_names: HashMap<i32, String> =
            providers.iter().map(|p| (p.id, p.name.clone())).collect();
        let domain_names: HashMap<i32, String> =
            domains.iter().map(|d| (d.id, d.name.clone())).collect();
        let stream_names: HashMap<i32, String> =
            streams.iter().map(|s| (s.id, s.name.clone())).collect();

        let lines_by_provider = Lines::find()
            .select_only()
            .column_as(lines::Column::ProviderId, "id")
            .column_as(Expr::col(lines::Column::Id).count(), "count")
            .group_by(lines::Column::ProviderId)
            .into_model::<GroupRow>()
            .all(db)
            .await?;
        let endpoints_by_stream = Endpoints::find()
            .select_only()
            .column_as(endpoints::Column::StreamId, "id")
            .column_as(Expr::col(endpoints::Column::Id).count(), "count")
            .group_by(endpoints::Column::StreamId)
            .into_model::<GroupRow>()
            .all(db)
            .await?;
        let endpoints_by_domain = Endpoints::find()
            .select_only()
            .column_as(endpoints::Column::DomainId, "id")
            .column_as(Expr::col(endpoints::Column::Id).count(), "count")
            .group_by(endpoints::Column::DomainId)
            .into_model::<GroupRow>()
            .all(db)
            .await?;

        let endpoints_enabled = Endpoints::find()
            .filter(endpoints::Column::Status.eq(EndpointStatus::Enabled))
            .count(db)
            .await?;
        let endpoints_disabled = Endpoints::find()
            .filter(endpoints::Column::Status.eq(EndpointStatus::Disabled))
            .count(db)
            .await?;

        Ok(CatalogStats {
            providers: providers.len() as u64,
            lines: Lines::find().count(db).await?,
            domains: domains.len() as u64,
            streams: streams.len() as u64,
            stream_paths: StreamPaths::find().count(db).await?,
            endpoints: endpoints_enabled + endpoints_disabled,
            endpoints_enabled,
            endpoints_disabled,
            lines_by_provider: named(lines_by_provider, &provider_names),
            endpoints_by_stream: named(endpoints_by_stream, &stream_names),
            endpoints_by_domain: named(endpoints_by_domain, &domain_names),
        })
    }
}

/// Attach parent names and order by descending count, then id
fn named(rows: Vec<GroupRow>, names: &HashMap<i32, String>) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = rows
        .into_iter()
        .map(|row| GroupCount {
            id: row.id,
            name: names.get(&row.id).cloned().unwrap_or_default(),
            count: row.count.max(0) as u64,
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));
    groups
}
