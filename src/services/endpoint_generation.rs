//! Endpoint regeneration
//!
//! A pass loads the base catalog, derives the complete desired endpoint set
//! with [`plan_endpoints`] and hands it to the [`EndpointStore`], which applies
//! it in a single transaction. Passes within one process never overlap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::RegenerationStrategy;
use crate::errors::AppResult;
use crate::models::{
    Domain, EndpointStatus, GenerationFailure, GenerationReport, Line, NewEndpoint, Stream,
    StreamPath,
};
use crate::repositories::{BaseEntityStore, EndpointStore};
use crate::services::matching::is_match;
use crate::services::resolution::classify_path;
use crate::services::url_builder::build_endpoint_url;

/// Base entities read at the start of a pass
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub lines: Vec<Line>,
    pub domains: Vec<Domain>,
    pub streams: Vec<Stream>,
    pub stream_paths: Vec<StreamPath>,
}

impl CatalogSnapshot {
    pub async fn load(catalog: &dyn BaseEntityStore) -> AppResult<Self> {
        Ok(Self {
            lines: catalog.list_lines().await?,
            domains: catalog.list_domains().await?,
            streams: catalog.list_streams().await?,
            stream_paths: catalog.list_stream_paths().await?,
        })
    }
}

/// Endpoints a pass wants to exist, plus the paths it had to skip
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DesiredSet {
    pub endpoints: Vec<NewEndpoint>,
    pub failures: Vec<GenerationFailure>,
}

/// Derive the desired endpoint set from a snapshot.
///
/// Iterates lines, then their matching stream paths, then domains, each in
/// snapshot order. A stream path whose stream is absent is reported once and
/// skipped.
pub fn plan_endpoints(snapshot: &CatalogSnapshot) -> DesiredSet {
    let streams: HashMap<i32, &Stream> = snapshot
        .streams
        .iter()
        .map(|stream| (stream.id, stream))
        .collect();

    let mut desired = DesiredSet::default();
    let mut paths: Vec<(&StreamPath, &Stream)> = Vec::with_capacity(snapshot.stream_paths.len());
    for path in &snapshot.stream_paths {
        match streams.get(&path.stream_id) {
            Some(stream) => paths.push((path, stream)),
            None => desired.failures.push(GenerationFailure {
                line_id: None,
                domain_id: None,
                stream_path_id: path.id,
                reason: format!("stream {} not found", path.stream_id),
            }),
        }
    }

    for line in &snapshot.lines {
        for (path, stream) in paths.iter().filter(|(_, stream)| is_match(line, stream)) {
            let resolution = classify_path(&path.full_path);
            for domain in &snapshot.domains {
                desired.endpoints.push(NewEndpoint {
                    provider_id: line.provider_id,
                    line_id: line.id,
                    domain_id: domain.id,
                    stream_id: stream.id,
                    stream_path_id: path.id,
                    full_url: build_endpoint_url(&line.display_name, &domain.name, &path.full_path),
                    status: EndpointStatus::Enabled,
                    resolution,
                });
            }
        }
    }

    desired
}

/// Runs full regeneration passes, one at a time
pub struct RegenerationController {
    catalog: Arc<dyn BaseEntityStore>,
    endpoints: Arc<dyn EndpointStore>,
    strategy: RegenerationStrategy,
    lock: Mutex<()>,
}

impl RegenerationController {
    pub fn new(
        catalog: Arc<dyn BaseEntityStore>,
        endpoints: Arc<dyn EndpointStore>,
        strategy: RegenerationStrategy,
    ) -> Self {
        Self {
            catalog,
            endpoints,
            strategy,
            lock: Mutex::new(()),
        }
    }

    pub fn strategy(&self) -> RegenerationStrategy {
        self.strategy
    }

    /// Recompute and persist the whole endpoint set
    pub async fn regenerate_all(&self) -> AppResult<GenerationReport> {
        let _guard = self.lock.lock().await;
        let started = Instant::now();

        let snapshot = CatalogSnapshot::load(self.catalog.as_ref()).await?;
        debug!(
            lines = snapshot.lines.len(),
            domains = snapshot.domains.len(),
            streams = snapshot.streams.len(),
            stream_paths = snapshot.stream_paths.len(),
            "Loaded catalog snapshot"
        );

        let DesiredSet {
            endpoints,
            mut failures,
        } = plan_endpoints(&snapshot);
        let desired = endpoints.len();

        let mut report = self
            .endpoints
            .apply_generation(endpoints, self.strategy)
            .await?;
        failures.append(&mut report.failures);
        report.failures = failures;

        if !report.failures.is_empty() {
            warn!(
                failures = report.failures.len(),
                "Regeneration pass completed with failures"
            );
        }
        info!(
            strategy = ?self.strategy,
            desired,
            generated = report.generated,
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            removed = report.removed,
            duration_ms = started.elapsed().as_millis(),
            "Regenerated endpoints"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, RepositoryError};
    use crate::models::Resolution;
    use crate::repositories::{MockBaseEntityStore, MockEndpointStore};
    use chrono::Utc;
    use std::collections::HashSet;
    use tracing_test::traced_test;

    fn line(id: i32, provider_id: i32, code: &str, display_name: &str) -> Line {
        let now = Utc::now();
        Line {
            id,
            provider_id,
            name: format!("line {id}"),
            code: code.to_string(),
            display_name: display_name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn domain(id: i32, name: &str) -> Domain {
        let now = Utc::now();
        Domain {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn stream(id: i32, code: &str, provider_id: Option<i32>) -> Stream {
        let now = Utc::now();
        Stream {
            id,
            name: format!("stream {id}"),
            code: code.to_string(),
            provider_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn path(id: i32, stream_id: i32, full_path: &str) -> StreamPath {
        let now = Utc::now();
        StreamPath {
            id,
            stream_id,
            table_id: format!("table{id}"),
            full_path: full_path.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn two_by_two() -> CatalogSnapshot {
        CatalogSnapshot {
            lines: vec![line(1, 1, "live", "line1"), line(2, 2, "live", "line2")],
            domains: vec![domain(1, "example.com"), domain(2, "example.net")],
            streams: vec![stream(1, "live", None)],
            stream_paths: vec![path(1, 1, "table7/video"), path(2, 1, "table8/HD")],
        }
    }

    #[test]
    fn single_combination_renders_expected_url() {
        let snapshot = CatalogSnapshot {
            lines: vec![line(1, 1, "live", "line1")],
            domains: vec![domain(1, "example.com")],
            streams: vec![stream(1, "live", None)],
            stream_paths: vec![path(1, 1, "table7/video")],
        };

        let desired = plan_endpoints(&snapshot);

        assert!(desired.failures.is_empty());
        assert_eq!(
            desired.endpoints,
            vec![NewEndpoint {
                provider_id: 1,
                line_id: 1,
                domain_id: 1,
                stream_id: 1,
                stream_path_id: 1,
                full_url: "https://line1.example.com/table7/video.flv".to_string(),
                status: EndpointStatus::Enabled,
                resolution: Resolution::Sd,
            }]
        );
    }

    #[test]
    fn cardinality_is_lines_times_paths_times_domains() {
        let desired = plan_endpoints(&two_by_two());

        assert_eq!(desired.endpoints.len(), 2 * 2 * 2);
        let keys: HashSet<_> = desired.endpoints.iter().map(NewEndpoint::key).collect();
        assert_eq!(keys.len(), desired.endpoints.len());
        assert!(
            desired
                .endpoints
                .iter()
                .filter(|e| e.stream_path_id == 2)
                .all(|e| e.resolution == Resolution::Hd)
        );
    }

    #[test]
    fn scoped_stream_only_matches_lines_of_its_provider() {
        let mut snapshot = two_by_two();
        snapshot.streams = vec![stream(1, "live", Some(2))];

        let desired = plan_endpoints(&snapshot);

        assert_eq!(desired.endpoints.len(), 4);
        assert!(desired.endpoints.iter().all(|e| e.line_id == 2 && e.provider_id == 2));
    }

    #[test]
    fn code_mismatch_yields_nothing() {
        let mut snapshot = two_by_two();
        snapshot.streams = vec![stream(1, "vod", None)];

        let desired = plan_endpoints(&snapshot);

        assert!(desired.endpoints.is_empty());
        assert!(desired.failures.is_empty());
    }

    #[test]
    fn missing_stream_is_reported_once() {
        let mut snapshot = two_by_two();
        snapshot.stream_paths.push(path(3, 99, "orphan"));

        let desired = plan_endpoints(&snapshot);

        assert_eq!(desired.endpoints.len(), 8);
        assert_eq!(
            desired.failures,
            vec![GenerationFailure {
                line_id: None,
                domain_id: None,
                stream_path_id: 3,
                reason: "stream 99 not found".to_string(),
            }]
        );
    }

    #[test]
    fn planning_is_deterministic() {
        let snapshot = two_by_two();
        assert_eq!(plan_endpoints(&snapshot), plan_endpoints(&snapshot));
    }

    fn catalog_mock(snapshot: CatalogSnapshot) -> MockBaseEntityStore {
        let mut catalog = MockBaseEntityStore::new();
        let CatalogSnapshot {
            lines,
            domains,
            streams,
            stream_paths,
        } = snapshot;
        catalog.expect_list_lines().returning(move || Ok(lines.clone()));
        catalog.expect_list_domains().returning(move || Ok(domains.clone()));
        catalog.expect_list_streams().returning(move || Ok(streams.clone()));
        catalog
            .expect_list_stream_paths()
            .returning(move || Ok(stream_paths.clone()));
        catalog
    }

    #[tokio::test]
    #[traced_test]
    async fn controller_applies_plan_and_merges_failures() {
        let mut snapshot = two_by_two();
        snapshot.stream_paths.push(path(3, 99, "orphan"));

        let mut store = MockEndpointStore::new();
        store
            .expect_apply_generation()
            .withf(|desired, strategy| {
                desired.len() == 8 && *strategy == RegenerationStrategy::Rebuild
            })
            .times(1)
            .returning(|desired, _| {
                Ok(GenerationReport {
                    generated: desired.len() - 1,
                    inserted: desired.len() - 1,
                    failures: vec![GenerationFailure {
                        line_id: Some(1),
                        domain_id: Some(1),
                        stream_path_id: 1,
                        reason: "insert failed".to_string(),
                    }],
                    ..Default::default()
                })
            });

        let controller = RegenerationController::new(
            Arc::new(catalog_mock(snapshot)),
            Arc::new(store),
            RegenerationStrategy::Rebuild,
        );
        let report = controller.regenerate_all().await.unwrap();

        assert_eq!(report.generated, 7);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].stream_path_id, 3);
        assert_eq!(report.failures[1].line_id, Some(1));
        assert!(logs_contain("Regenerated endpoints"));
        assert!(logs_contain("completed with failures"));
    }

    #[tokio::test]
    async fn snapshot_errors_abort_before_apply() {
        let mut catalog = MockBaseEntityStore::new();
        catalog
            .expect_list_lines()
            .returning(|| Err(RepositoryError::not_found("line", 1)));
        let mut store = MockEndpointStore::new();
        store.expect_apply_generation().never();

        let controller = RegenerationController::new(
            Arc::new(catalog),
            Arc::new(store),
            RegenerationStrategy::Reconcile,
        );

        assert!(matches!(
            controller.regenerate_all().await,
            Err(AppError::Repository(_))
        ));
    }
}
