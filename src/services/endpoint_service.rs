//! Endpoint CRUD and on-demand resolution testing
//!
//! Manual writes verify every referenced row and the (line, domain, stream
//! path) uniqueness themselves so that callers get a precise NotFound or
//! Conflict instead of a raw constraint error. The match rule is not checked
//! here; a manual endpoint outside the generated set is removed by the next
//! regeneration pass.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::{AppError, AppResult, RepositoryError};
use crate::models::{
    ClassificationMethod, Endpoint, EndpointFilter, EndpointKey, EndpointRequest,
    EndpointStatus, NewEndpoint, TestResolutionResponse,
};
use crate::repositories::{BaseEntityStore, EndpointStore};
use crate::services::resolution::classify_path;
use crate::services::stream_prober::{ProbeError, StreamProber};
use crate::services::url_builder::build_endpoint_url;

const RESOURCE: &str = "endpoint";

/// Parse a caller supplied status; only 0 and 1 are valid
pub fn parse_status(status: i32) -> AppResult<EndpointStatus> {
    EndpointStatus::try_from(status)
        .map_err(|_| AppError::validation(format!("status must be 0 or 1, got {status}")))
}

fn repository_error(err: RepositoryError) -> AppError {
    AppError::from_repository(RESOURCE, err)
}

fn required<T>(value: Option<T>, resource: &str, id: i32) -> AppResult<T> {
    value.ok_or_else(|| AppError::not_found(resource, id))
}

pub struct EndpointService {
    catalog: Arc<dyn BaseEntityStore>,
    endpoints: Arc<dyn EndpointStore>,
    prober: StreamProber,
    probe_timeout: Duration,
}

impl EndpointService {
    pub fn new(
        catalog: Arc<dyn BaseEntityStore>,
        endpoints: Arc<dyn EndpointStore>,
        prober: StreamProber,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            endpoints,
            prober,
            probe_timeout,
        }
    }

    pub async fn list(&self, filter: EndpointFilter) -> AppResult<Vec<Endpoint>> {
        self.endpoints.list(filter).await.map_err(repository_error)
    }

    pub async fn get(&self, id: i32) -> AppResult<Endpoint> {
        let endpoint = self.endpoints.get(id).await.map_err(repository_error)?;
        required(endpoint, RESOURCE, id)
    }

    /// Create an endpoint by hand
    pub async fn create(&self, request: EndpointRequest) -> AppResult<Endpoint> {
        let endpoint = self.prepare(&request, None).await?;
        let created = self
            .endpoints
            .insert(endpoint)
            .await
            .map_err(repository_error)?;
        info!(id = created.id, url = %created.full_url, "Created endpoint");
        Ok(created)
    }

    /// Replace every field of endpoint `id`, recomputing its URL and resolution
    pub async fn update(&self, id: i32, request: EndpointRequest) -> AppResult<Endpoint> {
        self.get(id).await?;
        let endpoint = self.prepare(&request, Some(id)).await?;
        let updated = self
            .endpoints
            .update(id, endpoint)
            .await
            .map_err(repository_error)?;
        info!(id, url = %updated.full_url, "Updated endpoint");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.endpoints.delete(id).await.map_err(repository_error)? {
            return Err(AppError::not_found(RESOURCE, id));
        }
        info!(id, "Deleted endpoint");
        Ok(())
    }

    pub async fn set_status(&self, id: i32, status: i32) -> AppResult<Endpoint> {
        let status = parse_status(status)?;
        let endpoint = self
            .endpoints
            .set_status(id, status)
            .await
            .map_err(repository_error)?;
        info!(id, status = i32::from(status), "Changed endpoint status");
        Ok(endpoint)
    }

    /// Probe the endpoint's live stream and persist the detected tier.
    ///
    /// URLs whose scheme cannot be probed fall back to the path classifier.
    /// Every other probe failure is returned and nothing is persisted.
    pub async fn test_resolution(&self, id: i32) -> AppResult<TestResolutionResponse> {
        let endpoint = self.get(id).await?;

        let (resolution, method, message) =
            match self.prober.probe(&endpoint.full_url, self.probe_timeout).await {
                Ok(outcome) => (
                    outcome.resolution,
                    ClassificationMethod::Probe,
                    format!(
                        "Decoded {}x{} from the stream's sequence header",
                        outcome.width, outcome.height
                    ),
                ),
                Err(ProbeError::UnsupportedProtocol { scheme }) => {
                    let path = self
                        .catalog
                        .get_stream_path(endpoint.stream_path_id)
                        .await
                        .map_err(repository_error)?;
                    let path = required(path, "stream path", endpoint.stream_path_id)?;
                    warn!(id, scheme = %scheme, "Scheme cannot be probed, classifying by path");
                    (
                        classify_path(&path.full_path),
                        ClassificationMethod::Path,
                        format!("{scheme} streams cannot be probed; classified from the stream path"),
                    )
                }
                Err(e) => return Err(e.into()),
            };

        self.endpoints
            .set_resolution(id, resolution)
            .await
            .map_err(repository_error)?;
        info!(id, resolution = %resolution, ?method, "Tested endpoint resolution");

        Ok(TestResolutionResponse {
            resolution,
            method,
            message,
        })
    }

    /// Validate a manual request and compute its derived columns.
    /// `current` is the id being updated, which may keep its own combination.
    async fn prepare(
        &self,
        request: &EndpointRequest,
        current: Option<i32>,
    ) -> AppResult<NewEndpoint> {
        let status = match request.status {
            Some(status) => parse_status(status)?,
            None => EndpointStatus::Enabled,
        };

        let catalog = self.catalog.as_ref();
        required(
            catalog
                .get_provider(request.provider_id)
                .await
                .map_err(repository_error)?,
            "provider",
            request.provider_id,
        )?;
        let line = required(
            catalog.get_line(request.line_id).await.map_err(repository_error)?,
            "line",
            request.line_id,
        )?;
        let domain = required(
            catalog
                .get_domain(request.domain_id)
                .await
                .map_err(repository_error)?,
            "domain",
            request.domain_id,
        )?;
        required(
            catalog
                .get_stream(request.stream_id)
                .await
                .map_err(repository_error)?,
            "stream",
            request.stream_id,
        )?;
        let path = required(
            catalog
                .get_stream_path(request.stream_path_id)
                .await
                .map_err(repository_error)?,
            "stream path",
            request.stream_path_id,
        )?;

        let key = EndpointKey {
            line_id: request.line_id,
            domain_id: request.domain_id,
            stream_path_id: request.stream_path_id,
        };
        if let Some(existing) = self
            .endpoints
            .find_by_key(key)
            .await
            .map_err(repository_error)?
        {
            if Some(existing.id) != current {
                return Err(AppError::conflict(
                    RESOURCE,
                    format!(
                        "endpoint {} already combines line {}, domain {} and stream path {}",
                        existing.id, key.line_id, key.domain_id, key.stream_path_id
                    ),
                ));
            }
        }

        Ok(NewEndpoint {
            provider_id: request.provider_id,
            line_id: request.line_id,
            domain_id: request.domain_id,
            stream_id: request.stream_id,
            stream_path_id: request.stream_path_id,
            full_url: build_endpoint_url(&line.display_name, &domain.name, &path.full_path),
            status,
            resolution: classify_path(&path.full_path),
        })
    }
}
