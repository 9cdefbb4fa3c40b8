//! Derived endpoint records and the value types of a regeneration pass

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EndpointStatus, Resolution};
use crate::entities::endpoints;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "Deliverable stream URL derived from a line, a domain and a stream path")]
pub struct Endpoint {
    pub id: i32,
    pub provider_id: i32,
    pub line_id: i32,
    pub domain_id: i32,
    pub stream_id: i32,
    pub stream_path_id: i32,
    #[schema(example = "https://line1.example.com/table7/video.flv")]
    pub full_url: String,
    /// 0 = disabled, 1 = enabled
    #[schema(value_type = i32, example = 1)]
    pub status: EndpointStatus,
    pub resolution: Resolution,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Endpoint {
    pub fn key(&self) -> EndpointKey {
        EndpointKey {
            line_id: self.line_id,
            domain_id: self.domain_id,
            stream_path_id: self.stream_path_id,
        }
    }
}

impl From<endpoints::Model> for Endpoint {
    fn from(model: endpoints::Model) -> Self {
        Self {
            id: model.id,
            provider_id: model.provider_id,
            line_id: model.line_id,
            domain_id: model.domain_id,
            stream_id: model.stream_id,
            stream_path_id: model.stream_path_id,
            full_url: model.full_url,
            status: model.status,
            resolution: model.resolution,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Composite identity of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointKey {
    pub line_id: i32,
    pub domain_id: i32,
    pub stream_path_id: i32,
}

/// Manual create or full update of an endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndpointRequest {
    pub provider_id: i32,
    pub line_id: i32,
    pub domain_id: i32,
    pub stream_id: i32,
    pub stream_path_id: i32,
    /// Defaults to 1 when omitted
    #[serde(default)]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = 0)]
    pub status: i32,
}

/// Conjunctive endpoint list filter; `None` fields do not constrain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointFilter {
    pub line_id: Option<i32>,
    pub domain_id: Option<i32>,
    pub stream_id: Option<i32>,
    pub provider_id: Option<i32>,
    pub status: Option<EndpointStatus>,
    pub table_id: Option<String>,
    pub resolution: Option<Resolution>,
}

/// Endpoint values ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEndpoint {
    pub provider_id: i32,
    pub line_id: i32,
    pub domain_id: i32,
    pub stream_id: i32,
    pub stream_path_id: i32,
    pub full_url: String,
    pub status: EndpointStatus,
    pub resolution: Resolution,
}

impl NewEndpoint {
    pub fn key(&self) -> EndpointKey {
        EndpointKey {
            line_id: self.line_id,
            domain_id: self.domain_id,
            stream_path_id: self.stream_path_id,
        }
    }

    /// True when the stored row no longer reflects the derived values
    fn differs_from(&self, existing: &Endpoint) -> bool {
        self.full_url != existing.full_url
            || self.provider_id != existing.provider_id
            || self.stream_id != existing.stream_id
    }
}

/// Row-level changes that bring the stored endpoints in line with a desired set
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub insert: Vec<NewEndpoint>,
    /// Existing id paired with its recomputed values
    pub update: Vec<(i32, NewEndpoint)>,
    pub delete: Vec<i32>,
    pub unchanged: usize,
}

impl ReconcilePlan {
    /// Diff `existing` against `desired` by composite key.
    ///
    /// Rows absent from `desired` are deleted, including manual rows outside the
    /// generated set. Rows whose url, provider or stream changed are updated and
    /// take the desired resolution; all other rows keep their status and resolution.
    pub fn diff(existing: &[Endpoint], desired: Vec<NewEndpoint>) -> Self {
        let mut by_key: HashMap<EndpointKey, &Endpoint> =
            existing.iter().map(|endpoint| (endpoint.key(), endpoint)).collect();

        let mut plan = Self::default();
        for wanted in desired {
            match by_key.remove(&wanted.key()) {
                Some(current) if wanted.differs_from(current) => {
                    plan.update.push((current.id, wanted));
                }
                Some(_) => plan.unchanged += 1,
                None => plan.insert.push(wanted),
            }
        }

        plan.delete = by_key.into_values().map(|endpoint| endpoint.id).collect();
        plan.delete.sort_unstable();
        plan
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationFailure {
    pub line_id: Option<i32>,
    pub domain_id: Option<i32>,
    pub stream_path_id: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "Outcome of one regeneration pass")]
pub struct GenerationReport {
    /// Endpoints of the desired set that are persisted after the pass
    pub generated: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failures: Vec<GenerationFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    /// Width decoded from the live stream's SPS
    Probe,
    /// Heuristic on the stream path
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestResolutionResponse {
    pub resolution: Resolution,
    pub method: ClassificationMethod,
    pub message: String,
}
