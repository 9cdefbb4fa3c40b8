//! Domain models shared by the repositories, services and HTTP handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{domains, lines, providers, stream_paths, streams};

pub mod endpoint;
pub mod resolution;
pub mod stats;

pub use endpoint::{
    ClassificationMethod, Endpoint, EndpointFilter, EndpointKey, EndpointRequest,
    GenerationFailure, GenerationReport, NewEndpoint, ReconcilePlan, TestResolutionResponse,
    UpdateStatusRequest,
};
pub use resolution::{EndpointStatus, Resolution};
pub use stats::{CatalogStats, GroupCount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "CDN provider that owns delivery lines")]
pub struct Provider {
    pub id: i32,
    pub name: String,
    #[schema(example = "acme_cdn")]
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderRequest {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "Delivery line of a provider; display_name becomes the URL host label")]
pub struct Line {
    pub id: i32,
    pub provider_id: i32,
    pub name: String,
    pub code: String,
    #[schema(example = "line1")]
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineRequest {
    pub provider_id: i32,
    pub name: String,
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Domain {
    pub id: i32,
    #[schema(example = "example.com")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DomainRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "Logical stream; without provider_id it matches lines of every provider")]
pub struct Stream {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub provider_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StreamRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub provider_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StreamPath {
    pub id: i32,
    pub stream_id: i32,
    #[schema(example = "table7")]
    pub table_id: String,
    #[schema(example = "table7/video")]
    pub full_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StreamPathRequest {
    pub stream_id: i32,
    pub table_id: String,
    pub full_path: String,
}

impl From<providers::Model> for Provider {
    fn from(model: providers::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<lines::Model> for Line {
    fn from(model: lines::Model) -> Self {
        Self {
            id: model.id,
            provider_id: model.provider_id,
            name: model.name,
            code: model.code,
            display_name: model.display_name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<domains::Model> for Domain {
    fn from(model: domains::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<streams::Model> for Stream {
    fn from(model: streams::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            provider_id: model.provider_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<stream_paths::Model> for StreamPath {
    fn from(model: stream_paths::Model) -> Self {
        Self {
            id: model.id,
            stream_id: model.stream_id,
            table_id: model.table_id,
            full_path: model.full_path,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
