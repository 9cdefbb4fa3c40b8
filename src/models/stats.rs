use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row count attributed to one parent record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupCount {
    pub id: i32,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(description = "Catalog totals and endpoint distribution")]
pub struct CatalogStats {
    pub providers: u64,
    pub lines: u64,
    pub domains: u64,
    pub streams: u64,
    pub stream_paths: u64,
    pub endpoints: u64,
    pub endpoints_enabled: u64,
    pub endpoints_disabled: u64,
    pub lines_by_provider: Vec<GroupCount>,
    pub endpoints_by_stream: Vec<GroupCount>,
    pub endpoints_by_domain: Vec<GroupCount>,
}
