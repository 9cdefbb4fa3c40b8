//! Request extractors and validation
//!
//! Query strings are parsed into typed filters here so handlers only ever see
//! validated values. Rejections use the standard error envelope.

use std::str::FromStr;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::Response,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::responses::bad_request;
use crate::models::{EndpointFilter, Resolution};
use crate::services::endpoint_service::parse_status;

/// Raw endpoint list query; every field is optional and they combine with AND
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EndpointListParams {
    pub line_id: Option<i32>,
    pub domain_id: Option<i32>,
    pub stream_id: Option<i32>,
    pub provider_id: Option<i32>,
    /// 0 = disabled, 1 = enabled
    pub status: Option<i32>,
    /// Stream path table identifier
    pub table_id: Option<String>,
    /// SD, HD or UHD
    pub resolution: Option<String>,
}

impl EndpointListParams {
    pub fn into_filter(self) -> Result<EndpointFilter, String> {
        let status = self
            .status
            .map(parse_status)
            .transpose()
            .map_err(|e| e.to_string())?;
        let resolution = self
            .resolution
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                Resolution::from_str(value)
                    .map_err(|_| format!("unknown resolution '{value}', expected SD, HD or UHD"))
            })
            .transpose()?;
        let table_id = self
            .table_id
            .map(|table_id| table_id.trim().to_string())
            .filter(|table_id| !table_id.is_empty());

        Ok(EndpointFilter {
            line_id: self.line_id,
            domain_id: self.domain_id,
            stream_id: self.stream_id,
            provider_id: self.provider_id,
            status,
            table_id,
            resolution,
        })
    }
}

/// Validated endpoint filter taken from the query string
#[derive(Debug, Clone, Default)]
pub struct EndpointQuery(pub EndpointFilter);

impl<S> FromRequestParts<S> for EndpointQuery
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params): Query<EndpointListParams> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e| bad_request(format!("Invalid endpoint filter: {}", e.body_text())))?;

        params.into_filter().map(EndpointQuery).map_err(bad_request)
    }
}

/// Optional provider scope for the line listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LineListParams {
    pub provider_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EndpointStatus;

    #[test]
    fn empty_query_is_unconstrained() {
        let filter = EndpointListParams::default().into_filter().unwrap();
        assert_eq!(filter, EndpointFilter::default());
    }

    #[test]
    fn parses_status_and_resolution() {
        let filter = EndpointListParams {
            status: Some(0),
            resolution: Some("uhd".to_string()),
            table_id: Some(" table7 ".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.status, Some(EndpointStatus::Disabled));
        assert_eq!(filter.resolution, Some(Resolution::Uhd));
        assert_eq!(filter.table_id.as_deref(), Some("table7"));
    }

    #[test]
    fn rejects_unknown_status() {
        let err = EndpointListParams {
            status: Some(5),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(err.contains("status"));
    }

    #[test]
    fn rejects_unknown_resolution() {
        let err = EndpointListParams {
            resolution: Some("8K".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(err.contains("8K"));
    }
}
