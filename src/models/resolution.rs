use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Video resolution tier, ordered SD < HD < UHD
///
/// Stored and serialized as `"SD"`, `"HD"`, `"UHD"`. Parsing is case-insensitive
/// and also accepts the legacy labels `普清`, `高清` and `超清`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[strum(ascii_case_insensitive)]
pub enum Resolution {
    #[default]
    #[sea_orm(string_value = "SD")]
    #[serde(rename = "SD", alias = "sd", alias = "普清")]
    #[strum(to_string = "SD", serialize = "普清")]
    Sd,
    #[sea_orm(string_value = "HD")]
    #[serde(rename = "HD", alias = "hd", alias = "高清")]
    #[strum(to_string = "HD", serialize = "高清")]
    Hd,
    #[sea_orm(string_value = "UHD")]
    #[serde(rename = "UHD", alias = "uhd", alias = "超清")]
    #[strum(to_string = "UHD", serialize = "超清")]
    Uhd,
}

/// Endpoint enabled flag, `0` or `1` on the wire and in storage
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum EndpointStatus {
    #[sea_orm(num_value = 0)]
    Disabled,
    #[default]
    #[sea_orm(num_value = 1)]
    Enabled,
}

impl From<EndpointStatus> for i32 {
    fn from(status: EndpointStatus) -> Self {
        match status {
            EndpointStatus::Disabled => 0,
            EndpointStatus::Enabled => 1,
        }
    }
}

impl TryFrom<i32> for EndpointStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EndpointStatus::Disabled),
            1 => Ok(EndpointStatus::Enabled),
            other => Err(format!("status must be 0 or 1, got {other}")),
        }
    }
}
