use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{EndpointStatus, Resolution};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "endpoints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub provider_id: i32,
    pub line_id: i32,
    pub domain_id: i32,
    pub stream_id: i32,
    pub stream_path_id: i32,
    pub full_url: String,
    pub status: EndpointStatus,
    pub resolution: Resolution,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::providers::Entity",
        from = "Column::ProviderId",
        to = "super::providers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Providers,
    #[sea_orm(
        belongs_to = "super::lines::Entity",
        from = "Column::LineId",
        to = "super::lines::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Lines,
    #[sea_orm(
        belongs_to = "super::domains::Entity",
        from = "Column::DomainId",
        to = "super::domains::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Domains,
    #[sea_orm(
        belongs_to = "super::streams::Entity",
        from = "Column::StreamId",
        to = "super::streams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Streams,
    #[sea_orm(
        belongs_to = "super::stream_paths::Entity",
        from = "Column::StreamPathId",
        to = "super::stream_paths::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    StreamPaths,
}

impl Related<super::providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Providers.def()
    }
}

impl Related<super::lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::domains::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Domains.def()
    }
}

impl Related<super::streams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Streams.def()
    }
}

impl Related<super::stream_paths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StreamPaths.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
