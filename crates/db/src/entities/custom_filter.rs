//! Custom filter entity.
//!
//! A filter owns keywords and explicitly listed statuses. Matching results are
//! attached to hydrated payloads for the filter's owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Action to take when a filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Show a warning before revealing.
    #[sea_orm(string_value = "warn")]
    Warn,
    /// Hide the content completely.
    #[sea_orm(string_value = "hide")]
    Hide,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_filters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner of the filter.
    #[sea_orm(indexed)]
    pub account_id: String,

    pub title: String,

    /// Contexts the filter applies to (JSON array, e.g. `["home", "public"]`).
    #[sea_orm(column_type = "JsonBinary")]
    pub context: Json,

    pub action: FilterAction,

    /// Optional expiration date (for temporary filters).
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::custom_filter_keyword::Entity")]
    Keywords,

    #[sea_orm(has_many = "super::custom_filter_status::Entity")]
    Statuses,
}

impl Related<super::custom_filter_keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keywords.def()
    }
}

impl Related<super::custom_filter_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Contexts the filter applies to.
    #[must_use]
    pub fn contexts(&self) -> Vec<String> {
        serde_json::from_value(self.context.clone()).unwrap_or_default()
    }
}
