//! Instance-wide domain block entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How strongly a domain is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "noop")]
    Noop,
    #[sea_orm(string_value = "silence")]
    Silence,
    #[sea_orm(string_value = "suspend")]
    Suspend,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "domain_blocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub domain: String,

    pub severity: Severity,

    /// Stop delivering to subscribers on this domain whose visibility
    /// handling is known to be broken.
    #[sea_orm(default_value = false)]
    pub detect_invalid_subscription: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
