//! Software information reported by remote instances (nodeinfo).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instance_infos")]
pub struct Model {
    /// The hostname of the instance.
    #[sea_orm(primary_key, auto_increment = false)]
    pub domain: String,

    /// Software name (e.g., "misskey", "mastodon", "pleroma").
    pub software: String,

    #[sea_orm(nullable)]
    pub version: Option<String>,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
