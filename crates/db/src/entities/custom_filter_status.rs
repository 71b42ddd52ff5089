//! Status explicitly listed in a custom filter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_filter_statuses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub custom_filter_id: String,

    pub status_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::custom_filter::Entity",
        from = "Column::CustomFilterId",
        to = "super::custom_filter::Column::Id",
        on_delete = "Cascade"
    )]
    CustomFilter,
}

impl Related<super::custom_filter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomFilter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
