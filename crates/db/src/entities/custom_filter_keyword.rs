//! Keyword belonging to a custom filter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_filter_keywords")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub custom_filter_id: String,

    pub keyword: String,

    /// Match on word boundaries only
    #[sea_orm(default_value = true)]
    pub whole_word: bool,
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
