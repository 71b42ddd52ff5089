//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub status_id: String,

    pub account_id: String,

    /// Option titles, in display order (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub options: Json,

    /// Vote count per option (JSON array of integers)
    #[sea_orm(column_type = "JsonBinary")]
    pub cached_tallies: Json,

    #[sea_orm(default_value = false)]
    pub multiple: bool,

    #[sea_orm(default_value = 0)]
    pub votes_count: i32,

    #[sea_orm(nullable)]
    pub voters_count: Option<i32>,

    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::poll_vote::Entity")]
    Votes,
}

impl Related<super::poll_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Option titles.
    #[must_use]
    pub fn option_titles(&self) -> Vec<String> {
        serde_json::from_value(self.options.clone()).unwrap_or_default()
    }

    /// Per-option vote counts, padded to the number of options.
    #[must_use]
    pub fn tallies(&self) -> Vec<i64> {
        let mut tallies: Vec<i64> =
            serde_json::from_value(self.cached_tallies.clone()).unwrap_or_default();
        tallies.resize(self.option_titles().len(), 0);
        tallies
    }
}
