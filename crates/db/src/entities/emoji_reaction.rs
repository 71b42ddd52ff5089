//! Emoji reaction entity.
//!
//! At most one row exists per `(account_id, status_id, name)`; a unique
//! index enforces it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emoji_reactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The account who reacted
    pub account_id: String,

    /// The status being reacted to
    #[sea_orm(indexed)]
    pub status_id: String,

    /// Unicode emoji or custom emoji shortcode (without colons)
    pub name: String,

    /// Set for custom emoji reactions
    #[sea_orm(nullable)]
    pub custom_emoji_id: Option<String>,

    /// `ActivityPub` ID for reactions received from remote instances
    #[sea_orm(nullable)]
    pub uri: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,

    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id",
        on_delete = "Cascade"
    )]
    Status,

    #[sea_orm(
        belongs_to = "super::custom_emoji::Entity",
        from = "Column::CustomEmojiId",
        to = "super::custom_emoji::Column::Id",
        on_delete = "Cascade"
    )]
    CustomEmoji,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::custom_emoji::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomEmoji.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
