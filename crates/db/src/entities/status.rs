//! Status entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status visibility levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[sea_orm(string_value = "public")]
    Public,
    #[sea_orm(string_value = "unlisted")]
    Unlisted,
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "direct")]
    Direct,
    /// Mentioned accounts only.
    #[sea_orm(string_value = "limited")]
    Limited,
    /// Public on this instance, unlisted elsewhere.
    #[sea_orm(string_value = "public_unlisted")]
    PublicUnlisted,
    /// Visible to any signed-in account.
    #[sea_orm(string_value = "login")]
    Login,
}

impl Visibility {
    /// Public or unlisted: eligible for follower and relay fan-out.
    #[must_use]
    pub const fn is_distributable(self) -> bool {
        matches!(self, Self::Public | Self::Unlisted)
    }

    /// Wire name of the visibility.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Direct => "direct",
            Self::Limited => "limited",
            Self::PublicUnlisted => "public_unlisted",
            Self::Login => "login",
        }
    }
}

/// Who may find the status through search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Searchability {
    #[sea_orm(string_value = "public")]
    Public,
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "direct")]
    Direct,
    #[sea_orm(string_value = "limited")]
    Limited,
    #[sea_orm(string_value = "public_unlisted")]
    PublicUnlisted,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author account ID
    #[sea_orm(indexed)]
    pub account_id: String,

    /// `ActivityPub` URI (remote statuses)
    #[sea_orm(nullable)]
    pub uri: Option<String>,

    #[sea_orm(nullable)]
    pub url: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub spoiler_text: String,

    pub visibility: Visibility,

    pub searchability: Searchability,

    /// Authored on this instance
    #[sea_orm(default_value = true)]
    pub local: bool,

    /// Never federated
    #[sea_orm(default_value = false)]
    pub local_only: bool,

    #[sea_orm(nullable, indexed)]
    pub in_reply_to_id: Option<String>,

    #[sea_orm(nullable)]
    pub in_reply_to_account_id: Option<String>,

    /// Set on reblog wrappers
    #[sea_orm(nullable, indexed)]
    pub reblog_of_id: Option<String>,

    #[sea_orm(nullable)]
    pub conversation_id: Option<String>,

    #[sea_orm(nullable)]
    pub poll_id: Option<String>,

    #[sea_orm(nullable)]
    pub application_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    /// Touched on edits and reactions; drives payload cache invalidation
    pub updated_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub edited_at: Option<DateTimeWithTimeZone>,

    /// Soft-delete marker
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,

    #[sea_orm(has_many = "super::emoji_reaction::Entity")]
    EmojiReactions,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::emoji_reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmojiReactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this status only wraps another one.
    #[must_use]
    pub const fn is_reblog(&self) -> bool {
        self.reblog_of_id.is_some()
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Version of the rendered representation, in milliseconds.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.updated_at.timestamp_millis()
    }
}
