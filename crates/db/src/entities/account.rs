//! Account entity.
//!
//! Accounts are read-only input to audience resolution. A `None` domain means
//! the account is local to this instance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Federation protocol spoken by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[sea_orm(string_value = "activitypub")]
    ActivityPub,
    #[sea_orm(string_value = "ostatus")]
    OStatus,
}

/// `ActivityStreams` actor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ActorType {
    #[sea_orm(string_value = "Person")]
    Person,
    /// Automated account (bot).
    #[sea_orm(string_value = "Service")]
    Service,
    /// Instance or relay actor.
    #[sea_orm(string_value = "Application")]
    Application,
    #[sea_orm(string_value = "Group")]
    Group,
    #[sea_orm(string_value = "Organization")]
    Organization,
}

/// Who may react to an account's statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReactionPolicy {
    #[sea_orm(string_value = "allow")]
    Allow,
    /// Only accounts the author follows.
    #[sea_orm(string_value = "following_only")]
    FollowingOnly,
    /// Only accounts following the author.
    #[sea_orm(string_value = "followers_only")]
    FollowersOnly,
    #[sea_orm(string_value = "mutuals_only")]
    MutualsOnly,
    #[sea_orm(string_value = "block")]
    Block,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub username: String,

    /// NULL = local account, Some(domain) = remote account
    #[sea_orm(nullable, indexed)]
    pub domain: Option<String>,

    /// `ActivityPub` actor URI (remote accounts)
    #[sea_orm(nullable)]
    pub uri: Option<String>,

    /// Profile URL (human-readable)
    #[sea_orm(nullable)]
    pub url: Option<String>,

    #[sea_orm(nullable)]
    pub inbox_url: Option<String>,

    #[sea_orm(nullable)]
    pub shared_inbox_url: Option<String>,

    pub protocol: Protocol,

    pub actor_type: ActorType,

    /// Requires follow approval
    #[sea_orm(default_value = false)]
    pub locked: bool,

    #[sea_orm(default_value = false)]
    pub suspended: bool,

    /// Whether the client application is shown on public payloads
    #[sea_orm(default_value = true)]
    pub show_application: bool,

    pub reaction_policy: ReactionPolicy,

    /// Remote domains hidden from this account's live timeline
    #[sea_orm(column_type = "JsonBinary")]
    pub exclude_timeline_domains: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::status::Entity")]
    Statuses,
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the account lives on this instance.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.domain.is_none()
    }

    /// Remote account reachable over `ActivityPub`.
    #[must_use]
    pub fn is_activitypub(&self) -> bool {
        !self.is_local() && self.protocol == Protocol::ActivityPub
    }

    /// A local, human, non-suspended account that may hold a live session.
    #[must_use]
    pub fn is_end_user(&self) -> bool {
        self.is_local() && self.actor_type == ActorType::Person && !self.suspended
    }

    /// Shared inbox when advertised, personal inbox otherwise.
    #[must_use]
    pub fn preferred_inbox_url(&self) -> Option<&str> {
        self.shared_inbox_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.inbox_url.as_deref().filter(|url| !url.is_empty()))
    }

    /// Domains this account excluded from its live timeline.
    #[must_use]
    pub fn excluded_timeline_domains(&self) -> Vec<String> {
        serde_json::from_value(self.exclude_timeline_domains.clone()).unwrap_or_default()
    }

    /// `username` for local accounts, `username@domain` for remote ones.
    #[must_use]
    pub fn acct(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{domain}", self.username),
            None => self.username.clone(),
        }
    }
}
