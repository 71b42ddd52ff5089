//! Friend server entity.
//!
//! A friend server has a mutual trust agreement with this instance and
//! receives public statuses directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Handshake state in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FriendState {
    #[sea_orm(string_value = "idle")]
    Idle,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend_domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub domain: String,

    #[sea_orm(nullable)]
    pub inbox_url: Option<String>,

    /// State of the request we sent
    pub active_state: FriendState,

    /// State of the request we received
    pub passive_state: FriendState,

    #[sea_orm(default_value = true)]
    pub available: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Available and accepted by the remote side.
    #[must_use]
    pub fn is_active_friend(&self) -> bool {
        self.available && self.active_state == FriendState::Accepted
    }
}
