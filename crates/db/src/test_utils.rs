//! Model fixtures for tests.
//!
//! Builders return fully populated models with neutral defaults; tests
//! override the fields they care about with struct update syntax.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;

use crate::entities::{
    account::{self, ActorType, Protocol, ReactionPolicy},
    custom_emoji, emoji_reaction,
    status::{self, Searchability, Visibility},
};

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

/// A person account. `domain = None` makes it local.
#[must_use]
pub fn account_fixture(id: &str, domain: Option<&str>) -> account::Model {
    account::Model {
        id: id.to_string(),
        username: id.to_string(),
        domain: domain.map(String::from),
        uri: domain.map(|d| format!("https://{d}/users/{id}")),
        url: None,
        inbox_url: domain.map(|d| format!("https://{d}/users/{id}/inbox")),
        shared_inbox_url: None,
        protocol: Protocol::ActivityPub,
        actor_type: ActorType::Person,
        locked: false,
        suspended: false,
        show_application: true,
        reaction_policy: ReactionPolicy::Allow,
        exclude_timeline_domains: json!([]),
        created_at: now(),
        updated_at: None,
    }
}

/// A local, non-deleted status.
#[must_use]
pub fn status_fixture(id: &str, account_id: &str, visibility: Visibility) -> status::Model {
    status::Model {
        id: id.to_string(),
        account_id: account_id.to_string(),
        uri: None,
        url: None,
        text: String::new(),
        spoiler_text: String::new(),
        visibility,
        searchability: Searchability::Public,
        local: true,
        local_only: false,
        in_reply_to_id: None,
        in_reply_to_account_id: None,
        reblog_of_id: None,
        conversation_id: None,
        poll_id: None,
        application_id: None,
        created_at: now(),
        updated_at: now(),
        edited_at: None,
        deleted_at: None,
    }
}

/// A reaction without a custom emoji.
#[must_use]
pub fn reaction_fixture(
    id: &str,
    account_id: &str,
    status_id: &str,
    name: &str,
) -> emoji_reaction::Model {
    emoji_reaction::Model {
        id: id.to_string(),
        account_id: account_id.to_string(),
        status_id: status_id.to_string(),
        name: name.to_string(),
        custom_emoji_id: None,
        uri: None,
        created_at: now(),
        updated_at: now(),
    }
}

/// An enabled custom emoji. `domain = None` makes it local.
#[must_use]
pub fn custom_emoji_fixture(id: &str, shortcode: &str, domain: Option<&str>) -> custom_emoji::Model {
    let host = domain.unwrap_or("local.example");
    custom_emoji::Model {
        id: id.to_string(),
        shortcode: shortcode.to_string(),
        domain: domain.map(String::from),
        uri: domain.map(|d| format!("https://{d}/emojis/{shortcode}")),
        image_url: format!("https://{host}/emoji/{shortcode}.png"),
        static_image_url: None,
        disabled: false,
        created_at: now(),
        updated_at: None,
    }
}
