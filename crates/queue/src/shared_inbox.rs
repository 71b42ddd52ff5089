//! Shared inbox selection for follower distribution.
//!
//! Followers on the same server usually share an inbox, so the activity is
//! sent there once instead of once per follower.

use std::collections::HashSet;

use fanout_db::entities::account;

/// Inboxes reaching every remote `ActivityPub` follower, shared inbox
/// preferred, in follower order without duplicates.
#[must_use]
pub fn follower_inboxes(followers: &[account::Model]) -> Vec<String> {
    let mut seen = HashSet::new();

    followers
        .iter()
        .filter(|f| f.is_activitypub())
        .filter_map(account::Model::preferred_inbox_url)
        .filter(|inbox| seen.insert(*inbox))
        .map(String::from)
        .collect()
}
