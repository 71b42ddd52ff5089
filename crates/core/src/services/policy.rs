//! Reaction capability gate.
//!
//! [`can_react`] is a pure predicate; [`ReactionContext::load`] gathers the
//! relationship state it reads.

use fanout_common::AppResult;
use fanout_db::entities::{
    account::{self, ReactionPolicy},
    status::{self, Visibility},
};

use crate::services::store::SocialStore;

/// Everything the gate looks at, resolved up front.
#[derive(Debug, Clone)]
pub struct ReactionContext<'a> {
    pub viewer: &'a account::Model,
    pub author: &'a account::Model,
    pub status: &'a status::Model,
    pub viewer_follows_author: bool,
    pub author_follows_viewer: bool,
    pub viewer_blocks_author: bool,
    pub author_blocks_viewer: bool,
    /// The viewer blocked the author's whole domain.
    pub viewer_blocks_author_domain: bool,
    /// The viewer is among the status mentions.
    pub viewer_mentioned: bool,
}

impl<'a> ReactionContext<'a> {
    /// Load relationship state between `viewer` and the status author.
    pub async fn load(
        store: &dyn SocialStore,
        viewer: &'a account::Model,
        author: &'a account::Model,
        status: &'a status::Model,
    ) -> AppResult<Self> {
        if viewer.id == author.id {
            return Ok(Self::own(viewer, status));
        }

        let viewer_blocks_author_domain = match &author.domain {
            Some(domain) => store.is_domain_blocking(&viewer.id, domain).await?,
            None => false,
        };

        let viewer_mentioned = store
            .mentions(&status.id)
            .await?
            .iter()
            .any(|m| m.account_id == viewer.id);

        Ok(Self {
            viewer,
            author,
            status,
            viewer_follows_author: store.is_following(&viewer.id, &author.id).await?,
            author_follows_viewer: store.is_following(&author.id, &viewer.id).await?,
            viewer_blocks_author: store.is_blocking(&viewer.id, &author.id).await?,
            author_blocks_viewer: store.is_blocking(&author.id, &viewer.id).await?,
            viewer_blocks_author_domain,
            viewer_mentioned,
        })
    }

    /// Context of an author looking at their own status.
    #[must_use]
    pub const fn own(account: &'a account::Model, status: &'a status::Model) -> Self {
        Self {
            viewer: account,
            author: account,
            status,
            viewer_follows_author: false,
            author_follows_viewer: false,
            viewer_blocks_author: false,
            author_blocks_viewer: false,
            viewer_blocks_author_domain: false,
            viewer_mentioned: false,
        }
    }
}

/// Whether the viewer may react to the status.
#[must_use]
pub fn can_react(ctx: &ReactionContext<'_>) -> bool {
    if ctx.status.is_deleted() || ctx.viewer.suspended {
        return false;
    }

    if ctx.viewer.id == ctx.author.id {
        return true;
    }

    can_see(ctx) && policy_admits(ctx)
}

fn can_see(ctx: &ReactionContext<'_>) -> bool {
    if ctx.viewer_blocks_author || ctx.author_blocks_viewer || ctx.viewer_blocks_author_domain {
        return false;
    }

    if ctx.status.local_only && !ctx.viewer.is_local() {
        return false;
    }

    match ctx.status.visibility {
        Visibility::Public | Visibility::Unlisted | Visibility::PublicUnlisted => true,
        Visibility::Login => ctx.viewer.is_local(),
        Visibility::Private => ctx.viewer_follows_author || ctx.viewer_mentioned,
        Visibility::Limited | Visibility::Direct => ctx.viewer_mentioned,
    }
}

const fn policy_admits(ctx: &ReactionContext<'_>) -> bool {
    match ctx.author.reaction_policy {
        ReactionPolicy::Allow => true,
        ReactionPolicy::FollowingOnly => ctx.author_follows_viewer,
        ReactionPolicy::FollowersOnly => ctx.viewer_follows_author,
        ReactionPolicy::MutualsOnly => ctx.author_follows_viewer && ctx.viewer_follows_author,
        ReactionPolicy::Block => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fanout_db::test_utils::{account_fixture, status_fixture};

    fn context<'a>(
        viewer: &'a account::Model,
        author: &'a account::Model,
        status: &'a status::Model,
    ) -> ReactionContext<'a> {
        ReactionContext {
            viewer,
            author,
            status,
            viewer_follows_author: false,
            author_follows_viewer: false,
            viewer_blocks_author: false,
            author_blocks_viewer: false,
            viewer_blocks_author_domain: false,
            viewer_mentioned: false,
        }
    }

    #[test]
    fn test_public_status_open_to_everyone() {
        let viewer = account_fixture("v", Some("remote.example"));
        let author = account_fixture("a", None);
        let status = status_fixture("s", "a", Visibility::Public);

        assert!(can_react(&context(&viewer, &author, &status)));
    }

    #[test]
    fn test_blocks_deny() {
        let viewer = account_fixture("v", None);
        let author = account_fixture("a", Some("remote.example"));
        let status = status_fixture("s", "a", Visibility::Public);

        let mut ctx = context(&viewer, &author, &status);
        ctx.author_blocks_viewer = true;
        assert!(!can_react(&ctx));

        let mut ctx = context(&viewer, &author, &status);
        ctx.viewer_blocks_author_domain = true;
        assert!(!can_react(&ctx));
    }

    #[test]
    fn test_private_requires_follow_or_mention() {
        let viewer = account_fixture("v", None);
        let author = account_fixture("a", None);
        let status = status_fixture("s", "a", Visibility::Private);

        let mut ctx = context(&viewer, &author, &status);
        assert!(!can_react(&ctx));

        ctx.viewer_follows_author = true;
        assert!(can_react(&ctx));
    }

    #[test]
    fn test_limited_requires_mention() {
        let viewer = account_fixture("v", None);
        let author = account_fixture("a", None);
        let status = status_fixture("s", "a", Visibility::Limited);

        let mut ctx = context(&viewer, &author, &status);
        ctx.viewer_follows_author = true;
        assert!(!can_react(&ctx));

        ctx.viewer_mentioned = true;
        assert!(can_react(&ctx));
    }

    #[test]
    fn test_local_only_and_login_exclude_remote_viewers() {
        let viewer = account_fixture("v", Some("remote.example"));
        let author = account_fixture("a", None);

        let local_only = status::Model {
            local_only: true,
            ..status_fixture("s", "a", Visibility::Public)
        };
        assert!(!can_react(&context(&viewer, &author, &local_only)));

        let login = status_fixture("s", "a", Visibility::Login);
        assert!(!can_react(&context(&viewer, &author, &login)));
    }

    #[test]
    fn test_reaction_policy() {
        let viewer = account_fixture("v", None);
        let status = status_fixture("s", "a", Visibility::Public);

        let author = account::Model {
            reaction_policy: ReactionPolicy::MutualsOnly,
            ..account_fixture("a", None)
        };
        let mut ctx = context(&viewer, &author, &status);
        ctx.viewer_follows_author = true;
        assert!(!can_react(&ctx));
        ctx.author_follows_viewer = true;
        assert!(can_react(&ctx));

        let author = account::Model {
            reaction_policy: ReactionPolicy::Block,
            ..account_fixture("a", None)
        };
        assert!(!can_react(&context(&viewer, &author, &status)));
    }

    #[test]
    fn test_author_may_react_to_own_status() {
        let author = account::Model {
            reaction_policy: ReactionPolicy::Block,
            ..account_fixture("a", None)
        };
        let status = status_fixture("s", "a", Visibility::Direct);

        assert!(can_react(&ReactionContext::own(&author, &status)));
    }

    #[test]
    fn test_deleted_status() {
        let author = account_fixture("a", None);
        let status = status::Model {
            deleted_at: Some(Utc::now().into()),
            ..status_fixture("s", "a", Visibility::Public)
        };

        assert!(!can_react(&ReactionContext::own(&author, &status)));
    }
}
