//! Reactions aggregated by emoji.

use std::collections::HashMap;

use fanout_common::AppResult;
use fanout_db::entities::{custom_emoji, emoji_reaction};
use serde::{Deserialize, Serialize};

use crate::services::store::SocialStore;

/// Reactions on a status sharing one emoji name and custom emoji domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionGroup {
    pub name: String,
    pub count: u64,
    pub account_ids: Vec<String>,
    /// Whether the viewer is among the reactors. Always false when rendered
    /// without a viewer.
    pub me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_url: Option<String>,
    /// Domain of a remote custom emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Groups of a status, in order of their first reaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionGroups(Vec<ReactionGroup>);

impl ReactionGroups {
    /// Group reactions, which must be sorted oldest first.
    #[must_use]
    pub fn build(
        reactions: &[emoji_reaction::Model],
        emojis: &[custom_emoji::Model],
        viewer_id: Option<&str>,
    ) -> Self {
        let emojis: HashMap<&str, &custom_emoji::Model> =
            emojis.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut groups: Vec<ReactionGroup> = Vec::new();
        let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();

        for reaction in reactions {
            let emoji = reaction
                .custom_emoji_id
                .as_deref()
                .and_then(|id| emojis.get(id).copied());
            let domain = emoji.and_then(|e| e.domain.clone());
            let key = (reaction.name.clone(), domain.clone());

            let position = *index.entry(key).or_insert_with(|| {
                groups.push(ReactionGroup {
                    name: reaction.name.clone(),
                    count: 0,
                    account_ids: Vec::new(),
                    me: false,
                    url: emoji.map(|e| e.image_url.clone()),
                    static_url: emoji.map(|e| e.static_url().to_string()),
                    domain,
                });
                groups.len() - 1
            });

            let group = &mut groups[position];
            group.count += 1;
            group.account_ids.push(reaction.account_id.clone());
            if viewer_id == Some(reaction.account_id.as_str()) {
                group.me = true;
            }
        }

        Self(groups)
    }

    /// Recompute the groups of a status from storage.
    pub async fn load(
        store: &dyn SocialStore,
        status_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Self> {
        let reactions = store.status_reactions(status_id).await?;

        let mut emoji_ids: Vec<String> = reactions
            .iter()
            .filter_map(|r| r.custom_emoji_id.clone())
            .collect();
        emoji_ids.sort_unstable();
        emoji_ids.dedup();

        let emojis = if emoji_ids.is_empty() {
            Vec::new()
        } else {
            store.find_custom_emojis(&emoji_ids).await?
        };

        Ok(Self::build(&reactions, &emojis, viewer_id))
    }

    /// Look up a group by name and custom emoji domain.
    #[must_use]
    pub fn find(&self, name: &str, domain: Option<&str>) -> Option<&ReactionGroup> {
        self.0
            .iter()
            .find(|g| g.name == name && g.domain.as_deref() == domain)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ReactionGroup> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fanout_db::test_utils::{custom_emoji_fixture, reaction_fixture};

    #[test]
    fn test_groups_by_name_and_domain() {
        let local = custom_emoji_fixture("e1", "blobcat", None);
        let remote = custom_emoji_fixture("e2", "blobcat", Some("remote.example"));

        let reactions = vec![
            reaction_fixture("r1", "a", "s", "👍"),
            emoji_reaction::Model {
                custom_emoji_id: Some("e1".to_string()),
                ..reaction_fixture("r2", "b", "s", "blobcat")
            },
            emoji_reaction::Model {
                custom_emoji_id: Some("e2".to_string()),
                ..reaction_fixture("r3", "c", "s", "blobcat")
            },
            reaction_fixture("r4", "c", "s", "👍"),
        ];

        let groups = ReactionGroups::build(&reactions, &[local, remote], Some("c"));
        assert_eq!(groups.len(), 3);

        let thumbs = groups.find("👍", None).unwrap();
        assert_eq!(thumbs.count, 2);
        assert_eq!(thumbs.account_ids, vec!["a", "c"]);
        assert!(thumbs.me);

        let local_group = groups.find("blobcat", None).unwrap();
        assert_eq!(local_group.account_ids, vec!["b"]);
        assert!(!local_group.me);
        assert!(local_group.url.is_some());

        let remote_group = groups.find("blobcat", Some("remote.example")).unwrap();
        assert_eq!(remote_group.account_ids, vec!["c"]);

        assert!(groups.find("blobcat", Some("other.example")).is_none());
    }

    #[test]
    fn test_groups_keep_first_reaction_order() {
        let reactions = vec![
            reaction_fixture("r1", "a", "s", "😀"),
            reaction_fixture("r2", "b", "s", "👍"),
            reaction_fixture("r3", "c", "s", "😀"),
        ];

        let names: Vec<String> = ReactionGroups::build(&reactions, &[], None)
            .into_vec()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["😀", "👍"]);
    }
}
