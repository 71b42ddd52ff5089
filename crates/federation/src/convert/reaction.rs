//! Emoji reaction → `EmojiReact` conversion.

use fanout_common::{AppError, AppResult};
use fanout_db::entities::{account, custom_emoji, emoji_reaction, status};
use url::Url;

use super::UrlConfig;
use crate::activities::{EmojiReactActivity, EmojiTag};

/// Extension trait for converting a reaction to an `EmojiReact` activity.
pub trait ReactionToActivity {
    /// Build the activity sent to remote inboxes.
    ///
    /// The activity ID is `<actor uri>#emoji_reactions/<reaction id>`.
    fn to_activity(
        &self,
        config: &UrlConfig,
        actor: &account::Model,
        status: &status::Model,
        status_author: &account::Model,
        emoji: Option<&custom_emoji::Model>,
    ) -> AppResult<EmojiReactActivity>;
}

impl ReactionToActivity for emoji_reaction::Model {
    fn to_activity(
        &self,
        config: &UrlConfig,
        actor: &account::Model,
        status: &status::Model,
        status_author: &account::Model,
        emoji: Option<&custom_emoji::Model>,
    ) -> AppResult<EmojiReactActivity> {
        let actor_uri = config.account_uri(actor)?;
        let mut id = actor_uri.clone();
        id.set_fragment(Some(&format!("emoji_reactions/{}", self.id)));
        let object = config.status_uri(status, status_author)?;

        let Some(emoji) = emoji else {
            return Ok(EmojiReactActivity::new(id, actor_uri, object, self.name.clone()));
        };

        let icon = Url::parse(&emoji.image_url).map_err(|e| {
            AppError::Federation(format!("Invalid emoji image URL {}: {e}", emoji.image_url))
        })?;
        let tag = EmojiTag::new(config.emoji_uri(emoji)?, &emoji.shortcode, icon);

        Ok(
            EmojiReactActivity::new(id, actor_uri, object, format!(":{}:", emoji.shortcode))
                .with_emoji(tag),
        )
    }
}
