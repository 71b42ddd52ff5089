//! EmojiReact activity (Misskey/Pleroma style emoji reactions).
//!
//! See: <https://docs.akkoma.dev/stable/development/ap_extensions/#emoji-reactions>

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// `ActivityStreams` JSON-LD context.
pub const AS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// Custom type for `EmojiReact` activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmojiReactType;

impl Serialize for EmojiReactType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("EmojiReact")
    }
}

impl<'de> Deserialize<'de> for EmojiReactType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "EmojiReact" {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected 'EmojiReact', got '{s}'"
            )))
        }
    }
}

/// `ActivityPub` EmojiReact activity.
///
/// # Example
///
/// ```json
/// {
///   "@context": "https://www.w3.org/ns/activitystreams",
///   "id": "https://example.com/users/alice#emoji_reactions/01h...",
///   "type": "EmojiReact",
///   "actor": "https://example.com/users/alice",
///   "object": "https://remote.example/notes/456",
///   "content": ":blobcat:",
///   "_misskey_reaction": ":blobcat:",
///   "tag": [{ "id": "https://example.com/emojis/1", "type": "Emoji", "name": ":blobcat:",
///             "icon": { "type": "Image", "url": "https://example.com/blobcat.png" } }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmojiReactActivity {
    #[serde(rename = "@context")]
    pub context: String,

    /// The activity's unique identifier.
    pub id: Url,

    #[serde(rename = "type")]
    pub kind: EmojiReactType,

    /// The reacting account.
    pub actor: Url,

    /// The status being reacted to.
    pub object: Url,

    /// Unicode emoji, or `:shortcode:` for custom emoji.
    pub content: String,

    /// Same value as `content`, read by Misskey-family servers.
    #[serde(rename = "_misskey_reaction")]
    pub misskey_reaction: String,

    /// Custom emoji definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<EmojiTag>>,
}

/// Tag structure for custom emoji definitions in `EmojiReact`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmojiTag {
    /// `ActivityPub` ID of the emoji.
    pub id: Url,

    /// Always "Emoji".
    #[serde(rename = "type")]
    pub kind: String,

    /// The emoji shortcode with colons (e.g., ":blobcat:").
    pub name: String,

    pub icon: EmojiIcon,
}

/// Icon structure for custom emoji.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmojiIcon {
    /// Always "Image".
    #[serde(rename = "type")]
    pub kind: String,

    /// URL of the emoji image.
    pub url: Url,
}

impl EmojiReactActivity {
    /// Create a new `EmojiReact` activity.
    #[must_use]
    pub fn new(id: Url, actor: Url, object: Url, content: String) -> Self {
        Self {
            context: AS_CONTEXT.to_string(),
            id,
            kind: EmojiReactType,
            actor,
            object,
            misskey_reaction: content.clone(),
            content,
            tag: None,
        }
    }

    /// Attach a custom emoji definition.
    #[must_use]
    pub fn with_emoji(mut self, tag: EmojiTag) -> Self {
        self.tag = Some(vec![tag]);
        self
    }
}

impl EmojiTag {
    /// Custom emoji tag for `shortcode`.
    #[must_use]
    pub fn new(id: Url, shortcode: &str, icon_url: Url) -> Self {
        Self {
            id,
            kind: "Emoji".to_string(),
            name: format!(":{shortcode}:"),
            icon: EmojiIcon {
                kind: "Image".to_string(),
                url: icon_url,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_emoji_react_serialization() {
        let activity = EmojiReactActivity::new(
            url("https://example.com/users/alice#emoji_reactions/1"),
            url("https://example.com/users/alice"),
            url("https://remote.example/notes/456"),
            "👍".to_string(),
        );

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["@context"], AS_CONTEXT);
        assert_eq!(json["type"], "EmojiReact");
        assert_eq!(json["content"], "👍");
        assert_eq!(json["_misskey_reaction"], "👍");
        assert!(json.get("tag").is_none());
    }

    #[test]
    fn test_emoji_react_with_custom_emoji() {
        let activity = EmojiReactActivity::new(
            url("https://example.com/users/alice#emoji_reactions/1"),
            url("https://example.com/users/alice"),
            url("https://remote.example/notes/456"),
            ":blobcat:".to_string(),
        )
        .with_emoji(EmojiTag::new(
            url("https://example.com/emojis/1"),
            "blobcat",
            url("https://example.com/emoji/blobcat.png"),
        ));

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["tag"][0]["type"], "Emoji");
        assert_eq!(json["tag"][0]["name"], ":blobcat:");
        assert_eq!(json["tag"][0]["icon"]["type"], "Image");
    }

    #[test]
    fn test_emoji_react_rejects_other_types() {
        let json = r#"{
            "@context": "https://www.w3.org/ns/activitystreams",
            "id": "https://example.com/react/1",
            "type": "Like",
            "actor": "https://example.com/users/alice",
            "object": "https://remote.example/notes/456",
            "content": "🎉",
            "_misskey_reaction": "🎉"
        }"#;

        assert!(serde_json::from_str::<EmojiReactActivity>(json).is_err());
    }
}
