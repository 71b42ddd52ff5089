//! `ActivityPub` activity types.

mod emoji_react;

pub use emoji_react::{AS_CONTEXT, EmojiIcon, EmojiReactActivity, EmojiReactType, EmojiTag};
