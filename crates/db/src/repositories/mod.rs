//! Database repositories.

mod account;
mod custom_emoji;
mod emoji_reaction;
mod federation;
mod filter;
mod interaction;
mod notification;
mod poll;
mod relationship;
mod status;

pub use account::AccountRepository;
pub use custom_emoji::CustomEmojiRepository;
pub use emoji_reaction::{EmojiReactionRepository, IdRange};
pub use federation::FederationRepository;
pub use filter::{FilterRepository, FilterWithRules};
pub use interaction::InteractionRepository;
pub use notification::NotificationRepository;
pub use poll::PollRepository;
pub use relationship::RelationshipRepository;
pub use status::StatusRepository;
