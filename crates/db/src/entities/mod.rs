//! Database entities.

pub mod account;
pub mod account_domain_block;
pub mod application;
pub mod block;
pub mod bookmark;
pub mod conversation_mute;
pub mod custom_emoji;
pub mod custom_filter;
pub mod custom_filter_keyword;
pub mod custom_filter_status;
pub mod domain_block;
pub mod emoji_reaction;
pub mod favourite;
pub mod follow;
pub mod friend_domain;
pub mod instance_info;
pub mod mention;
pub mod notification;
pub mod poll;
pub mod poll_vote;
pub mod relay;
pub mod status;
pub mod status_pin;

pub use account::Entity as Account;
pub use account_domain_block::Entity as AccountDomainBlock;
pub use application::Entity as Application;
pub use block::Entity as Block;
pub use bookmark::Entity as Bookmark;
pub use conversation_mute::Entity as ConversationMute;
pub use custom_emoji::Entity as CustomEmoji;
pub use custom_filter::Entity as CustomFilter;
pub use custom_filter_keyword::Entity as CustomFilterKeyword;
pub use custom_filter_status::Entity as CustomFilterStatus;
pub use domain_block::Entity as DomainBlock;
pub use emoji_reaction::Entity as EmojiReaction;
pub use favourite::Entity as Favourite;
pub use follow::Entity as Follow;
pub use friend_domain::Entity as FriendDomain;
pub use instance_info::Entity as InstanceInfo;
pub use mention::Entity as Mention;
pub use notification::Entity as Notification;
pub use poll::Entity as Poll;
pub use poll_vote::Entity as PollVote;
pub use relay::Entity as Relay;
pub use status::Entity as Status;
pub use status_pin::Entity as StatusPin;
