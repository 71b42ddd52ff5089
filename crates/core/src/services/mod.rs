//! Business logic services.

#![allow(missing_docs)]

pub mod delivery;
pub mod emoji;
pub mod filter;
pub mod hydrator;
pub mod jobs;
pub mod notification;
pub mod payload_cache;
pub mod policy;
pub mod reach;
pub mod reaction;
pub mod reaction_group;
pub mod render;
pub mod scope;
pub mod store;
pub mod stream_bus;
pub mod stream_fanout;

pub use delivery::{ActivityDelivery, DeliveryService, NoOpDelivery};
pub use emoji::{EmojiName, is_unicode_emoji, validate_reaction};
pub use filter::{FilterPayload, FilterResultPayload, apply_filters};
pub use hydrator::CacheHydrator;
pub use jobs::{Job, JobSender, JobService, JobWorkerContext};
pub use notification::NotificationService;
pub use payload_cache::{CachedPayload, MemoryPayloadCache, PayloadCache, PayloadCacheService};
pub use policy::{ReactionContext, can_react};
pub use reach::{ReachOptions, ReachResolver};
pub use reaction::{EMOJI_REACTION_ACTIVITY, Page, ReactionService};
pub use reaction_group::{ReactionGroup, ReactionGroups};
pub use render::{
    AccountPayload, ApplicationPayload, PollOptionPayload, PollPayload, StatusPayload,
    StatusRenderer, payload_version,
};
pub use scope::DistributionScope;
pub use store::{RepositoryStore, SocialStore, StoreService};
pub use stream_bus::{
    EMOJI_REACTION_EVENT, EmojiReactionPayload, NOTIFICATION_EVENT, NoOpStreamBus, StreamBus,
    StreamBusService, StreamEnvelope, timeline_channel,
};
pub use stream_fanout::StreamFanoutWorker;
