//! Redis-backed infrastructure for fanout.
//!
//! This crate provides the Redis implementations of the core seams:
//!
//! - **Delivery**: apalis-redis queues for inbox delivery and follower distribution
//! - **Workers**: Raw distribution into per-inbox delivery jobs
//! - **Stream bus**: Redis Pub/Sub on per-account timeline channels
//! - **Payload cache**: Rendered status payloads with a TTL
//! - **Shared inbox**: One delivery per remote server where possible

pub mod delivery_impl;
pub mod jobs;
pub mod keys;
pub mod payload_cache;
pub mod shared_inbox;
pub mod stream_bus;
pub mod workers;

pub use delivery_impl::RedisDeliveryService;
pub use jobs::*;
pub use payload_cache::RedisPayloadCache;
pub use shared_inbox::follower_inboxes;
pub use stream_bus::RedisStreamBus;
pub use workers::*;
