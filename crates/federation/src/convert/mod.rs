//! Conversion between database entities and `ActivityPub` types.

mod reaction;
mod urls;

pub use reaction::ReactionToActivity;
pub use urls::UrlConfig;
