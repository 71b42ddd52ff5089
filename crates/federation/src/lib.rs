//! `ActivityPub` representation of fan-out events.
//!
//! This crate covers only what remote servers need to identify a reaction
//! and the status it targets:
//!
//! - **Activities**: `EmojiReact`, with Misskey's `_misskey_reaction` extension
//! - **Conversion**: actor/status URIs and reaction → activity mapping

pub mod activities;
pub mod convert;

pub use activities::*;
pub use convert::*;
