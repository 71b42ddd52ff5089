//! `ActivityPub` delivery job.

use serde::{Deserialize, Serialize};

/// Job to deliver an activity to a remote inbox.
///
/// Consumed by the signing HTTP deliverer; retried until it succeeds or the
/// inbox answers with a permanent failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverJob {
    /// The account whose key signs the request.
    pub actor_id: String,

    /// Target inbox URL.
    pub inbox: String,

    /// Activity JSON to deliver.
    pub activity: serde_json::Value,
}

impl DeliverJob {
    /// Create a new deliver job.
    #[must_use]
    pub const fn new(actor_id: String, inbox: String, activity: serde_json::Value) -> Self {
        Self {
            actor_id,
            inbox,
            activity,
        }
    }
}
