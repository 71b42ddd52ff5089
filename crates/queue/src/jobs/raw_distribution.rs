//! Follower distribution job.

use serde::{Deserialize, Serialize};

/// Job to send an activity to every remote follower inbox of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDistributionJob {
    /// Activity JSON to distribute.
    pub activity: serde_json::Value,

    /// The account whose followers receive the activity. It also signs.
    pub source_account_id: String,
}

impl RawDistributionJob {
    /// Create a new raw distribution job.
    #[must_use]
    pub const fn new(activity: serde_json::Value, source_account_id: String) -> Self {
        Self {
            activity,
            source_account_id,
        }
    }
}
