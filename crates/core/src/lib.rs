//! Audience resolution and delivery for fanout.

pub mod services;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use services::*;

/// Generate a unique ID using ULID.
#[must_use]
pub fn generate_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}
