//! URIs of local and remote entities.

use fanout_common::{AppError, AppResult};
use fanout_db::entities::{account, custom_emoji, status};
use url::Url;

/// Configuration for generating entity URIs.
#[derive(Debug, Clone)]
pub struct UrlConfig {
    pub base_url: Url,
}

impl UrlConfig {
    /// Create a new URL config.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Build from the configured public server URL.
    pub fn parse(server_url: &str) -> AppResult<Self> {
        Url::parse(server_url)
            .map(Self::new)
            .map_err(|e| AppError::Config(format!("Invalid server URL: {e}")))
    }

    fn join(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Federation(format!("Invalid URL path {path}: {e}")))
    }

    /// Actor URI. Remote accounts use their stored URI.
    pub fn account_uri(&self, account: &account::Model) -> AppResult<Url> {
        match (&account.domain, &account.uri) {
            (Some(_), Some(uri)) => parse_remote(uri),
            (Some(domain), None) => Err(AppError::Federation(format!(
                "Remote account {}@{domain} has no URI",
                account.username
            ))),
            (None, _) => self.join(&format!("/users/{}", account.username)),
        }
    }

    /// Status URI. Remote statuses use their stored URI.
    pub fn status_uri(&self, status: &status::Model, author: &account::Model) -> AppResult<Url> {
        match &status.uri {
            Some(uri) if !status.local => parse_remote(uri),
            _ => self.join(&format!("/users/{}/statuses/{}", author.username, status.id)),
        }
    }

    /// `Emoji` object ID.
    pub fn emoji_uri(&self, emoji: &custom_emoji::Model) -> AppResult<Url> {
        match &emoji.uri {
            Some(uri) if !emoji.is_local() => parse_remote(uri),
            _ => self.join(&format!("/emojis/{}", emoji.id)),
        }
    }
}

fn parse_remote(uri: &str) -> AppResult<Url> {
    Url::parse(uri).map_err(|e| AppError::Federation(format!("Invalid stored URI {uri}: {e}")))
}
