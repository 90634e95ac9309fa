use crate::core::error::ProviderFailure;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "unknown";
pub const UNKNOWN_PARSE_TIME: &str = "N/A";

/// Provider-agnostic answer for one share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub media_url: String,
    pub backup_urls: Vec<String>,
    pub author_name: String,
    pub author_avatar_url: String,
    pub author_signature: String,
    pub description: String,
    pub parse_timestamp: String,
}

impl ProviderResult {
    /// A result with the given media URL and every other field at its placeholder.
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            backup_urls: Vec::new(),
            author_name: UNKNOWN_AUTHOR.to_string(),
            author_avatar_url: String::new(),
            author_signature: String::new(),
            description: String::new(),
            parse_timestamp: UNKNOWN_PARSE_TIME.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.media_url.is_empty()
    }

    /// Primary URL first, then backups, in the order a player or downloader should try them.
    pub fn candidate_urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.media_url.as_str()).chain(self.backup_urls.iter().map(String::as_str))
    }
}

/// A successful resolution and what it took to get there.
#[derive(Debug)]
pub struct Resolution {
    pub provider: String,
    pub result: ProviderResult,
    /// Providers that were tried and failed before `provider` answered.
    pub failures: Vec<ProviderFailure>,
}
