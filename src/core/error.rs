use std::time::Duration;
use thiserror::Error;

/// Why a single provider attempt did not produce a usable result.
///
/// None of these abort a resolution; the resolver records them and moves on
/// to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider answered HTTP {0}")]
    Status(u16),

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("unexpected response shape: {0}")]
    ShapeMismatch(String),

    #[error("response carries no media URL")]
    MissingMediaUrl,
}

impl ProviderError {
    /// Network, status, body or timeout problems, as opposed to a response
    /// that arrived intact but could not be used.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_)
                | ProviderError::Status(_)
                | ProviderError::InvalidJson(_)
                | ProviderError::Timeout(_)
        )
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        ProviderError::ShapeMismatch(reason.into())
    }
}

#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// The only failures a caller of `Resolver::resolve` ever sees.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("input contains no link")]
    EmptyInput,

    #[error("no providers configured")]
    NoProviders,

    #[error("no provider could resolve the link ({} tried)", .failures.len())]
    Exhausted { failures: Vec<ProviderFailure> },
}
