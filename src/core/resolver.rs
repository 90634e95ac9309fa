use crate::core::{
    ParseRequest, Provider, ProviderError, ProviderFailure, ProviderResult, Resolution,
    ResolutionError,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the provider list is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// One provider at a time, in order; stop at the first valid result.
    #[default]
    Sequential,
    /// Ask every provider at once; keep whichever valid result lands first.
    Race,
}

pub struct Resolver {
    pub providers: Vec<Box<dyn Provider>>,
    pub policy: FallbackPolicy,
    pub attempt_timeout: Option<Duration>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            policy: FallbackPolicy::default(),
            attempt_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn register_provider(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
    }

    pub async fn resolve(&self, input: &str) -> Result<Resolution, ResolutionError> {
        self.resolve_request(&ParseRequest::new(input)).await
    }

    pub async fn resolve_request(
        &self,
        request: &ParseRequest,
    ) -> Result<Resolution, ResolutionError> {
        let url = request.effective_url().ok_or(ResolutionError::EmptyInput)?;
        if self.providers.is_empty() {
            return Err(ResolutionError::NoProviders);
        }

        info!("Resolving {} with {} providers", url, self.providers.len());

        match self.policy {
            FallbackPolicy::Sequential => self.resolve_sequential(url).await,
            FallbackPolicy::Race => self.resolve_race(url).await,
        }
    }

    async fn resolve_sequential(&self, url: &str) -> Result<Resolution, ResolutionError> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match self.attempt(provider.as_ref(), url).await {
                Ok(result) => return Ok(self.succeed(provider.name(), result, failures)),
                Err(error) => failures.push(record_failure(provider.name(), error)),
            }
        }

        Err(ResolutionError::Exhausted { failures })
    }

    async fn resolve_race(&self, url: &str) -> Result<Resolution, ResolutionError> {
        let mut pending: FuturesUnordered<_> = self
            .providers
            .iter()
            .map(|provider| async move {
                (provider.name(), self.attempt(provider.as_ref(), url).await)
            })
            .collect();

        let mut failures = Vec::new();
        while let Some((name, outcome)) = pending.next().await {
            match outcome {
                // Dropping `pending` on return cancels the slower attempts.
                Ok(result) => return Ok(self.succeed(name, result, failures)),
                Err(error) => failures.push(record_failure(name, error)),
            }
        }

        Err(ResolutionError::Exhausted { failures })
    }

    async fn attempt(
        &self,
        provider: &dyn Provider,
        url: &str,
    ) -> Result<ProviderResult, ProviderError> {
        debug!("Trying provider {}", provider.name());

        let raw = match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.fetch(url))
                .await
                .map_err(|_| ProviderError::Timeout(limit))??,
            None => provider.fetch(url).await?,
        };

        let result = provider.normalize(&raw)?;
        if !result.is_valid() {
            return Err(ProviderError::MissingMediaUrl);
        }
        Ok(result)
    }

    fn succeed(
        &self,
        provider: &str,
        result: ProviderResult,
        failures: Vec<ProviderFailure>,
    ) -> Resolution {
        info!(
            "Provider {} resolved the link after {} failed attempts",
            provider,
            failures.len()
        );
        Resolution {
            provider: provider.to_string(),
            result,
            failures,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

fn record_failure(provider: &str, error: ProviderError) -> ProviderFailure {
    warn!("Provider {} failed: {}", provider, error);
    ProviderFailure {
        provider: provider.to_string(),
        error,
    }
}
