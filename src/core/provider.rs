use crate::core::{ProviderError, ProviderResult};
use async_trait::async_trait;
use serde_json::Value;

/// A third-party parse endpoint.
///
/// `fetch` does the network round trip and `normalize` maps the raw body to
/// a `ProviderResult`; keeping them apart lets the mapping stay pure.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, url: &str) -> Result<Value, ProviderError>;
    fn normalize(&self, raw: &Value) -> Result<ProviderResult, ProviderError>;
}
