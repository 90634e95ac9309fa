pub mod http;
pub mod shapes;

pub use http::{build_client, build_download_client, HttpProvider};
pub use shapes::{Avatar, ResponseShape};

use crate::config::{Config, ProviderConfig};
use crate::core::Resolver;
use anyhow::Result;
use std::time::Duration;

/// Built-in services, most reliable first.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "nxvav".to_string(),
            endpoint: "https://api.nxvav.cn/api/jiexi/".to_string(),
            param: "url".to_string(),
            shape: ResponseShape::FlatData,
        },
        ProviderConfig {
            name: "guiguiya".to_string(),
            endpoint: "https://api.guiguiya.com/api/video_qsy/juhe".to_string(),
            param: "url".to_string(),
            shape: ResponseShape::FlatData,
        },
        ProviderConfig {
            name: "xiaotuo".to_string(),
            endpoint: "https://gy.api.xiaotuo.net/jx".to_string(),
            param: "id".to_string(),
            shape: ResponseShape::MediaItems,
        },
        ProviderConfig {
            name: "xinyew".to_string(),
            endpoint: "https://api.xinyew.cn/api/douyinjx".to_string(),
            param: "url".to_string(),
            shape: ResponseShape::VideoData,
        },
    ]
}

/// Registers one `HttpProvider` per configured entry, in configured order.
pub fn resolver_from_config(config: &Config) -> Result<Resolver> {
    config.validate()?;
    let client = build_client(config)?;

    let mut resolver = Resolver::new().with_policy(config.policy);
    if let Some(secs) = config.attempt_timeout {
        resolver = resolver.with_attempt_timeout(Duration::from_secs(secs));
    }
    for provider in &config.providers {
        resolver.register_provider(Box::new(HttpProvider::new(provider, client.clone())));
    }
    Ok(resolver)
}
