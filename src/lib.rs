pub mod cli;
pub mod config;
pub mod core;
pub mod providers;
pub mod utils;

pub use self::core::{
    Downloader, FallbackPolicy, ParseRequest, Provider, ProviderError, ProviderResult,
    Resolution, ResolutionError, Resolver,
};
pub use self::providers::{HttpProvider, ResponseShape};
