pub mod downloader;
pub mod error;
pub mod provider;
pub mod request;
pub mod resolver;
pub mod result;

pub use downloader::Downloader;
pub use error::{ProviderError, ProviderFailure, ResolutionError};
pub use provider::Provider;
pub use request::ParseRequest;
pub use resolver::{FallbackPolicy, Resolver};
pub use result::{ProviderResult, Resolution};
