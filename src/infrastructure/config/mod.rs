//! Infrastructure configuration modules.

pub mod cache;
pub mod http;
pub mod llm;
pub mod logging;
pub mod server;
pub mod settings;
pub mod upstream;

pub use cache::CacheConfig;
pub use http::HttpConfig;
pub use llm::{LlmConfig, ProviderConfig};
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use settings::{ApiKeys, Config};
pub use upstream::UpstreamConfig;
