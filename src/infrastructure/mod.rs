//! Infrastructure layer.
//!
//! Technical concerns that support the services without containing any
//! data-domain logic.
//!
//! # Submodules
//!
//! - [`cache`] - TTL caches with an injected clock
//! - [`config`] - Configuration loading and validation
//! - [`http`] - Shared outbound HTTP client

pub mod cache;
pub mod config;
pub mod http;
