//! Bitcoin Hub - market, macro and sentiment data for a Bitcoin dashboard.
//!
//! The crate serves a JSON API that aggregates a dozen third-party sources.
//! Every endpoint sits behind a TTL cache and an ordered chain of sources;
//! when all of them fail the last good value is served, and after that a
//! built-in default. Callers always get a well-formed payload.
//!
//! # Architecture
//!
//! - [`domain`] - Normalized data shapes and pure computations (indicators,
//!   sentiment aggregation, congressional trade summaries)
//! - [`port`] - Traits for the clock and completion providers
//! - [`adapter::outbound`] - One client per upstream API
//! - [`application`] - Services that run the fallback chains over caches
//! - [`adapter::inbound`] - The axum router and the CLI
//! - [`infrastructure`] - Caches, configuration, the shared HTTP client
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bitcoin_hub::application::AppState;
//! use bitcoin_hub::infrastructure::config::Config;
//! use bitcoin_hub::port::SystemClock;
//!
//! # async fn run() -> bitcoin_hub::error::Result<()> {
//! let config = Config::load_or_default("config.toml")?;
//! let state = Arc::new(AppState::from_config(&config, Arc::new(SystemClock)));
//! let price = state.market.price(false).await;
//! println!("{}", price.usd);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
