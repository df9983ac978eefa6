//! Application services (use cases).
//!
//! Each service walks a fallback chain: fresh cache, then each upstream in
//! order, then the stale cache, then a hardcoded default. Every failed step
//! is logged with its source and the chain moves on.

pub mod chat;
pub mod congress;
pub mod dominance;
pub mod economy;
pub mod financial;
pub mod liquidity;
pub mod market;
pub mod options;
pub mod prediction;
pub mod sentiment;
pub mod state;
pub mod whale;

pub use state::AppState;

use tracing::warn;

use crate::error::Result;

/// Pass a chain step's result through, logging it when it failed.
fn logged<T>(what: &'static str, source: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(source, error = %err, "{what} unavailable, trying next source");
    }
    result
}
