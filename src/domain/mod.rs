//! Normalized data shapes and the pure computations behind them.
//!
//! Nothing here performs I/O. Adapters turn upstream payloads into these
//! types and services decide which of them to cache and serve.

pub mod chat;
pub mod congress;
pub mod dominance;
pub mod economy;
pub mod financial;
pub mod indicator;
pub mod inflation;
pub mod liquidity;
pub mod market;
pub mod options;
pub mod prediction;
pub mod sentiment;
pub mod whale;
