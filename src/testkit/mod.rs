//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - [`ManualClock`](clock::ManualClock), advanced by hand to
//!   expire cache entries.
//! - [`llm`] - [`ScriptedLlm`](llm::ScriptedLlm), replays canned replies.
//! - [`config`] - Configurations pointing every upstream at a mock server.

pub mod clock;
pub mod config;
pub mod llm;
