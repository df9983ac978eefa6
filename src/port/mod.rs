//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Services in the application layer depend on these traits rather than on
//! concrete adapters, so tests can substitute a manual clock or a scripted
//! completion provider.
//!
//! # Available Ports
//!
//! - [`Clock`] - Wall-clock source used by every TTL cache
//! - [`Llm`] - Chat completion providers (xAI Grok, OpenAI)

pub mod outbound;

pub use outbound::clock::{Clock, SystemClock};
pub use outbound::llm::Llm;
