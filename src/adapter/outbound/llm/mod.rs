//! LLM adapter modules.
//!
//! Provides the [`Llm`](crate::port::outbound::llm::Llm) implementation for
//! OpenAI-compatible chat completion APIs (xAI Grok and OpenAI).

pub mod openai;

pub use openai::ChatCompletions;
