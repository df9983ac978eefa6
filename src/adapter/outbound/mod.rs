//! Outbound adapters (driven side): one client per third-party API.

pub mod blockchain;
pub mod deribit;
pub mod disclosure;
pub mod finance;
pub mod llm;
pub mod market;
pub mod sentiment;
pub mod worldbank;
