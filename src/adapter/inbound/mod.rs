//! Inbound adapters (driving side): the JSON API and the command line.

pub mod cli;
pub mod http;
