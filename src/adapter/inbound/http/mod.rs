//! JSON API served with axum.

mod error;
mod handlers;
mod server;

pub use error::ApiError;
pub use server::{router, serve};
