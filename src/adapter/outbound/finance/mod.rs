//! Rates and traditional market quote providers.

pub mod fred;
pub mod yahoo;

pub use fred::Fred;
pub use yahoo::{ChartMeta, Yahoo};
