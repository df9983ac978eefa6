//! Bitcoin market data providers.
//!
//! Each provider can answer spot price, market overview and chart
//! requests; services try them in order.

pub mod coincap;
pub mod coingecko;
pub mod cryptocompare;

pub use coincap::CoinCap;
pub use coingecko::CoinGecko;
pub use cryptocompare::CryptoCompare;
