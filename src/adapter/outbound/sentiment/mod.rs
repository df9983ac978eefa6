//! News, social and crowd-mood sources feeding the sentiment reading.

pub mod coindesk;
pub mod coinpaprika;
pub mod fear_greed;
pub mod newsapi;
pub mod reddit;

pub use coindesk::CoinDeskRss;
pub use coinpaprika::CoinPaprika;
pub use fear_greed::FearGreed;
pub use newsapi::NewsApi;
pub use reddit::Reddit;
