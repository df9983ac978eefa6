//! Whale transfer alerts from the mempool.

use std::sync::Arc;

use tracing::{info, warn};

use super::market::MarketService;
use crate::adapter::outbound::blockchain::Blockchain;
use crate::domain::whale::WhaleAlerts;
use crate::error::Result;
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct WhaleService {
    blockchain: Blockchain,
    market: Arc<MarketService>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<WhaleAlerts>,
}

impl WhaleService {
    #[must_use]
    pub fn new(
        blockchain: Blockchain,
        market: Arc<MarketService>,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            blockchain,
            market,
            cache: TtlCache::new(CacheConfig::ttl(cache.whale_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Transfers of 100 BTC or more valued at the current price.
    ///
    /// # Errors
    ///
    /// Returns the explorer's error when the mempool cannot be read and no
    /// earlier snapshot is cached.
    pub async fn alerts(&self) -> Result<WhaleAlerts> {
        if let Some(data) = self.cache.get_fresh() {
            return Ok(data);
        }

        let (price, mempool) =
            futures_util::join!(self.market.price(false), self.blockchain.unconfirmed());
        match mempool {
            Ok(txs) => {
                let data = WhaleAlerts::from_mempool(&txs, price.usd, self.clock.now());
                info!(
                    scanned = txs.len(),
                    whales = data.transactions.len(),
                    "Whale alerts refreshed"
                );
                self.cache.put(data.clone());
                Ok(data)
            }
            Err(err) => {
                warn!(source = "blockchain.com", error = %err, "Mempool unavailable");
                self.cache.get_any().ok_or(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppState;
    use crate::error::Error;
    use crate::testkit::{self, clock::ManualClock};
    use chrono::Duration;
    use mockito::{Matcher, Server};

    fn state(base: &str, clock: Arc<ManualClock>) -> AppState {
        AppState::with_llms(&testkit::config::at(base), clock, None, None)
    }

    #[tokio::test]
    async fn whales_are_valued_at_current_price() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/cryptocompare/price")
            .match_query(Matcher::Any)
            .with_body(r#"{"USD":100000.0}"#)
            .create_async()
            .await;
        let mempool = server
            .mock("GET", "/blockchain/unconfirmed-transactions")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"txs":[{"hash":"big","time":1700000000,"out":[{"addr":"x","value":50000000000}]},
                {"hash":"tiny","time":1700000001,"out":[{"value":1000}]}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let state = state(&server.url(), Arc::new(ManualClock::default()));
        let alerts = state.whales.alerts().await.unwrap();
        assert_eq!(alerts.transactions.len(), 1);
        assert_eq!(alerts.transactions[0].amount, 500.0);
        assert_eq!(alerts.transactions[0].amount_usd, 50_000_000.0);
        assert_eq!(alerts.current_price, 100_000.0);

        state.whales.alerts().await.unwrap();
        mempool.assert_async().await;
    }

    #[tokio::test]
    async fn stale_alerts_outlive_the_explorer() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/blockchain/unconfirmed-transactions")
            .match_query(Matcher::Any)
            .with_body(r#"{"txs":[]}"#)
            .create_async()
            .await;

        let clock = Arc::new(ManualClock::default());
        let state = state(&server.url(), clock.clone());
        let first = state.whales.alerts().await.unwrap();
        assert!(first.transactions.is_empty());

        server.reset_async().await;
        clock.advance(Duration::minutes(3));
        assert_eq!(state.whales.alerts().await.unwrap(), first);
    }

    #[tokio::test]
    async fn explorer_down_without_cache_is_an_error() {
        let state = state(testkit::config::DEAD_BASE, Arc::new(ManualClock::default()));
        let err = state.whales.alerts().await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
