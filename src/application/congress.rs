//! Congressional stock trades with a crypto-relevance summary.

use std::sync::Arc;

use tracing::{info, warn};

use super::logged;
use crate::adapter::outbound::disclosure::{Finnhub, Fmp, HouseStockWatcher, SenateStockWatcher};
use crate::domain::congress::{summarize, CongressionalTrade, HouseStockData};
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct CongressService {
    house: HouseStockWatcher,
    finnhub: Finnhub,
    fmp: Fmp,
    senate: SenateStockWatcher,
    clock: Arc<dyn Clock>,
    cache: TtlCache<HouseStockData>,
}

impl CongressService {
    #[must_use]
    pub fn new(
        house: HouseStockWatcher,
        finnhub: Finnhub,
        fmp: Fmp,
        senate: SenateStockWatcher,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            house,
            finnhub,
            fmp,
            senate,
            cache: TtlCache::new(CacheConfig::ttl(cache.congress_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Trade summary from the first disclosure source that returns trades.
    pub async fn trades(&self) -> HouseStockData {
        if let Some(data) = self.cache.get_fresh() {
            return data;
        }

        let now = self.clock.now();
        match self.fetch_trades().await {
            Ok(trades) => {
                let data = summarize(trades, false, now);
                info!(
                    total = data.total_trades,
                    crypto = data.crypto_trades.len(),
                    "Congressional trades refreshed"
                );
                self.cache.put(data.clone());
                data
            }
            Err(err) => self.cache.get_any().unwrap_or_else(|| {
                warn!(error = %err, "No congressional trading source available");
                HouseStockData::empty(now)
            }),
        }
    }

    async fn fetch_trades(&self) -> Result<Vec<CongressionalTrade>> {
        let house = non_empty(self.house.trades().await);
        if let Ok(trades) = logged("congressional trades", "house-stock-watcher", house) {
            return Ok(trades);
        }
        let finnhub = non_empty(self.finnhub.trades().await);
        if let Ok(trades) = logged("congressional trades", "finnhub", finnhub) {
            return Ok(trades);
        }
        let fmp = non_empty(self.fmp.trades().await);
        if let Ok(trades) = logged("congressional trades", "fmp", fmp) {
            return Ok(trades);
        }
        let senate = non_empty(self.senate.trades().await);
        logged("congressional trades", "senate-stock-watcher", senate)
    }
}

fn non_empty(result: Result<Vec<CongressionalTrade>>) -> Result<Vec<CongressionalTrade>> {
    match result {
        Ok(trades) if trades.is_empty() => Err(Error::invalid("congress", "no trades")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock};
    use mockito::Server;

    fn service(base: &str) -> CongressService {
        let config = testkit::config::at(base);
        let http = HttpFetcher::from_config(&config.http);
        let up = &config.upstream;
        CongressService::new(
            HouseStockWatcher::new(http.clone(), &up.house_stock_watcher_url),
            Finnhub::new(http.clone(), &up.finnhub_url, config.keys.finnhub.clone()),
            Fmp::new(http.clone(), &up.fmp_url, config.keys.fmp.clone()),
            SenateStockWatcher::new(http, &up.senate_stock_watcher_url),
            &config.cache,
            Arc::new(ManualClock::default()),
        )
    }

    #[tokio::test]
    async fn empty_summary_when_every_source_fails() {
        let data = service(testkit::config::DEAD_BASE).trades().await;
        assert_eq!(data.total_trades, 0);
        assert!(!data.fallback_data);
        assert!(data.crypto_trades.is_empty());
    }

    #[tokio::test]
    async fn senate_file_is_last_resort_and_cached() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/house/all_transactions.json")
            .with_body("[]")
            .create_async()
            .await;
        let senate = server
            .mock("GET", "/senate/all_transactions.json")
            .with_body(
                r#"[{"senator":"Jane Roe","transaction_date":"05/20/2025","ticker":"COIN",
                "asset_description":"Coinbase Global Inc","type":"Purchase",
                "amount":"$15,001 - $50,000","owner":"Self","ptr_link":"https://s.test/1"}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let svc = service(&server.url());
        let data = svc.trades().await;
        assert_eq!(data.total_trades, 1);
        assert_eq!(data.crypto_trades.len(), 1);
        assert_eq!(svc.trades().await, data);
        senate.assert_async().await;
    }
}
