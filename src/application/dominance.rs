//! Bitcoin dominance and global crypto market metrics.

use std::sync::Arc;

use tracing::warn;

use crate::adapter::outbound::market::CoinGecko;
use crate::domain::dominance::{DominanceData, GlobalCryptoMetrics};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct DominanceService {
    coingecko: CoinGecko,
    clock: Arc<dyn Clock>,
    cache: TtlCache<DominanceData>,
}

impl DominanceService {
    #[must_use]
    pub fn new(coingecko: CoinGecko, cache: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            coingecko,
            cache: TtlCache::new(CacheConfig::ttl(cache.dominance_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// BTC share of total market cap. The fallback is cached like a live
    /// answer and marked through its `source`.
    pub async fn dominance(&self, refresh: bool) -> DominanceData {
        if refresh {
            self.cache.clear();
        } else if let Some(data) = self.cache.get_fresh() {
            return data;
        }

        let now = self.clock.now();
        let data = match self.coingecko.global().await {
            Ok(snapshot) => snapshot.dominance(now),
            Err(err) => {
                warn!(source = "coingecko", error = %err, "Dominance unavailable, using fallback");
                DominanceData::fallback(now)
            }
        };
        self.cache.put(data.clone());
        data
    }

    /// Uncached global market figures.
    pub async fn global_metrics(&self) -> GlobalCryptoMetrics {
        let now = self.clock.now();
        match self.coingecko.global().await {
            Ok(snapshot) => snapshot.metrics(now),
            Err(err) => {
                warn!(source = "coingecko", error = %err, "Global metrics unavailable, using fallback");
                GlobalCryptoMetrics::fallback(now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dominance::FALLBACK_SOURCE;
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock};
    use mockito::Server;

    fn service(base: &str) -> DominanceService {
        let config = testkit::config::at(base);
        let http = HttpFetcher::from_config(&config.http);
        DominanceService::new(
            CoinGecko::new(http, &config.upstream.coingecko_url, None),
            &config.cache,
            Arc::new(ManualClock::default()),
        )
    }

    #[tokio::test]
    async fn fallback_is_cached_until_refresh() {
        let mut server = Server::new_async().await;
        let svc = service(&server.url());

        let first = svc.dominance(false).await;
        assert_eq!(first.source, FALLBACK_SOURCE);
        assert_eq!(first.dominance, 63.5);

        let global = server
            .mock("GET", "/coingecko/global")
            .with_body(
                r#"{"data":{"total_market_cap":{"usd":3.0e12},"market_cap_percentage":{"btc":58.2}}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        assert_eq!(svc.dominance(false).await.source, FALLBACK_SOURCE);
        let live = svc.dominance(true).await;
        assert_eq!(live.dominance, 58.2);
        global.assert_async().await;
    }

    #[tokio::test]
    async fn metrics_fall_back_when_down() {
        let svc = service(testkit::config::DEAD_BASE);
        let metrics = svc.global_metrics().await;
        assert_eq!(metrics.active_cryptocurrencies, 2800);
    }
}
