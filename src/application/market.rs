//! Bitcoin price, market overview and price charts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::logged;
use crate::adapter::outbound::market::{CoinCap, CoinGecko, CryptoCompare};
use crate::domain::market::{
    synthetic_series, BitcoinMarketData, BitcoinPrice, ChartPoint, Timeframe, FALLBACK_PRICE,
};
use crate::error::{Error, Result};
use crate::infrastructure::cache::{KeyedTtlCache, TtlCache};
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

/// Price, overview and chart service over CryptoCompare, CoinGecko and
/// CoinCap.
pub struct MarketService {
    cryptocompare: CryptoCompare,
    coingecko: CoinGecko,
    coincap: CoinCap,
    clock: Arc<dyn Clock>,
    price: TtlCache<BitcoinPrice>,
    market_data: TtlCache<BitcoinMarketData>,
    charts: KeyedTtlCache<Timeframe, Vec<ChartPoint>>,
}

impl MarketService {
    #[must_use]
    pub fn new(
        cryptocompare: CryptoCompare,
        coingecko: CoinGecko,
        coincap: CoinCap,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let quote_ttl = CacheConfig::ttl(cache.price_secs);
        Self {
            cryptocompare,
            coingecko,
            coincap,
            price: TtlCache::new(quote_ttl, Arc::clone(&clock)),
            market_data: TtlCache::new(quote_ttl, Arc::clone(&clock)),
            charts: KeyedTtlCache::new(CacheConfig::ttl(cache.chart_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Current price with 24h change. Never fails.
    pub async fn price(&self, refresh: bool) -> BitcoinPrice {
        if refresh {
            self.price.clear();
        } else if let Some(price) = self.price.get_fresh() {
            return price;
        }

        let now = self.clock.now();
        match self.fetch_price(now).await {
            Ok(price) => {
                self.price.put(price.clone());
                price
            }
            Err(err) => self.price.get_any().unwrap_or_else(|| {
                warn!(error = %err, "Serving fallback Bitcoin price");
                BitcoinPrice::fallback(now)
            }),
        }
    }

    async fn fetch_price(&self, now: DateTime<Utc>) -> Result<BitcoinPrice> {
        if let Ok(price) = logged("price", "cryptocompare", self.cryptocompare.price(now).await) {
            return Ok(price);
        }
        if let Ok(price) = logged("price", "coingecko", self.coingecko.simple_price(now).await) {
            return Ok(price);
        }
        logged("price", "coincap", self.coincap.price(now).await)
    }

    /// Market overview. Never fails.
    pub async fn market_data(&self, refresh: bool) -> BitcoinMarketData {
        if refresh {
            self.market_data.clear();
        } else if let Some(data) = self.market_data.get_fresh() {
            return data;
        }

        match self.fetch_market_data().await {
            Ok(data) => {
                self.market_data.put(data.clone());
                data
            }
            Err(err) => self.market_data.get_any().unwrap_or_else(|| {
                warn!(error = %err, "Serving fallback market data");
                BitcoinMarketData::fallback()
            }),
        }
    }

    async fn fetch_market_data(&self) -> Result<BitcoinMarketData> {
        let result = self.cryptocompare.market_data().await;
        if let Ok(data) = logged("market data", "cryptocompare", result) {
            return Ok(data);
        }
        if let Ok(data) = logged("market data", "coingecko", self.coingecko.market_data().await) {
            return Ok(data);
        }
        logged("market data", "coincap", self.coincap.market_data().await)
    }

    /// Price series for a timeframe. Falls back to a synthetic series around
    /// the last known price, which is cached like real data.
    pub async fn chart(&self, timeframe: Timeframe, refresh: bool) -> Vec<ChartPoint> {
        if refresh {
            self.charts.remove(&timeframe);
        } else if let Some(points) = self.charts.get_fresh(&timeframe) {
            return points;
        }

        let now = self.clock.now();
        match self.fetch_chart(timeframe, now).await {
            Ok(points) => {
                info!(timeframe = %timeframe, points = points.len(), "Chart refreshed");
                self.charts.put(timeframe, points.clone());
                points
            }
            Err(err) => {
                if let Some(points) = self.charts.get_any(&timeframe) {
                    return points;
                }
                warn!(timeframe = %timeframe, error = %err, "Serving synthetic chart");
                let base = self.last_known_price();
                let points = synthetic_series(timeframe, base, now, &mut rand::thread_rng());
                self.charts.put(timeframe, points.clone());
                points
            }
        }
    }

    async fn fetch_chart(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let result = non_empty(self.cryptocompare.chart(timeframe).await);
        if let Ok(points) = logged("chart", "cryptocompare", result) {
            return Ok(points);
        }
        let result = non_empty(self.coingecko.chart(timeframe, now).await);
        if let Ok(points) = logged("chart", "coingecko", result) {
            return Ok(points);
        }
        logged("chart", "coincap", non_empty(self.coincap.chart(timeframe, now).await))
    }

    fn last_known_price(&self) -> f64 {
        self.market_data
            .get_any()
            .map(|m| m.current_price.usd)
            .or_else(|| self.price.get_any().map(|p| p.usd))
            .unwrap_or(FALLBACK_PRICE)
    }
}

fn non_empty(result: Result<Vec<ChartPoint>>) -> Result<Vec<ChartPoint>> {
    match result {
        Ok(points) if points.is_empty() => Err(Error::invalid("chart", "no points")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{FALLBACK_CHANGE_24H, FALLBACK_PRICE};
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock};
    use chrono::Duration;
    use mockito::{Matcher, Server};

    fn service(base: &str, clock: Arc<ManualClock>) -> MarketService {
        let config = testkit::config::at(base);
        let http = HttpFetcher::from_config(&config.http);
        let up = &config.upstream;
        MarketService::new(
            CryptoCompare::new(http.clone(), &up.cryptocompare_url),
            CoinGecko::new(http.clone(), &up.coingecko_url, None),
            CoinCap::new(http, &up.coincap_url),
            &config.cache,
            clock,
        )
    }

    #[tokio::test]
    async fn price_falls_back_when_every_source_is_down() {
        let clock = Arc::new(ManualClock::default());
        let svc = service(testkit::config::DEAD_BASE, clock.clone());
        let price = svc.price(false).await;
        assert_eq!(price.usd, FALLBACK_PRICE);
        assert_eq!(price.usd_24h_change, FALLBACK_CHANGE_24H);
        assert_eq!(price.last_updated_at, clock.now().timestamp());
    }

    #[tokio::test]
    async fn price_uses_coingecko_after_cryptocompare_fails_and_caches_it() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/cryptocompare/price")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let gecko = server
            .mock("GET", "/coingecko/simple/price")
            .match_query(Matcher::Any)
            .with_body(r#"{"bitcoin":{"usd":65000.0,"usd_24h_change":-1.2,"last_updated_at":1}}"#)
            .expect(1)
            .create_async()
            .await;

        let svc = service(&server.url(), Arc::new(ManualClock::default()));
        assert_eq!(svc.price(false).await.usd, 65000.0);
        assert_eq!(svc.price(false).await.usd, 65000.0);
        gecko.assert_async().await;
    }

    #[tokio::test]
    async fn expired_price_is_served_stale_when_upstreams_fail() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/cryptocompare/price")
            .match_query(Matcher::Any)
            .with_body(r#"{"USD":70000.5}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/cryptocompare/pricemultifull")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let clock = Arc::new(ManualClock::default());
        let svc = service(&server.url(), clock.clone());
        assert_eq!(svc.price(false).await.usd, 70000.5);

        server.reset_async().await;
        clock.advance(Duration::minutes(6));
        assert_eq!(svc.price(false).await.usd, 70000.5);
    }

    #[tokio::test]
    async fn synthetic_chart_is_cached() {
        let clock = Arc::new(ManualClock::default());
        let svc = service(testkit::config::DEAD_BASE, clock);
        let first = svc.chart(Timeframe::Week, false).await;
        assert_eq!(first.len(), 7);
        assert!(first.iter().all(|p| p.price > 0.0));
        let second = svc.chart(Timeframe::Week, false).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn market_data_fallback_when_down() {
        let svc = service(testkit::config::DEAD_BASE, Arc::new(ManualClock::default()));
        assert_eq!(svc.market_data(true).await, BitcoinMarketData::fallback());
    }
}
