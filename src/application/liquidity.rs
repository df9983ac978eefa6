//! FRED money supply and balance sheet tracker.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::adapter::outbound::finance::Fred;
use crate::domain::liquidity::{
    LiquidityData, LiquidityIndicator, LiquiditySeries, YoyReading, LIQUIDITY_SERIES,
};
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct LiquidityService {
    fred: Fred,
    clock: Arc<dyn Clock>,
    cache: TtlCache<LiquidityData>,
}

impl LiquidityService {
    #[must_use]
    pub fn new(fred: Fred, cache: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            fred,
            cache: TtlCache::new(CacheConfig::ttl(cache.liquidity_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Every tracked series that has a year-over-year reading, plus the
    /// derived metrics and overall signal.
    ///
    /// Series are fetched concurrently and a failed one is left out. When
    /// none succeed the last good snapshot is served, else an empty one.
    pub async fn liquidity(&self) -> LiquidityData {
        if let Some(data) = self.cache.get_fresh() {
            return data;
        }

        let results = join_all(LIQUIDITY_SERIES.iter().map(|s| self.indicator(s))).await;
        let indicators: Vec<LiquidityIndicator> = results
            .into_iter()
            .zip(LIQUIDITY_SERIES.iter())
            .filter_map(|(result, series)| match result {
                Ok(indicator) => Some(indicator),
                Err(err) => {
                    warn!(series = series.series_id, error = %err, "Liquidity series unavailable");
                    None
                }
            })
            .collect();

        let now = self.clock.now();
        if indicators.is_empty() {
            warn!("No liquidity series available");
            return self.cache.get_any().unwrap_or_else(|| LiquidityData::empty(now));
        }

        let data = LiquidityData::assemble(indicators, now);
        info!(
            indicators = data.summary.total_indicators,
            derived = data.derived_metrics.len(),
            anomalies = data.summary.anomaly_count,
            "Liquidity data refreshed"
        );
        self.cache.put(data.clone());
        data
    }

    async fn indicator(&self, series: &LiquiditySeries) -> Result<LiquidityIndicator> {
        let observations = self
            .fred
            .observations(series.series_id, series.frequency.observation_limit())
            .await?;
        let points: Vec<(NaiveDate, f64)> = observations
            .iter()
            .filter_map(|o| {
                let date = NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").ok()?;
                Some((date, o.value?))
            })
            .collect();
        let reading = YoyReading::pick(&points, series.frequency)
            .ok_or_else(|| Error::invalid("fred", "no year-over-year comparator"))?;
        Ok(LiquidityIndicator::new(series, reading))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::Sentiment;
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock};
    use chrono::Duration;
    use mockito::{Matcher, Server, ServerGuard};

    fn service(base: &str, clock: Arc<ManualClock>) -> LiquidityService {
        let config = testkit::config::at(base);
        let http = HttpFetcher::from_config(&config.http);
        LiquidityService::new(
            Fred::new(http, &config.upstream.fred_url, None),
            &config.cache,
            clock,
        )
    }

    async fn series(server: &mut ServerGuard, id: &str, latest: &str, year_ago: &str) {
        server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::UrlEncoded("series_id".into(), id.into()))
            .with_body(format!(
                r#"{{"observations":[{{"date":"2025-05-01","value":"{latest}"}},
                {{"date":"2024-11-01","value":"."}},
                {{"date":"2024-05-01","value":"{year_ago}"}}]}}"#
            ))
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn partial_series_still_assemble() {
        let mut server = Server::new_async().await;
        series(&mut server, "M2SL", "21900", "21000").await;
        series(&mut server, "WALCL", "6700000", "7000000").await;
        series(&mut server, "WTREGEN", "800000", "700000").await;
        series(&mut server, "RRPONTSYD", "200", "400").await;
        server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let data = service(&server.url(), Arc::new(ManualClock::default()))
            .liquidity()
            .await;
        assert_eq!(data.summary.total_indicators, 4);
        assert_eq!(data.indicators[0].series_id, "M2SL");
        assert_eq!(data.derived_metrics[0].id, "net_liquidity");
        assert_eq!(data.summary.overall_signal, Sentiment::Bullish);
    }

    #[tokio::test]
    async fn stale_snapshot_beats_empty() {
        let mut server = Server::new_async().await;
        series(&mut server, "M2SL", "21900", "21000").await;
        server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let clock = Arc::new(ManualClock::default());
        let svc = service(&server.url(), clock.clone());
        let first = svc.liquidity().await;
        assert_eq!(first.summary.total_indicators, 1);

        server.reset_async().await;
        server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        clock.advance(Duration::minutes(11));
        assert_eq!(svc.liquidity().await, first);
    }

    #[tokio::test]
    async fn nothing_available_is_empty() {
        let data = service(testkit::config::DEAD_BASE, Arc::new(ManualClock::default()))
            .liquidity()
            .await;
        assert!(data.indicators.is_empty());
        assert_eq!(data.summary.overall_signal, Sentiment::Neutral);
    }
}
