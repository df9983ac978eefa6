//! World Bank economic indicators.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::adapter::outbound::worldbank::WorldBank;
use crate::domain::economy::{
    format_indicator, time_series, DataPoint, EconomicIndicator, GlobalEconomicData,
    IndicatorSpec, SeriesPoint, DASHBOARD_YEARS, GLOBAL_INDICATORS, US, US_INDICATORS, WORLD,
};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

/// Observations requested for a single indicator when no count is given.
pub const DEFAULT_INDICATOR_YEARS: u32 = 10;
/// Observations requested for a time series when no count is given.
pub const DEFAULT_SERIES_YEARS: u32 = 20;

pub struct EconomyService {
    worldbank: WorldBank,
    clock: Arc<dyn Clock>,
    dashboard: TtlCache<GlobalEconomicData>,
}

impl EconomyService {
    #[must_use]
    pub fn new(worldbank: WorldBank, cache: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            worldbank,
            dashboard: TtlCache::new(CacheConfig::ttl(cache.economy_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Observations, or an empty list when the request fails.
    async fn observations(&self, country: &str, indicator: &str, years: u32) -> Vec<DataPoint> {
        match self.worldbank.observations(country, indicator, years).await {
            Ok(points) => points,
            Err(err) => {
                warn!(country, indicator, error = %err, "World Bank request failed");
                Vec::new()
            }
        }
    }

    async fn indicators(
        &self,
        country: &str,
        wanted: &[IndicatorSpec],
    ) -> Vec<Option<EconomicIndicator>> {
        join_all(wanted.iter().map(|ind| async move {
            let points = self.observations(country, ind.code, DASHBOARD_YEARS).await;
            format_indicator(points, ind.name, ind.description)
        }))
        .await
    }

    /// US and world dashboard indicators.
    pub async fn dashboard(&self) -> GlobalEconomicData {
        if let Some(data) = self.dashboard.get_fresh() {
            return data;
        }

        let (us, global) = futures_util::join!(
            self.indicators(US, &US_INDICATORS),
            self.indicators(WORLD, &GLOBAL_INDICATORS)
        );
        let data = GlobalEconomicData::assemble(us, global, self.clock.now());
        debug!(
            us = data.us_indicators.len(),
            global = data.global_indicators.len(),
            "Economic dashboard assembled"
        );
        self.dashboard.put(data.clone());
        data
    }

    /// Latest value of one indicator, `None` without data.
    pub async fn indicator(
        &self,
        country: &str,
        indicator: &str,
        years: Option<u32>,
    ) -> Option<EconomicIndicator> {
        let years = years.unwrap_or(DEFAULT_INDICATOR_YEARS);
        let points = self.observations(country, indicator, years).await;
        format_indicator(
            points,
            &format!("{country} {indicator}"),
            &format!("Economic indicator {indicator} for {country}"),
        )
    }

    /// Observations ordered by ascending year.
    pub async fn time_series(
        &self,
        country: &str,
        indicator: &str,
        years: Option<u32>,
    ) -> Vec<SeriesPoint> {
        let years = years.unwrap_or(DEFAULT_SERIES_YEARS);
        time_series(self.observations(country, indicator, years).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock};
    use mockito::{Matcher, Server};

    fn service(base: &str) -> EconomyService {
        let config = testkit::config::at(base);
        EconomyService::new(
            WorldBank::new(HttpFetcher::from_config(&config.http), &config.upstream.worldbank_url),
            &config.cache,
            Arc::new(ManualClock::default()),
        )
    }

    const GDP: &str = r#"[{"page":1},[
        {"indicator":{"id":"NY.GDP.MKTP.CD","value":"GDP"},"date":"2023","value":27.0e12,"unit":""},
        {"indicator":{"id":"NY.GDP.MKTP.CD","value":"GDP"},"date":"2022","value":25.0e12,"unit":""},
        {"indicator":{"id":"NY.GDP.MKTP.CD","value":"GDP"},"date":"2021","value":null,"unit":""}]]"#;

    #[tokio::test]
    async fn dashboard_skips_failed_indicators() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/worldbank/country/USA/indicator/NY.GDP.MKTP.CD")
            .match_query(Matcher::Any)
            .with_body(GDP)
            .create_async()
            .await;

        let data = service(&server.url()).dashboard().await;
        assert_eq!(data.us_indicators.len(), 1);
        assert!(data.global_indicators.is_empty());
        let gdp = data.key_metrics.usgdp.unwrap();
        assert_eq!(gdp.unit, "USD");
        assert!((gdp.change.unwrap() - 8.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn series_is_ascending_and_indicator_is_named() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/worldbank/country/USA/indicator/NY.GDP.MKTP.CD")
            .match_query(Matcher::Any)
            .with_body(GDP)
            .expect(2)
            .create_async()
            .await;

        let svc = service(&server.url());
        let series = svc.time_series("USA", "NY.GDP.MKTP.CD", None).await;
        assert_eq!(series.iter().map(|p| p.date.as_str()).collect::<Vec<_>>(), ["2022", "2023"]);

        let indicator = svc.indicator("USA", "NY.GDP.MKTP.CD", Some(5)).await.unwrap();
        assert_eq!(indicator.name, "USA NY.GDP.MKTP.CD");
    }

    #[tokio::test]
    async fn missing_indicator_is_none() {
        let svc = service(testkit::config::DEAD_BASE);
        assert!(svc.indicator("USA", "XX.NOPE", None).await.is_none());
        assert!(svc.time_series("USA", "XX.NOPE", None).await.is_empty());
    }
}
