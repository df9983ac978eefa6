//! Treasury yield, Fed rate expectations and traditional market quotes.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use super::logged;
use crate::adapter::outbound::finance::fred::{CPI_SERIES, TEN_YEAR_SERIES};
use crate::adapter::outbound::finance::yahoo::TEN_YEAR_SYMBOL;
use crate::adapter::outbound::finance::{Fred, Yahoo};
use crate::domain::financial::{
    FedWatchData, FinancialMarketData, Instrument, TreasuryData, FRED_KEY_LEVELS, YAHOO_KEY_LEVELS,
};
use crate::domain::inflation::InflationData;
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct FinancialService {
    fred: Fred,
    yahoo: Yahoo,
    clock: Arc<dyn Clock>,
    treasury: TtlCache<TreasuryData>,
    markets: TtlCache<FinancialMarketData>,
    inflation: TtlCache<InflationData>,
}

/// Monthly CPI readings requested: two years, enough for a year-ago value.
const CPI_MONTHS: usize = 24;

impl FinancialService {
    #[must_use]
    pub fn new(fred: Fred, yahoo: Yahoo, cache: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            fred,
            yahoo,
            treasury: TtlCache::new(CacheConfig::ttl(cache.treasury_secs), Arc::clone(&clock)),
            markets: TtlCache::new(CacheConfig::ttl(cache.financial_secs), Arc::clone(&clock)),
            inflation: TtlCache::new(CacheConfig::ttl(cache.inflation_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// US 10-year Treasury yield.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpstreamUnavailable`] when FRED and Yahoo both fail
    /// and nothing was ever cached.
    pub async fn treasury(&self) -> Result<TreasuryData> {
        if let Some(data) = self.treasury.get_fresh() {
            return Ok(data);
        }

        match self.fetch_treasury().await {
            Ok(data) => {
                info!(yield_pct = data.yield_pct, "Treasury yield refreshed");
                self.treasury.put(data.clone());
                Ok(data)
            }
            Err(err) => self.treasury.get_any().ok_or_else(|| {
                warn!(error = %err, "No Treasury data available");
                Error::UpstreamUnavailable(
                    "Unable to fetch Treasury data from any source".into(),
                )
            }),
        }
    }

    async fn fetch_treasury(&self) -> Result<TreasuryData> {
        let now = self.clock.now();
        let from_fred = self.fred.latest_pair(TEN_YEAR_SERIES).await.and_then(|(latest, prev)| {
            TreasuryData::from_observations(latest, prev, FRED_KEY_LEVELS, now)
                .ok_or_else(|| Error::invalid("fred", "non-positive yield"))
        });
        if let Ok(data) = logged("treasury", "fred", from_fred) {
            return Ok(data);
        }

        let from_yahoo = self.yahoo.meta(TEN_YEAR_SYMBOL).await.and_then(|meta| {
            let yield_pct = meta
                .regular_market_price
                .filter(|y| *y > 0.0)
                .ok_or_else(|| Error::invalid("yahoo", "missing regularMarketPrice"))?;
            Ok(TreasuryData::new(
                yield_pct,
                meta.change().unwrap_or(0.0),
                meta.change_percent().unwrap_or(0.0),
                YAHOO_KEY_LEVELS,
                now,
            ))
        });
        logged("treasury", "yahoo", from_yahoo)
    }

    /// US CPI inflation, year over year. `refresh` drops the cached value
    /// first. The fallback estimate is never cached.
    pub async fn inflation(&self, refresh: bool) -> InflationData {
        if refresh {
            self.inflation.clear();
        } else if let Some(data) = self.inflation.get_fresh() {
            return data;
        }

        let now = self.clock.now();
        let fetched = self
            .fred
            .observations(CPI_SERIES, CPI_MONTHS)
            .await
            .and_then(|observations| {
                let readings: Vec<Option<f64>> = observations.iter().map(|o| o.value).collect();
                InflationData::from_cpi(&readings, now)
                    .ok_or_else(|| Error::invalid("fred", "insufficient CPI observations"))
            });

        match logged("inflation", "fred", fetched) {
            Ok(data) => {
                info!(rate = data.rate, change = data.change, "Inflation refreshed");
                self.inflation.put(data.clone());
                data
            }
            Err(_) => self
                .inflation
                .get_any()
                .unwrap_or_else(|| InflationData::fallback(now)),
        }
    }

    /// Static rate-probability estimates stamped with the current time.
    #[must_use]
    pub fn fed_watch(&self) -> FedWatchData {
        FedWatchData::estimates(self.clock.now())
    }

    /// DXY, gold, S&P 500 and VIX. Missing instruments take their defaults.
    pub async fn markets(&self) -> FinancialMarketData {
        if let Some(data) = self.markets.get_fresh() {
            return data;
        }

        let metas = join_all(
            Instrument::ALL
                .iter()
                .map(|i| self.yahoo.meta(i.yahoo_symbol())),
        )
        .await;

        let mut quotes = [None; 4];
        for ((slot, instrument), meta) in quotes.iter_mut().zip(Instrument::ALL).zip(metas) {
            *slot = match meta {
                Ok(meta) => instrument.quote_from(&meta.quote_meta()),
                Err(err) => {
                    warn!(symbol = instrument.yahoo_symbol(), error = %err, "Quote unavailable");
                    None
                }
            };
        }

        let data = FinancialMarketData::assemble(quotes, self.clock.now());
        self.markets.put(data.clone());
        data
    }
}
