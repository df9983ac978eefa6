//! Cache lifetimes per data domain.

use chrono::Duration;
use serde::Deserialize;

/// TTLs in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub price_secs: u64,
    pub chart_secs: u64,
    pub dominance_secs: u64,
    pub treasury_secs: u64,
    pub financial_secs: u64,
    pub congress_secs: u64,
    pub predictions_secs: u64,
    pub sentiment_secs: u64,
    pub economy_secs: u64,
    pub inflation_secs: u64,
    pub liquidity_secs: u64,
    pub whale_secs: u64,
    pub options_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            price_secs: 5 * 60,
            chart_secs: 60,
            dominance_secs: 5 * 60,
            treasury_secs: 2 * 60,
            financial_secs: 60,
            congress_secs: 30 * 60,
            predictions_secs: 15 * 60,
            sentiment_secs: 10 * 60,
            economy_secs: 24 * 60 * 60,
            inflation_secs: 60 * 60,
            liquidity_secs: 10 * 60,
            whale_secs: 2 * 60,
            options_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    /// Convert a seconds field to a [`Duration`].
    #[must_use]
    pub fn ttl(secs: u64) -> Duration {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
        Duration::seconds(secs)
    }

    pub(crate) fn fields(&self) -> [(&'static str, u64); 13] {
        [
            ("cache.price_secs", self.price_secs),
            ("cache.chart_secs", self.chart_secs),
            ("cache.dominance_secs", self.dominance_secs),
            ("cache.treasury_secs", self.treasury_secs),
            ("cache.financial_secs", self.financial_secs),
            ("cache.congress_secs", self.congress_secs),
            ("cache.predictions_secs", self.predictions_secs),
            ("cache.sentiment_secs", self.sentiment_secs),
            ("cache.economy_secs", self.economy_secs),
            ("cache.inflation_secs", self.inflation_secs),
            ("cache.liquidity_secs", self.liquidity_secs),
            ("cache.whale_secs", self.whale_secs),
            ("cache.options_secs", self.options_secs),
        ]
    }
}
