//! Bitcoin dominance and global crypto market metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SOURCE: &str = "CoinGecko Global";
pub const FALLBACK_SOURCE: &str = "CoinGecko Global (Fallback)";

const FALLBACK_DOMINANCE: f64 = 63.5;
const FALLBACK_TOTAL_CAP: f64 = 3_600_000_000_000.0;
const FALLBACK_TOTAL_VOLUME: f64 = 180_000_000_000.0;
const FALLBACK_ETH_DOMINANCE: f64 = 12.8;
const FALLBACK_ACTIVE: u64 = 2800;

/// Bitcoin's share of total crypto market capitalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceData {
    pub dominance: f64,
    pub total_market_cap: f64,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

impl DominanceData {
    #[must_use]
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            dominance: FALLBACK_DOMINANCE,
            total_market_cap: FALLBACK_TOTAL_CAP,
            last_updated: now,
            source: FALLBACK_SOURCE.into(),
        }
    }
}

/// Whole-market totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCryptoMetrics {
    pub total_market_cap: f64,
    #[serde(rename = "total24hVolume")]
    pub total_24h_volume: f64,
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    pub active_cryptocurrencies: u64,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

impl GlobalCryptoMetrics {
    #[must_use]
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            total_market_cap: FALLBACK_TOTAL_CAP,
            total_24h_volume: FALLBACK_TOTAL_VOLUME,
            btc_dominance: FALLBACK_DOMINANCE,
            eth_dominance: FALLBACK_ETH_DOMINANCE,
            active_cryptocurrencies: FALLBACK_ACTIVE,
            last_updated: now,
            source: FALLBACK_SOURCE.into(),
        }
    }
}

/// Provider-neutral snapshot of the global endpoint. Missing fields are
/// filled from the fallback figures when converting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSnapshot {
    pub total_market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub btc_dominance: Option<f64>,
    pub eth_dominance: Option<f64>,
    pub active_cryptocurrencies: Option<u64>,
}

impl GlobalSnapshot {
    #[must_use]
    pub fn dominance(&self, now: DateTime<Utc>) -> DominanceData {
        DominanceData {
            dominance: positive_or(self.btc_dominance, FALLBACK_DOMINANCE),
            total_market_cap: positive_or(self.total_market_cap, FALLBACK_TOTAL_CAP),
            last_updated: now,
            source: SOURCE.into(),
        }
    }

    #[must_use]
    pub fn metrics(&self, now: DateTime<Utc>) -> GlobalCryptoMetrics {
        GlobalCryptoMetrics {
            total_market_cap: positive_or(self.total_market_cap, FALLBACK_TOTAL_CAP),
            total_24h_volume: positive_or(self.total_volume, FALLBACK_TOTAL_VOLUME),
            btc_dominance: positive_or(self.btc_dominance, FALLBACK_DOMINANCE),
            eth_dominance: positive_or(self.eth_dominance, FALLBACK_ETH_DOMINANCE),
            active_cryptocurrencies: self
                .active_cryptocurrencies
                .filter(|n| *n > 0)
                .unwrap_or(FALLBACK_ACTIVE),
            last_updated: now,
            source: SOURCE.into(),
        }
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_gaps_use_fallback_figures() {
        let snapshot = GlobalSnapshot {
            btc_dominance: Some(58.2),
            ..GlobalSnapshot::default()
        };
        let data = snapshot.dominance(Utc::now());
        assert_eq!(data.dominance, 58.2);
        assert_eq!(data.total_market_cap, 3_600_000_000_000.0);
        assert_eq!(data.source, SOURCE);
    }

    #[test]
    fn metrics_serialize_with_frontend_names() {
        let json = serde_json::to_value(GlobalCryptoMetrics::fallback(Utc::now())).unwrap();
        assert_eq!(json["total24hVolume"], 180_000_000_000.0);
        assert_eq!(json["activeCryptocurrencies"], 2800);
        assert_eq!(json["source"], FALLBACK_SOURCE);
    }

    #[test]
    fn zero_dominance_is_treated_as_missing() {
        let snapshot = GlobalSnapshot {
            btc_dominance: Some(0.0),
            ..GlobalSnapshot::default()
        };
        assert_eq!(snapshot.metrics(Utc::now()).btc_dominance, 63.5);
    }
}
