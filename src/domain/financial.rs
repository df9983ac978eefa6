//! Treasury yield, Fed rate outlook and traditional market quotes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 10-year Treasury yield snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryData {
    #[serde(rename = "yield")]
    pub yield_pct: f64,
    pub change: f64,
    pub percent_change: f64,
    pub key_levels: KeyLevels,
    pub last_updated: DateTime<Utc>,
}

/// 52-week range around the current yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLevels {
    pub low52_week: f64,
    pub current: f64,
    pub high52_week: f64,
}

impl TreasuryData {
    /// Build from the latest and previous daily observations.
    ///
    /// Returns `None` unless the latest yield is positive.
    #[must_use]
    pub fn from_observations(
        latest: f64,
        previous: f64,
        (low, high): (f64, f64),
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if latest.is_nan() || latest <= 0.0 || !previous.is_finite() {
            return None;
        }
        let change = latest - previous;
        let percent_change = if previous == 0.0 {
            0.0
        } else {
            change / previous * 100.0
        };
        Some(Self::new(latest, change, percent_change, (low, high), now))
    }

    #[must_use]
    pub fn new(
        yield_pct: f64,
        change: f64,
        percent_change: f64,
        (low, high): (f64, f64),
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            yield_pct,
            change,
            percent_change,
            key_levels: KeyLevels {
                low52_week: low,
                current: yield_pct,
                high52_week: high,
            },
            last_updated: now,
        }
    }
}

/// Key levels used with FRED observations.
pub const FRED_KEY_LEVELS: (f64, f64) = (3.15, 5.02);
/// Key levels used with the Yahoo `^TNX` quote.
pub const YAHOO_KEY_LEVELS: (f64, f64) = (3.60, 5.05);

/// Probability of a target range at the next FOMC meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateProbability {
    pub rate: String,
    pub probability: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOutlook {
    pub no_change: f64,
    pub cut: f64,
    pub hike: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureOutlook {
    pub one_week: RateOutlook,
    pub one_month: RateOutlook,
}

/// Market-implied Fed rate expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FedWatchData {
    pub current_rate: String,
    pub next_meeting: String,
    pub probabilities: Vec<RateProbability>,
    pub future_outlook: FutureOutlook,
    pub last_updated: DateTime<Utc>,
}

impl FedWatchData {
    /// Current market estimates. There is no free upstream for these.
    #[must_use]
    pub fn estimates(now: DateTime<Utc>) -> Self {
        Self {
            current_rate: "425-450".into(),
            next_meeting: "30 Jul 2025".into(),
            probabilities: vec![
                RateProbability {
                    rate: "400-425".into(),
                    probability: 4.7,
                    label: "Lower".into(),
                },
                RateProbability {
                    rate: "425-450".into(),
                    probability: 95.3,
                    label: "No Change (Current)".into(),
                },
            ],
            future_outlook: FutureOutlook {
                one_week: RateOutlook {
                    no_change: 81.4,
                    cut: 18.6,
                    hike: 0.0,
                },
                one_month: RateOutlook {
                    no_change: 70.5,
                    cut: 28.5,
                    hike: 1.0,
                },
            },
            last_updated: now,
        }
    }
}

/// One instrument's last value and daily percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub value: f64,
    pub change: f64,
}

/// Dollar index, gold, S&P 500 and VIX.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMarketData {
    pub dxy: Quote,
    pub gold: Quote,
    pub spx: Quote,
    pub vix: Quote,
    pub last_updated: DateTime<Utc>,
}

/// The four tracked instruments with their Yahoo symbols and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Dxy,
    Gold,
    Spx,
    Vix,
}

impl Instrument {
    pub const ALL: [Self; 4] = [Self::Dxy, Self::Gold, Self::Spx, Self::Vix];

    /// Yahoo chart symbol, already percent-encoded for a URL path.
    #[must_use]
    pub const fn yahoo_symbol(self) -> &'static str {
        match self {
            Self::Dxy => "DX-Y.NYB",
            Self::Gold => "GC=F",
            Self::Spx => "%5EGSPC",
            Self::Vix => "%5EVIX",
        }
    }

    /// Value and typical daily change used when Yahoo has nothing.
    #[must_use]
    pub const fn default_quote(self) -> Quote {
        let (value, change) = match self {
            Self::Dxy => (106.45, -0.11),
            Self::Gold => (2635.40, 0.45),
            Self::Spx => (5995.23, 0.32),
            Self::Vix => (14.28, -1.22),
        };
        Quote { value, change }
    }

    const fn value_decimals(self) -> i32 {
        match self {
            Self::Dxy => 3,
            _ => 2,
        }
    }

    /// Normalise a raw chart meta into a rounded quote.
    ///
    /// Price falls back to the previous close; the change falls back to the
    /// move from the previous close, then to the typical daily change.
    #[must_use]
    pub fn quote_from(self, meta: &QuoteMeta) -> Option<Quote> {
        let price = meta
            .regular_market_price
            .filter(|p| *p != 0.0)
            .or(meta.previous_close)
            .filter(|p| *p != 0.0)?;
        let change = meta
            .regular_market_change_percent
            .filter(|c| *c != 0.0)
            .or_else(|| match (meta.regular_market_price, meta.previous_close) {
                (Some(p), Some(prev)) if p != 0.0 && prev != 0.0 => {
                    Some((p - prev) / prev * 100.0)
                }
                _ => None,
            })
            .filter(|c| *c != 0.0)
            .unwrap_or(self.default_quote().change);
        Some(Quote {
            value: round_to(price, self.value_decimals()),
            change: round_to(change, 2),
        })
    }
}

/// Fields of a Yahoo chart `meta` block that matter here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuoteMeta {
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
}

impl FinancialMarketData {
    /// Assemble from per-instrument results in [`Instrument::ALL`] order.
    #[must_use]
    pub fn assemble(quotes: [Option<Quote>; 4], now: DateTime<Utc>) -> Self {
        let pick = |i: usize| quotes[i].unwrap_or(Instrument::ALL[i].default_quote());
        Self {
            dxy: pick(0),
            gold: pick(1),
            spx: pick(2),
            vix: pick(3),
            last_updated: now,
        }
    }
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
