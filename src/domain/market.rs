//! Bitcoin price, market data and chart types.
//!
//! The price and market data shapes keep the snake_case field names that
//! CoinGecko uses, whichever provider produced them:
//!
//! - [`BitcoinPrice`] - spot price and 24h change
//! - [`BitcoinMarketData`] - price, cap, volume, supply and 24h range
//! - [`ChartPoint`] - one `(timestamp, price)` sample
//! - [`Timeframe`] - chart window selector and its per-provider parameters
//!
//! # Examples
//!
//! ```
//! use bitcoin_hub::domain::market::Timeframe;
//!
//! assert_eq!(Timeframe::parse("3M"), Timeframe::ThreeMonths);
//! assert_eq!(Timeframe::parse("bogus"), Timeframe::Day);
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Last-resort spot price.
pub const FALLBACK_PRICE: f64 = 41_285.34;
/// Last-resort 24h change, percent.
pub const FALLBACK_CHANGE_24H: f64 = 2.14;
/// All-time high reported for providers that do not expose one.
pub const ASSUMED_ATH: f64 = 69_000.0;
/// Maximum number of points kept from a CoinCap history response.
pub const MAX_CHART_POINTS: usize = 200;

/// Spot price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinPrice {
    pub usd: f64,
    pub usd_24h_change: f64,
    /// Unix seconds.
    pub last_updated_at: i64,
}

impl BitcoinPrice {
    /// The hardcoded price used when every source fails.
    #[must_use]
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            usd: FALLBACK_PRICE,
            usd_24h_change: FALLBACK_CHANGE_24H,
            last_updated_at: now.timestamp(),
        }
    }
}

/// `{ "usd": value }` wrapper used throughout the market data shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Usd {
    pub usd: f64,
}

impl From<f64> for Usd {
    fn from(usd: f64) -> Self {
        Self { usd }
    }
}

/// Market overview for Bitcoin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinMarketData {
    pub current_price: Usd,
    pub market_cap: Usd,
    pub total_volume: Usd,
    pub price_change_percentage_24h: f64,
    pub circulating_supply: f64,
    pub ath: Usd,
    pub high_24h: Usd,
    pub low_24h: Usd,
}

impl BitcoinMarketData {
    /// The hardcoded overview used when every source fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            current_price: FALLBACK_PRICE.into(),
            market_cap: 815_200_000_000.0.into(),
            total_volume: 28_900_000_000.0.into(),
            price_change_percentage_24h: FALLBACK_CHANGE_24H,
            circulating_supply: 19_400_000.0,
            ath: 69_044.0.into(),
            high_24h: 42_100.75.into(),
            low_24h: 40_950.25.into(),
        }
    }
}

/// A single chart sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chart window requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Minute,
    FiveMinutes,
    Hour,
    /// `1d`; also the default for unknown strings.
    Day,
    Week,
    Month,
    /// `1D`, kept distinct so it caches separately from `1d`.
    DayUpper,
    WeekUpper,
    MonthUpper,
    ThreeMonths,
    Year,
    All,
}

/// CryptoCompare `v2/histo*` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoParams {
    pub endpoint: &'static str,
    pub limit: u32,
    pub aggregate: u32,
}

/// CoinGecko `market_chart` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketChartParams {
    pub days: &'static str,
    pub interval: Option<&'static str>,
    /// Keep only samples newer than this window, thinned to ~60 points.
    pub recent_window: Option<Duration>,
}

/// CoinCap `history` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryParams {
    pub interval: &'static str,
    /// How far back to start; `None` asks for everything.
    pub lookback: Option<Duration>,
}

impl Timeframe {
    /// Parse the query-string form. Unknown values map to [`Timeframe::Day`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "1m" => Self::Minute,
            "5m" => Self::FiveMinutes,
            "1h" => Self::Hour,
            "1w" => Self::Week,
            "1mo" => Self::Month,
            "1D" => Self::DayUpper,
            "1W" => Self::WeekUpper,
            "1M" => Self::MonthUpper,
            "3M" => Self::ThreeMonths,
            "1Y" => Self::Year,
            "ALL" => Self::All,
            _ => Self::Day,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::FiveMinutes => "5m",
            Self::Hour => "1h",
            Self::Day => "1d",
            Self::Week => "1w",
            Self::Month => "1mo",
            Self::DayUpper => "1D",
            Self::WeekUpper => "1W",
            Self::MonthUpper => "1M",
            Self::ThreeMonths => "3M",
            Self::Year => "1Y",
            Self::All => "ALL",
        }
    }

    #[must_use]
    pub const fn histo_params(self) -> HistoParams {
        let (endpoint, limit, aggregate) = match self {
            Self::Minute => ("histominute", 60, 1),
            Self::FiveMinutes => ("histominute", 60, 5),
            Self::Hour | Self::Day | Self::DayUpper => ("histohour", 24, 1),
            Self::Week | Self::WeekUpper => ("histoday", 7, 1),
            Self::Month | Self::MonthUpper => ("histoday", 30, 1),
            Self::ThreeMonths => ("histoday", 90, 1),
            Self::Year => ("histoday", 365, 1),
            Self::All => ("histoday", 2000, 1),
        };
        HistoParams {
            endpoint,
            limit,
            aggregate,
        }
    }

    #[must_use]
    pub fn market_chart_params(self) -> MarketChartParams {
        let (days, interval) = match self {
            Self::Minute | Self::FiveMinutes => ("1", Some("minutely")),
            Self::Hour | Self::Day | Self::DayUpper => ("1", Some("hourly")),
            Self::Week | Self::WeekUpper => ("7", Some("daily")),
            Self::Month | Self::MonthUpper => ("30", Some("daily")),
            Self::ThreeMonths => ("90", Some("daily")),
            Self::Year => ("365", Some("daily")),
            Self::All => ("max", None),
        };
        let recent_window = match self {
            Self::Minute => Some(Duration::minutes(60)),
            Self::FiveMinutes => Some(Duration::minutes(300)),
            _ => None,
        };
        MarketChartParams {
            days,
            interval,
            recent_window,
        }
    }

    #[must_use]
    pub fn history_params(self) -> HistoryParams {
        let (interval, lookback) = match self {
            Self::Minute => ("m1", Some(Duration::hours(1))),
            Self::FiveMinutes => ("m5", Some(Duration::hours(5))),
            Self::Hour | Self::Day | Self::DayUpper => ("h1", Some(Duration::days(1))),
            Self::Week | Self::WeekUpper => ("h6", Some(Duration::days(7))),
            Self::Month | Self::MonthUpper => ("h12", Some(Duration::days(30))),
            Self::ThreeMonths => ("d1", Some(Duration::days(90))),
            Self::Year => ("d1", Some(Duration::days(365))),
            Self::All => ("d1", None),
        };
        HistoryParams { interval, lookback }
    }

    /// Point count and spacing of the synthetic series.
    #[must_use]
    pub fn synthetic_shape(self) -> (usize, Duration) {
        match self {
            Self::Minute => (60, Duration::minutes(1)),
            Self::FiveMinutes => (60, Duration::minutes(5)),
            Self::Hour | Self::Day | Self::DayUpper => (24, Duration::hours(1)),
            Self::Week | Self::WeekUpper => (7, Duration::days(1)),
            Self::Month | Self::MonthUpper => (30, Duration::days(1)),
            Self::ThreeMonths => (90, Duration::days(1)),
            Self::Year => (52, Duration::weeks(1)),
            Self::All => (60, Duration::days(30)),
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::Day
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep every `ceil(len / max)`-th point plus the last one.
#[must_use]
pub fn downsample(points: Vec<ChartPoint>, max: usize) -> Vec<ChartPoint> {
    if max == 0 || points.len() <= max {
        return points;
    }
    let step = points.len().div_ceil(max);
    let last = points.len() - 1;
    points
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0 || *i == last)
        .map(|(_, p)| p)
        .collect()
}

/// Plausible-looking series ending at `now`, used when no provider answers.
///
/// Each point compounds a linear 1% trend plus up to ±0.5% noise on `base`.
#[must_use]
pub fn synthetic_series<R: Rng + ?Sized>(
    timeframe: Timeframe,
    base: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<ChartPoint> {
    const TREND: f64 = 0.01;
    const NOISE: f64 = 0.005;

    let (count, step) = timeframe.synthetic_shape();
    let base = if base > 0.0 { base } else { FALLBACK_PRICE };

    (0..count)
        .map(|i| {
            let back = i32::try_from(count - i).unwrap_or(i32::MAX);
            let timestamp = now - step * back;
            let trend = i as f64 / count as f64 * TREND;
            let noise = (rng.gen::<f64>() - 0.5) * 2.0 * NOISE;
            let exponent = i32::try_from(i).unwrap_or(i32::MAX);
            let price = base * (1.0 + trend + noise).powi(exponent);
            ChartPoint {
                timestamp,
                price: price.max(0.01),
            }
        })
        .collect()
}
