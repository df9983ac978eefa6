//! CoinGecko REST client.
//!
//! Sends `x-cg-api-key` when `COINGECKO_API_KEY` is configured; the public
//! tier works without it at a lower rate limit.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domain::dominance::GlobalSnapshot;
use crate::domain::market::{
    downsample, BitcoinMarketData, BitcoinPrice, ChartPoint, Timeframe, Usd, ASSUMED_ATH,
};
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher, RequestOptions};

const SOURCE: &str = "coingecko";

/// Samples kept when a short timeframe is cut from a one-day series.
const RECENT_POINTS: usize = 60;

/// Client for `api.coingecko.com/api/v3`.
#[derive(Debug, Clone)]
pub struct CoinGecko {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SimplePrice {
    bitcoin: Option<SimpleQuote>,
}

#[derive(Deserialize)]
struct SimpleQuote {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
    last_updated_at: Option<i64>,
}

#[derive(Deserialize)]
struct CoinDetails {
    market_data: Option<DetailsMarketData>,
}

#[derive(Deserialize)]
struct DetailsMarketData {
    current_price: Option<Usd>,
    market_cap: Option<Usd>,
    total_volume: Option<Usd>,
    price_change_percentage_24h: Option<f64>,
    circulating_supply: Option<f64>,
    ath: Option<Usd>,
    high_24h: Option<Usd>,
    low_24h: Option<Usd>,
}

/// `[timestamp_ms, value]` series from `market_chart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, f64)>,
}

#[derive(Deserialize)]
struct Global {
    data: Option<GlobalData>,
}

#[derive(Deserialize)]
struct GlobalData {
    total_market_cap: Option<Usd>,
    total_volume: Option<Usd>,
    market_cap_percentage: Option<Percentages>,
    active_cryptocurrencies: Option<u64>,
}

#[derive(Deserialize)]
struct Percentages {
    btc: Option<f64>,
    eth: Option<f64>,
}

fn ms_to_time(ms: f64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms as i64).single()
}

impl CoinGecko {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn options(&self) -> RequestOptions {
        let options = RequestOptions::default();
        match &self.api_key {
            Some(key) => options.header("x-cg-api-key", key.clone()),
            None => options,
        }
    }

    /// `/simple/price` with 24h change.
    pub async fn simple_price(&self, now: DateTime<Utc>) -> Result<BitcoinPrice> {
        let url = build_url(
            &self.base_url,
            "/simple/price",
            &[
                ("ids", "bitcoin"),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
                ("include_last_updated_at", "true"),
            ],
        )?;
        let body: SimplePrice = self.http.get_json_with(SOURCE, &url, &self.options()).await?;
        let quote = body
            .bitcoin
            .ok_or_else(|| Error::invalid(SOURCE, "missing bitcoin quote"))?;
        let usd = quote
            .usd
            .filter(|p| *p > 0.0)
            .ok_or_else(|| Error::invalid(SOURCE, "missing usd price"))?;
        Ok(BitcoinPrice {
            usd,
            usd_24h_change: quote.usd_24h_change.unwrap_or(0.0),
            last_updated_at: quote.last_updated_at.unwrap_or_else(|| now.timestamp()),
        })
    }

    /// `market_data` block of `/coins/bitcoin`.
    pub async fn market_data(&self) -> Result<BitcoinMarketData> {
        let url = build_url(
            &self.base_url,
            "/coins/bitcoin",
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ],
        )?;
        let body: CoinDetails = self.http.get_json_with(SOURCE, &url, &self.options()).await?;
        let md = body
            .market_data
            .ok_or_else(|| Error::invalid(SOURCE, "missing market_data"))?;
        let price = md
            .current_price
            .filter(|p| p.usd > 0.0)
            .ok_or_else(|| Error::invalid(SOURCE, "missing current_price.usd"))?;
        let or_zero = |v: Option<Usd>| v.unwrap_or(Usd { usd: 0.0 });

        Ok(BitcoinMarketData {
            current_price: price,
            market_cap: or_zero(md.market_cap),
            total_volume: or_zero(md.total_volume),
            price_change_percentage_24h: md.price_change_percentage_24h.unwrap_or(0.0),
            circulating_supply: md.circulating_supply.unwrap_or(0.0),
            ath: md.ath.unwrap_or(Usd { usd: ASSUMED_ATH }),
            high_24h: md.high_24h.unwrap_or(price),
            low_24h: md.low_24h.unwrap_or(price),
        })
    }

    /// Raw `market_chart` series for `days` (a number or `"max"`).
    pub async fn market_chart(&self, days: &str, interval: Option<&str>) -> Result<MarketChart> {
        let mut query = vec![("vs_currency", "usd"), ("days", days)];
        if let Some(interval) = interval {
            query.push(("interval", interval));
        }
        let url = build_url(&self.base_url, "/coins/bitcoin/market_chart", &query)?;
        let options = RequestOptions {
            long: true,
            ..self.options()
        };
        let chart: MarketChart = self.http.get_json_with(SOURCE, &url, &options).await?;
        if chart.prices.is_empty() {
            return Err(Error::invalid(SOURCE, "empty prices"));
        }
        Ok(chart)
    }

    /// Chart points for the timeframe. Minute timeframes keep only the
    /// recent window, thinned to about sixty samples.
    pub async fn chart(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let params = timeframe.market_chart_params();
        let chart = self.market_chart(params.days, params.interval).await?;
        let points: Vec<ChartPoint> = chart
            .prices
            .into_iter()
            .filter_map(|(ms, price)| {
                Some(ChartPoint {
                    timestamp: ms_to_time(ms)?,
                    price,
                })
            })
            .collect();

        Ok(match params.recent_window {
            Some(window) => recent(points, now - window),
            None => points,
        })
    }

    /// `/global` market totals.
    pub async fn global(&self) -> Result<GlobalSnapshot> {
        let url = build_url(&self.base_url, "/global", &[])?;
        let body: Global = self.http.get_json_with(SOURCE, &url, &self.options()).await?;
        let data = body
            .data
            .ok_or_else(|| Error::invalid(SOURCE, "missing data"))?;
        let (btc, eth) = data
            .market_cap_percentage
            .map_or((None, None), |p| (p.btc, p.eth));
        Ok(GlobalSnapshot {
            total_market_cap: data.total_market_cap.map(|v| v.usd),
            total_volume: data.total_volume.map(|v| v.usd),
            btc_dominance: btc,
            eth_dominance: eth,
            active_cryptocurrencies: data.active_cryptocurrencies,
        })
    }
}

fn recent(points: Vec<ChartPoint>, since: DateTime<Utc>) -> Vec<ChartPoint> {
    let kept: Vec<ChartPoint> = points.into_iter().filter(|p| p.timestamp >= since).collect();
    downsample(kept, RECENT_POINTS)
}

impl MarketChart {
    /// Closes, oldest first.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.prices.iter().map(|(_, p)| *p).collect()
    }

    #[must_use]
    pub fn volumes(&self) -> Vec<f64> {
        self.total_volumes.iter().map(|(_, v)| *v).collect()
    }
}
