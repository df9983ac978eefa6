//! CoinCap REST client. Numeric fields arrive as decimal strings.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domain::market::{
    downsample, BitcoinMarketData, BitcoinPrice, ChartPoint, Timeframe, ASSUMED_ATH,
    MAX_CHART_POINTS,
};
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher, RequestOptions};

const SOURCE: &str = "coincap";

/// Client for `api.coincap.io/v2`.
#[derive(Debug, Clone)]
pub struct CoinCap {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Asset {
    price_usd: Option<String>,
    change_percent24_hr: Option<String>,
    market_cap_usd: Option<String>,
    volume_usd24_hr: Option<String>,
    supply: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Market {
    price_usd: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryPoint {
    price_usd: String,
    time: i64,
}

fn number(value: Option<&String>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

impl CoinCap {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn asset(&self) -> Result<Asset> {
        let url = build_url(&self.base_url, "/assets/bitcoin", &[])?;
        let body: Envelope<Asset> = self.http.get_json(SOURCE, &url).await?;
        let asset = body
            .data
            .ok_or_else(|| Error::invalid(SOURCE, "missing data"))?;
        if number(asset.price_usd.as_ref()) <= 0.0 {
            return Err(Error::invalid(SOURCE, "missing priceUsd"));
        }
        Ok(asset)
    }

    pub async fn price(&self, now: DateTime<Utc>) -> Result<BitcoinPrice> {
        let asset = self.asset().await?;
        Ok(BitcoinPrice {
            usd: number(asset.price_usd.as_ref()),
            usd_24h_change: number(asset.change_percent24_hr.as_ref()),
            last_updated_at: now.timestamp(),
        })
    }

    /// Market overview. The 24h range is estimated as ±1.5% around the
    /// average price of the top five markets, or ±3% around the asset price
    /// when the markets call fails.
    pub async fn market_data(&self) -> Result<BitcoinMarketData> {
        let asset = self.asset().await?;
        let price = number(asset.price_usd.as_ref());

        let (high, low) = match self.market_average().await {
            Some(avg) => (avg * 1.015, avg * 0.985),
            None => (price * 1.03, price * 0.97),
        };

        Ok(BitcoinMarketData {
            current_price: price.into(),
            market_cap: number(asset.market_cap_usd.as_ref()).into(),
            total_volume: number(asset.volume_usd24_hr.as_ref()).into(),
            price_change_percentage_24h: number(asset.change_percent24_hr.as_ref()),
            circulating_supply: number(asset.supply.as_ref()),
            ath: ASSUMED_ATH.into(),
            high_24h: high.into(),
            low_24h: low.into(),
        })
    }

    async fn market_average(&self) -> Option<f64> {
        let url = build_url(&self.base_url, "/assets/bitcoin/markets", &[("limit", "5")]).ok()?;
        let body: Envelope<Vec<Market>> = self.http.get_json(SOURCE, &url).await.ok()?;
        let markets = body.data.filter(|m| !m.is_empty())?;
        let sum: f64 = markets.iter().map(|m| number(m.price_usd.as_ref())).sum();
        Some(sum / markets.len() as f64)
    }

    /// Price history for the timeframe, downsampled to at most
    /// [`MAX_CHART_POINTS`] samples.
    pub async fn chart(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let params = timeframe.history_params();
        let start = params
            .lookback
            .map(|back| (now - back).timestamp_millis().to_string());
        let mut query = vec![("interval", params.interval)];
        if let Some(start) = start.as_deref() {
            query.push(("start", start));
        }
        let url = build_url(&self.base_url, "/assets/bitcoin/history", &query)?;

        let body: Envelope<Vec<HistoryPoint>> = self
            .http
            .get_json_with(SOURCE, &url, &RequestOptions::long())
            .await?;
        let history = body
            .data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::invalid(SOURCE, "empty history"))?;

        let points = history
            .into_iter()
            .filter_map(|p| {
                Some(ChartPoint {
                    timestamp: Utc.timestamp_millis_opt(p.time).single()?,
                    price: p.price_usd.parse().ok()?,
                })
            })
            .collect();
        Ok(downsample(points, MAX_CHART_POINTS))
    }
}
