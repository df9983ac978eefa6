//! CryptoCompare REST client.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domain::market::{BitcoinMarketData, BitcoinPrice, ChartPoint, Timeframe, ASSUMED_ATH};
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher, RequestOptions};

const SOURCE: &str = "cryptocompare";

/// Client for `min-api.cryptocompare.com/data`.
#[derive(Debug, Clone)]
pub struct CryptoCompare {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Spot {
    #[serde(rename = "USD")]
    usd: f64,
}

#[derive(Deserialize)]
struct PriceMultiFull {
    #[serde(rename = "RAW")]
    raw: Option<RawSymbols>,
}

#[derive(Deserialize)]
struct RawSymbols {
    #[serde(rename = "BTC")]
    btc: Option<RawQuotes>,
}

#[derive(Deserialize)]
struct RawQuotes {
    #[serde(rename = "USD")]
    usd: Option<Ticker>,
}

/// The `RAW.BTC.USD` block of `pricemultifull`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct Ticker {
    pub price: f64,
    pub mktcap: f64,
    pub volume24hourto: f64,
    pub changepct24hour: f64,
    pub supply: f64,
    pub high24hour: f64,
    pub low24hour: f64,
}

impl From<Ticker> for BitcoinMarketData {
    fn from(t: Ticker) -> Self {
        Self {
            current_price: t.price.into(),
            market_cap: t.mktcap.into(),
            total_volume: t.volume24hourto.into(),
            price_change_percentage_24h: t.changepct24hour,
            circulating_supply: t.supply,
            ath: ASSUMED_ATH.into(),
            high_24h: t.high24hour.into(),
            low_24h: t.low24hour.into(),
        }
    }
}

#[derive(Deserialize)]
struct Histo {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Data")]
    data: Option<HistoData>,
}

#[derive(Deserialize)]
struct HistoData {
    #[serde(rename = "Data")]
    data: Option<Vec<Candle>>,
}

#[derive(Deserialize)]
struct Candle {
    time: i64,
    close: f64,
}

impl CryptoCompare {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Spot price in USD.
    pub async fn spot(&self) -> Result<f64> {
        let url = build_url(&self.base_url, "/price", &[("fsym", "BTC"), ("tsyms", "USD")])?;
        let spot: Spot = self.http.get_json(SOURCE, &url).await?;
        if spot.usd <= 0.0 {
            return Err(Error::invalid(SOURCE, "non-positive price"));
        }
        Ok(spot.usd)
    }

    /// Full ticker from `pricemultifull`, rejected when `RAW.BTC.USD` is absent.
    pub async fn ticker(&self) -> Result<Ticker> {
        let url = build_url(
            &self.base_url,
            "/pricemultifull",
            &[("fsyms", "BTC"), ("tsyms", "USD")],
        )?;
        let body: PriceMultiFull = self.http.get_json(SOURCE, &url).await?;
        body.raw
            .and_then(|r| r.btc)
            .and_then(|b| b.usd)
            .ok_or_else(|| Error::invalid(SOURCE, "missing RAW.BTC.USD"))
    }

    /// Spot price plus the 24h change from the ticker. A failed ticker
    /// request leaves the change at zero.
    pub async fn price(&self, now: DateTime<Utc>) -> Result<BitcoinPrice> {
        let usd = self.spot().await?;
        let usd_24h_change = self.ticker().await.map_or(0.0, |t| t.changepct24hour);
        Ok(BitcoinPrice {
            usd,
            usd_24h_change,
            last_updated_at: now.timestamp(),
        })
    }

    pub async fn market_data(&self) -> Result<BitcoinMarketData> {
        Ok(self.ticker().await?.into())
    }

    /// Close prices from `v2/histo*` for the timeframe.
    pub async fn chart(&self, timeframe: Timeframe) -> Result<Vec<ChartPoint>> {
        let params = timeframe.histo_params();
        let limit = params.limit.to_string();
        let aggregate = params.aggregate.to_string();
        let mut query = vec![("fsym", "BTC"), ("tsym", "USD"), ("limit", limit.as_str())];
        if params.aggregate > 1 {
            query.push(("aggregate", aggregate.as_str()));
        }
        let url = build_url(&self.base_url, &format!("/v2/{}", params.endpoint), &query)?;

        let body: Histo = self
            .http
            .get_json_with(SOURCE, &url, &RequestOptions::long())
            .await?;
        if body.response.as_deref() != Some("Success") {
            return Err(Error::invalid(SOURCE, "histo response was not Success"));
        }
        let candles = body
            .data
            .and_then(|d| d.data)
            .ok_or_else(|| Error::invalid(SOURCE, "missing Data.Data"))?;

        Ok(candles
            .into_iter()
            .filter_map(|c| {
                let timestamp = Utc.timestamp_opt(c.time, 0).single()?;
                Some(ChartPoint {
                    timestamp,
                    price: c.close,
                })
            })
            .collect())
    }
}
