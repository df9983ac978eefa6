//! CoinPaprika ticker and OHLCV endpoints.

use serde::Deserialize;

use crate::domain::sentiment::MarketSignals;
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "coinpaprika";

#[derive(Debug, Clone)]
pub struct CoinPaprika {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Coin {
    rank: Option<u32>,
    quotes: Option<Quotes>,
}

#[derive(Deserialize)]
struct Quotes {
    #[serde(rename = "USD")]
    usd: Option<UsdQuote>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UsdQuote {
    percent_change_24h: f64,
    market_cap_change_24h: f64,
    volume_24h_change_24h: f64,
}

#[derive(Deserialize)]
struct Candle {
    close: f64,
    low: f64,
    high: f64,
}

impl CoinPaprika {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn coin(&self) -> Result<Coin> {
        let url = build_url(&self.base_url, "/coins/btc-bitcoin", &[])?;
        self.http.get_json(SOURCE, &url).await
    }

    fn usd(coin: Coin) -> UsdQuote {
        coin.quotes.and_then(|q| q.usd).unwrap_or_default()
    }

    /// 24h price change in percent.
    pub async fn price_change_24h(&self) -> Result<f64> {
        Ok(Self::usd(self.coin().await?).percent_change_24h)
    }

    /// Market cap and volume momentum, candle position and rank. Both the
    /// ticker and the latest candle are required.
    pub async fn market_signals(&self) -> Result<MarketSignals> {
        let url = build_url(&self.base_url, "/coins/btc-bitcoin/ohlcv/latest", &[])?;
        let (coin, candles) = futures_util::join!(
            self.coin(),
            self.http.get_json::<Vec<Candle>>(SOURCE, &url)
        );
        let coin = coin?;
        let candles = candles?;
        let candle = candles
            .first()
            .map(|c| (c.close, c.low, c.high))
            .ok_or_else(|| Error::invalid(SOURCE, "no candle"))?;
        let rank = coin.rank;
        let quote = Self::usd(coin);
        Ok(MarketSignals {
            market_cap_change_24h: quote.market_cap_change_24h,
            volume_change_24h: quote.volume_24h_change_24h,
            candle: Some(candle),
            rank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::Server;

    const COIN: &str = r#"{"id":"btc-bitcoin","rank":1,"quotes":{"USD":{"price":60000,
        "percent_change_24h":3.2,"market_cap_change_24h":2.5,"volume_24h_change_24h":-12.0}}}"#;

    fn client(base: &str) -> CoinPaprika {
        CoinPaprika::new(HttpFetcher::from_config(&HttpConfig::default()), base)
    }

    #[tokio::test]
    async fn signals_combine_ticker_and_candle() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/coins/btc-bitcoin").with_body(COIN).create_async().await;
        server
            .mock("GET", "/coins/btc-bitcoin/ohlcv/latest")
            .with_body(r#"[{"open":59000,"high":61000,"low":58000,"close":60500}]"#)
            .create_async()
            .await;

        let signals = client(&server.url()).market_signals().await.unwrap();
        assert_eq!(signals.rank, Some(1));
        assert_eq!(signals.market_cap_change_24h, 2.5);
        assert_eq!(signals.candle, Some((60500.0, 58000.0, 61000.0)));
    }

    #[tokio::test]
    async fn missing_candle_fails_signals() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/coins/btc-bitcoin").with_body(COIN).create_async().await;
        server
            .mock("GET", "/coins/btc-bitcoin/ohlcv/latest")
            .with_status(402)
            .create_async()
            .await;

        let paprika = client(&server.url());
        assert!(paprika.market_signals().await.is_err());
        assert_eq!(paprika.price_change_24h().await.unwrap(), 3.2);
    }
}
