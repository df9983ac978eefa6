//! Multi-timeframe price predictions from a language model, with a
//! technical fallback.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::adapter::outbound::market::{CoinGecko, CryptoCompare};
use crate::domain::indicator::TechnicalIndicators;
use crate::domain::prediction::{
    build_prompt, parse_model_output, MarketSnapshot, MultiTimeframePredictions, DEFAULT_PRICE,
    SYSTEM_PROMPT,
};
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::{Clock, Llm};

const HISTORY_DAYS: &str = "90";

pub struct PredictionService {
    coingecko: CoinGecko,
    cryptocompare: CryptoCompare,
    llm: Option<Arc<dyn Llm>>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<MultiTimeframePredictions>,
}

impl PredictionService {
    #[must_use]
    pub fn new(
        coingecko: CoinGecko,
        cryptocompare: CryptoCompare,
        llm: Option<Arc<dyn Llm>>,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coingecko,
            cryptocompare,
            llm,
            cache: TtlCache::new(CacheConfig::ttl(cache.predictions_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Predictions for one month to one year out.
    ///
    /// A cached outlook is re-anchored on the current price when one can be
    /// fetched. Model failures produce the technical fallback, which is not
    /// cached.
    pub async fn predictions(&self) -> MultiTimeframePredictions {
        let now = self.clock.now();
        if let Some(cached) = self.cache.get_fresh() {
            return match self.spot_price(now).await {
                Some(price) => cached.rescaled(price, now),
                None => cached,
            };
        }

        match self.generate(now).await {
            Ok(predictions) => {
                info!(
                    price = predictions.current_price,
                    confidence = predictions.confidence_score,
                    "Generated model predictions"
                );
                self.cache.put(predictions.clone());
                predictions
            }
            Err(err) => {
                let rate_limited = err.is_rate_limited();
                warn!(error = %err, rate_limited, "Model predictions failed, using fallback");
                let (price, change) = self.fallback_price(now).await;
                MultiTimeframePredictions::technical_fallback(price, change, rate_limited, now)
            }
        }
    }

    async fn generate(&self, now: DateTime<Utc>) -> Result<MultiTimeframePredictions> {
        let llm = self.llm.as_ref().ok_or(Error::LlmUnavailable("xai"))?;

        let (price, chart, details) = futures_util::join!(
            self.coingecko.simple_price(now),
            self.coingecko.market_chart(HISTORY_DAYS, Some("daily")),
            self.coingecko.market_data()
        );
        let (price, chart, details) = (price?, chart?, details?);

        let indicators = TechnicalIndicators::compute(&chart.closes(), &chart.volumes())
            .ok_or_else(|| Error::invalid("coingecko", "too few daily closes for indicators"))?;
        let snapshot = MarketSnapshot {
            price: price.usd,
            change_24h: price.usd_24h_change,
            volume_24h: details.total_volume.usd,
            market_cap: details.market_cap.usd,
            ath: details.ath.usd,
            circulating_supply: details.circulating_supply,
        };

        let reply = llm
            .complete(Some(SYSTEM_PROMPT), &build_prompt(&snapshot, &indicators, now))
            .await?;
        Ok(parse_model_output(&reply, snapshot.price, now)?)
    }

    /// Current price for re-anchoring a cached outlook.
    async fn spot_price(&self, now: DateTime<Utc>) -> Option<f64> {
        if let Ok(price) = self.cryptocompare.spot().await {
            return Some(price);
        }
        self.coingecko.simple_price(now).await.ok().map(|p| p.usd)
    }

    /// Price and 24h change for the technical fallback.
    async fn fallback_price(&self, now: DateTime<Utc>) -> (f64, f64) {
        if let Ok(data) = self.coingecko.market_data().await {
            return (data.current_price.usd, data.price_change_percentage_24h);
        }
        if let Ok(ticker) = self.cryptocompare.ticker().await {
            return (ticker.price, ticker.changepct24hour);
        }
        if let Ok(price) = self.coingecko.simple_price(now).await {
            return (price.usd, price.usd_24h_change);
        }
        (DEFAULT_PRICE, 0.0)
    }
}
