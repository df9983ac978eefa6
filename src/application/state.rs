//! Shared application state.
//!
//! One [`AppState`] is built at startup and shared by every request
//! handler. It owns the services, and through them every cache.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use super::chat::ChatService;
use super::congress::CongressService;
use super::dominance::DominanceService;
use super::economy::EconomyService;
use super::financial::FinancialService;
use super::liquidity::LiquidityService;
use super::market::MarketService;
use super::options::OptionsService;
use super::prediction::PredictionService;
use super::sentiment::{SentimentService, SentimentSources};
use super::whale::WhaleService;
use crate::adapter::outbound::blockchain::Blockchain;
use crate::adapter::outbound::deribit::Deribit;
use crate::adapter::outbound::disclosure::{Finnhub, Fmp, HouseStockWatcher, SenateStockWatcher};
use crate::adapter::outbound::finance::{Fred, Yahoo};
use crate::adapter::outbound::llm::ChatCompletions;
use crate::adapter::outbound::market::{CoinCap, CoinGecko, CryptoCompare};
use crate::adapter::outbound::sentiment::{CoinDeskRss, CoinPaprika, FearGreed, NewsApi, Reddit};
use crate::adapter::outbound::worldbank::WorldBank;
use crate::infrastructure::config::Config;
use crate::infrastructure::http::HttpFetcher;
use crate::port::{Clock, Llm};

/// Every service, wired from one [`Config`].
pub struct AppState {
    pub market: Arc<MarketService>,
    pub dominance: DominanceService,
    pub financial: Arc<FinancialService>,
    pub liquidity: LiquidityService,
    pub whales: WhaleService,
    pub options: OptionsService,
    pub congress: CongressService,
    pub predictions: PredictionService,
    pub sentiment: Arc<SentimentService>,
    pub economy: EconomyService,
    pub chat: ChatService,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Build every service, creating completion clients for whichever of
    /// `XAI_API_KEY` and `OPENAI_API_KEY` are present.
    ///
    /// Grok drives predictions and news sentiment. Chat uses Grok, else
    /// OpenAI.
    #[must_use]
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let http = HttpFetcher::from_config(&config.http);
        let client = http.client().clone();
        let up = &config.upstream;

        let xai: Option<Arc<dyn Llm>> = config.keys.xai.as_ref().map(|key| {
            Arc::new(ChatCompletions::new("xai", client.clone(), &up.xai_url, key, &config.llm.xai))
                as Arc<dyn Llm>
        });
        let openai: Option<Arc<dyn Llm>> = config.keys.openai.as_ref().map(|key| {
            Arc::new(ChatCompletions::new(
                "openai",
                client.clone(),
                &up.openai_url,
                key,
                &config.llm.openai,
            )) as Arc<dyn Llm>
        });
        info!(
            xai = xai.is_some(),
            openai = openai.is_some(),
            "Completion providers configured"
        );

        let chat = xai.clone().or(openai);
        Self::with_llms(config, clock, xai, chat)
    }

    /// Build every service with explicit completion providers: `analyst`
    /// for predictions and news sentiment, `chat` for the chatbot.
    #[must_use]
    pub fn with_llms(
        config: &Config,
        clock: Arc<dyn Clock>,
        analyst: Option<Arc<dyn Llm>>,
        chat: Option<Arc<dyn Llm>>,
    ) -> Self {
        let http = HttpFetcher::from_config(&config.http);
        let up = &config.upstream;
        let keys = &config.keys;
        let cache = &config.cache;

        let cryptocompare = CryptoCompare::new(http.clone(), &up.cryptocompare_url);
        let coingecko = CoinGecko::new(http.clone(), &up.coingecko_url, keys.coingecko.clone());
        let coincap = CoinCap::new(http.clone(), &up.coincap_url);

        let market = Arc::new(MarketService::new(
            cryptocompare.clone(),
            coingecko.clone(),
            coincap,
            cache,
            Arc::clone(&clock),
        ));
        let dominance = DominanceService::new(coingecko.clone(), cache, Arc::clone(&clock));
        let financial = Arc::new(FinancialService::new(
            Fred::new(http.clone(), &up.fred_url, keys.fred.clone()),
            Yahoo::new(http.clone(), &up.yahoo_url),
            cache,
            Arc::clone(&clock),
        ));
        let liquidity = LiquidityService::new(
            Fred::new(http.clone(), &up.fred_url, keys.fred.clone()),
            cache,
            Arc::clone(&clock),
        );
        let whales = WhaleService::new(
            Blockchain::new(http.clone(), &up.blockchain_url),
            Arc::clone(&market),
            cache,
            Arc::clone(&clock),
        );
        let options = OptionsService::new(
            Deribit::new(http.clone(), &up.deribit_url),
            cache,
            Arc::clone(&clock),
        );
        let congress = CongressService::new(
            HouseStockWatcher::new(http.clone(), &up.house_stock_watcher_url),
            Finnhub::new(http.clone(), &up.finnhub_url, keys.finnhub.clone()),
            Fmp::new(http.clone(), &up.fmp_url, keys.fmp.clone()),
            SenateStockWatcher::new(http.clone(), &up.senate_stock_watcher_url),
            cache,
            Arc::clone(&clock),
        );
        let predictions = PredictionService::new(
            coingecko,
            cryptocompare,
            analyst.clone(),
            cache,
            Arc::clone(&clock),
        );
        let sentiment = Arc::new(SentimentService::new(
            SentimentSources {
                news_api: NewsApi::new(http.clone(), &up.newsapi_url, keys.news.clone()),
                coindesk: CoinDeskRss::new(http.clone(), &up.coindesk_rss_url),
                reddit: Reddit::new(http.clone(), &up.reddit_url),
                coinpaprika: CoinPaprika::new(http.clone(), &up.coinpaprika_url),
                fear_greed: FearGreed::new(http.clone(), &up.fear_greed_url),
            },
            analyst,
            cache,
            Arc::clone(&clock),
        ));
        let economy = EconomyService::new(
            WorldBank::new(http, &up.worldbank_url),
            cache,
            Arc::clone(&clock),
        );
        let chat = ChatService::new(
            Arc::clone(&market),
            Arc::clone(&financial),
            Arc::clone(&sentiment),
            chat,
        );

        Self {
            market,
            dominance,
            financial,
            liquidity,
            whales,
            options,
            congress,
            predictions,
            sentiment,
            economy,
            chat,
            clock,
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current time as an RFC 3339 string with milliseconds and a `Z`
    /// suffix.
    #[must_use]
    pub fn last_updated(&self) -> String {
        self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{self, clock::ManualClock};

    #[test]
    fn last_updated_follows_the_clock() {
        let config = testkit::config::at(testkit::config::DEAD_BASE);
        let state = AppState::from_config(&config, Arc::new(ManualClock::default()));
        assert_eq!(state.last_updated(), "2025-06-01T12:00:00.000Z");
    }
}
