//! Market sentiment from news, social, market and trading-activity readings.

use std::sync::Arc;

use tracing::{debug, info};

use super::logged;
use crate::adapter::outbound::sentiment::{CoinDeskRss, CoinPaprika, FearGreed, NewsApi, Reddit};
use crate::domain::prediction::strip_code_fences;
use crate::domain::sentiment::{
    aggregate, extract_keywords, fear_greed_sentiment, keyword_sentiment, market_sentiment,
    news_prompt, price_change_proxy, social_sentiment, ModelNewsSentiment, NewsArticle, Reading,
    SentimentData,
};
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::{Clock, Llm};

const NEWS: &str = "News & Media";
const SOCIAL: &str = "Social Sentiment";
const MARKET: &str = "Market Data";
const TRADING: &str = "Trading Activity";

/// Upstream clients feeding the analysis.
pub struct SentimentSources {
    pub news_api: NewsApi,
    pub coindesk: CoinDeskRss,
    pub reddit: Reddit,
    pub coinpaprika: CoinPaprika,
    pub fear_greed: FearGreed,
}

pub struct SentimentService {
    sources: SentimentSources,
    llm: Option<Arc<dyn Llm>>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<SentimentData>,
}

impl SentimentService {
    #[must_use]
    pub fn new(
        sources: SentimentSources,
        llm: Option<Arc<dyn Llm>>,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            llm,
            cache: TtlCache::new(CacheConfig::ttl(cache.sentiment_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Weighted overall sentiment. Every source has its own fallback, so
    /// this never fails.
    pub async fn analysis(&self) -> SentimentData {
        if let Some(data) = self.cache.get_fresh() {
            return data;
        }

        let (articles, social, market, trading) = futures_util::join!(
            self.articles(),
            self.social(),
            self.market(),
            self.trading_activity()
        );
        let news = self.news(&articles).await;

        let readings = [(NEWS, news), (SOCIAL, social), (MARKET, market), (TRADING, trading)];
        let mut data = aggregate(&readings, Vec::new(), self.clock.now());
        data.keywords = extract_keywords(&articles, data.overall);

        info!(
            overall = ?data.overall,
            score = data.overall_score,
            articles = articles.len(),
            "Sentiment analysis refreshed"
        );
        self.cache.put(data.clone());
        data
    }

    /// NewsAPI, then CoinDesk, then nothing.
    async fn articles(&self) -> Vec<NewsArticle> {
        let from_newsapi = non_empty(self.sources.news_api.bitcoin_articles().await);
        if let Ok(articles) = logged("news", "newsapi", from_newsapi) {
            return articles;
        }
        logged("news", "coindesk", self.sources.coindesk.articles().await).unwrap_or_default()
    }

    /// Model rating of the headlines, else keyword counting.
    async fn news(&self, articles: &[NewsArticle]) -> Reading {
        if let Some(llm) = self.llm.as_ref().filter(|_| !articles.is_empty()) {
            let rated = rate_news(llm.as_ref(), articles).await;
            if let Ok(reading) = logged("news sentiment", llm.name(), rated) {
                return reading;
            }
        }
        debug!(articles = articles.len(), "Scoring news by keywords");
        keyword_sentiment(articles)
    }

    /// Reddit, then the 24h price change as a proxy, then neutral.
    async fn social(&self) -> Reading {
        let posts = self.sources.reddit.hot_posts().await;
        if let Ok(posts) = logged("social sentiment", "reddit", posts) {
            return social_sentiment(&posts);
        }
        let change = self.sources.coinpaprika.price_change_24h().await;
        logged("social sentiment", "coinpaprika", change)
            .map_or_else(|_| Reading::neutral(0.3), price_change_proxy)
    }

    async fn market(&self) -> Reading {
        let signals = self.sources.coinpaprika.market_signals().await;
        logged("market sentiment", "coinpaprika", signals)
            .map_or_else(|_| Reading::neutral(0.3), |s| market_sentiment(&s))
    }

    async fn trading_activity(&self) -> Reading {
        let value = self.sources.fear_greed.current().await;
        logged("trading activity", "fear-greed", value)
            .map_or_else(|_| Reading::neutral(0.5), fear_greed_sentiment)
    }
}

async fn rate_news(llm: &dyn Llm, articles: &[NewsArticle]) -> Result<Reading> {
    let reply = llm.complete(None, &news_prompt(articles)).await?;
    let rated: ModelNewsSentiment = serde_json::from_str(&strip_code_fences(&reply))?;
    Ok(rated.reading())
}

fn non_empty(result: Result<Vec<NewsArticle>>) -> Result<Vec<NewsArticle>> {
    match result {
        Ok(articles) if articles.is_empty() => Err(Error::invalid("newsapi", "no articles")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::Sentiment;
    use crate::infrastructure::config::Config;
    use crate::infrastructure::http::HttpFetcher;
    use crate::testkit::{self, clock::ManualClock, llm::ScriptedLlm};
    use mockito::{Matcher, Server};

    fn sources(config: &Config) -> SentimentSources {
        let http = HttpFetcher::from_config(&config.http);
        let up = &config.upstream;
        SentimentSources {
            news_api: NewsApi::new(http.clone(), &up.newsapi_url, config.keys.news.clone()),
            coindesk: CoinDeskRss::new(http.clone(), &up.coindesk_rss_url),
            reddit: Reddit::new(http.clone(), &up.reddit_url),
            coinpaprika: CoinPaprika::new(http.clone(), &up.coinpaprika_url),
            fear_greed: FearGreed::new(http, &up.fear_greed_url),
        }
    }

    fn service(config: &Config, llm: Option<Arc<dyn Llm>>) -> SentimentService {
        SentimentService::new(
            sources(config),
            llm,
            &config.cache,
            Arc::new(ManualClock::default()),
        )
    }

    #[tokio::test]
    async fn all_sources_down_gives_neutral_readings() {
        let config = testkit::config::at(testkit::config::DEAD_BASE);
        let data = service(&config, None).analysis().await;

        assert_eq!(data.sources.len(), 4);
        assert_eq!(data.overall, Sentiment::Neutral);
        assert_eq!(data.overall_score, 50.0);
        let social = data.sources.iter().find(|s| s.source == SOCIAL).unwrap();
        assert_eq!(social.confidence, 0.3);
        let trading = data.sources.iter().find(|s| s.source == TRADING).unwrap();
        assert_eq!(trading.confidence, 0.5);
        assert_eq!(data.keywords.len(), 4);
    }

    #[tokio::test]
    async fn model_rates_news_and_result_is_cached() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/newsapi/everything")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"articles":[{"title":"Bitcoin rally extends","description":"Institutional buying",
                "publishedAt":"2025-06-01T10:00:00Z","source":{"name":"Wire"},"url":"https://n.test/1"}]}"#,
            )
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/fear-greed/current")
            .with_body(r#"{"value":80}"#)
            .create_async()
            .await;

        let llm = Arc::new(ScriptedLlm::replying(
            r#"{"score":85,"type":"bullish","confidence":0.9,"reasoning":"ETF demand"}"#,
        ));
        let model: Arc<dyn Llm> = llm.clone();
        let svc = service(&testkit::config::with_keys(&server.url()), Some(model));

        let data = svc.analysis().await;
        let news = data.sources.iter().find(|s| s.source == NEWS).unwrap();
        assert_eq!(news.score, 85.0);
        assert_eq!(news.sentiment, Sentiment::Bullish);
        let trading = data.sources.iter().find(|s| s.source == TRADING).unwrap();
        assert_eq!(trading.score, 80.0);
        assert!(llm.prompts()[0].contains("Bitcoin rally extends"));

        assert_eq!(svc.analysis().await, data);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn keyword_scoring_when_model_reply_is_garbage() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/coindesk/rss")
            .with_body(
                "<rss><channel><item><title>Bitcoin surge and rally continue</title>\
                 <link>https://cd.test/a</link><pubDate>Sun, 01 Jun 2025 09:00:00 +0000</pubDate>\
                 </item></channel></rss>",
            )
            .create_async()
            .await;

        let llm: Arc<dyn Llm> = Arc::new(ScriptedLlm::replying("not json"));
        let svc = service(&testkit::config::at(&server.url()), Some(llm));
        let data = svc.analysis().await;
        let news = data.sources.iter().find(|s| s.source == NEWS).unwrap();
        assert_eq!(news.score, 100.0);
    }
}
