//! Base URLs of every third-party API.
//!
//! All of these are overridable so tests can point a service at a local
//! mock server. Paths are appended by the adapters.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub cryptocompare_url: String,
    pub coingecko_url: String,
    pub coincap_url: String,
    pub fred_url: String,
    pub yahoo_url: String,
    pub house_stock_watcher_url: String,
    pub senate_stock_watcher_url: String,
    pub finnhub_url: String,
    pub fmp_url: String,
    pub worldbank_url: String,
    pub newsapi_url: String,
    pub coindesk_rss_url: String,
    pub reddit_url: String,
    pub coinpaprika_url: String,
    pub fear_greed_url: String,
    pub blockchain_url: String,
    pub deribit_url: String,
    pub xai_url: String,
    pub openai_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            cryptocompare_url: "https://min-api.cryptocompare.com/data".into(),
            coingecko_url: "https://api.coingecko.com/api/v3".into(),
            coincap_url: "https://api.coincap.io/v2".into(),
            fred_url: "https://api.stlouisfed.org/fred".into(),
            yahoo_url: "https://query1.finance.yahoo.com/v8/finance".into(),
            house_stock_watcher_url:
                "https://house-stock-watcher-data.s3-us-west-2.amazonaws.com/data/all_transactions.json"
                    .into(),
            senate_stock_watcher_url: "https://raw.githubusercontent.com/timothycarambat/senate-stock-watcher-data/master/aggregate/all_transactions.json".into(),
            finnhub_url: "https://finnhub.io/api/v1".into(),
            fmp_url: "https://financialmodelingprep.com/api/v4".into(),
            worldbank_url: "https://api.worldbank.org/v2".into(),
            newsapi_url: "https://newsapi.org/v2".into(),
            coindesk_rss_url: "https://feeds.coindesk.com/rss".into(),
            reddit_url: "https://www.reddit.com".into(),
            coinpaprika_url: "https://api.coinpaprika.com/v1".into(),
            fear_greed_url: "https://api.coinybubble.com/fear-greed/current".into(),
            blockchain_url: "https://blockchain.info".into(),
            deribit_url: "https://www.deribit.com/api/v2".into(),
            xai_url: "https://api.x.ai/v1".into(),
            openai_url: "https://api.openai.com/v1".into(),
        }
    }
}

impl UpstreamConfig {
    /// Every URL with the same base, for pointing all adapters at one mock
    /// server. Fixed-file sources get distinct paths under the base.
    #[must_use]
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            cryptocompare_url: format!("{base}/cryptocompare"),
            coingecko_url: format!("{base}/coingecko"),
            coincap_url: format!("{base}/coincap"),
            fred_url: format!("{base}/fred"),
            yahoo_url: format!("{base}/yahoo"),
            house_stock_watcher_url: format!("{base}/house/all_transactions.json"),
            senate_stock_watcher_url: format!("{base}/senate/all_transactions.json"),
            finnhub_url: format!("{base}/finnhub"),
            fmp_url: format!("{base}/fmp"),
            worldbank_url: format!("{base}/worldbank"),
            newsapi_url: format!("{base}/newsapi"),
            coindesk_rss_url: format!("{base}/coindesk/rss"),
            reddit_url: format!("{base}/reddit"),
            coinpaprika_url: format!("{base}/coinpaprika"),
            fear_greed_url: format!("{base}/fear-greed/current"),
            blockchain_url: format!("{base}/blockchain"),
            deribit_url: format!("{base}/deribit"),
            xai_url: format!("{base}/xai"),
            openai_url: format!("{base}/openai"),
        }
    }

    pub(crate) fn fields(&self) -> [(&'static str, &str); 19] {
        [
            ("upstream.cryptocompare_url", &self.cryptocompare_url),
            ("upstream.coingecko_url", &self.coingecko_url),
            ("upstream.coincap_url", &self.coincap_url),
            ("upstream.fred_url", &self.fred_url),
            ("upstream.yahoo_url", &self.yahoo_url),
            ("upstream.house_stock_watcher_url", &self.house_stock_watcher_url),
            ("upstream.senate_stock_watcher_url", &self.senate_stock_watcher_url),
            ("upstream.finnhub_url", &self.finnhub_url),
            ("upstream.fmp_url", &self.fmp_url),
            ("upstream.worldbank_url", &self.worldbank_url),
            ("upstream.newsapi_url", &self.newsapi_url),
            ("upstream.coindesk_rss_url", &self.coindesk_rss_url),
            ("upstream.reddit_url", &self.reddit_url),
            ("upstream.coinpaprika_url", &self.coinpaprika_url),
            ("upstream.fear_greed_url", &self.fear_greed_url),
            ("upstream.blockchain_url", &self.blockchain_url),
            ("upstream.deribit_url", &self.deribit_url),
            ("upstream.xai_url", &self.xai_url),
            ("upstream.openai_url", &self.openai_url),
        ]
    }
}
