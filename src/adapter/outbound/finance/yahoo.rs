//! Yahoo Finance chart endpoint, used for quote metadata only.

use serde::Deserialize;

use crate::domain::financial::QuoteMeta;
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "yahoo";

/// CBOE 10-year Treasury yield index, already percent-encoded.
pub const TEN_YEAR_SYMBOL: &str = "%5ETNX";

/// Client for `query1.finance.yahoo.com/v8/finance`.
#[derive(Debug, Clone)]
pub struct Yahoo {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

/// The `chart.result[0].meta` block.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
}

impl ChartMeta {
    fn previous(&self) -> Option<f64> {
        self.previous_close.or(self.chart_previous_close)
    }

    /// Absolute change: reported, else derived from the previous close.
    #[must_use]
    pub fn change(&self) -> Option<f64> {
        self.regular_market_change
            .or_else(|| Some(self.regular_market_price? - self.previous()?))
    }

    /// Percent change: reported, else derived from the previous close.
    #[must_use]
    pub fn change_percent(&self) -> Option<f64> {
        self.regular_market_change_percent.or_else(|| {
            let prev = self.previous().filter(|p| *p != 0.0)?;
            Some((self.regular_market_price? - prev) / prev * 100.0)
        })
    }

    #[must_use]
    pub fn quote_meta(&self) -> QuoteMeta {
        QuoteMeta {
            regular_market_price: self.regular_market_price,
            previous_close: self.previous(),
            regular_market_change_percent: self.regular_market_change_percent,
        }
    }
}

impl Yahoo {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Quote metadata for an already-encoded symbol such as `%5EGSPC`.
    pub async fn meta(&self, symbol: &str) -> Result<ChartMeta> {
        let url = build_url(&self.base_url, &format!("/chart/{symbol}"), &[])?;
        let body: ChartEnvelope = self.http.get_json(SOURCE, &url).await?;
        body.chart
            .and_then(|c| c.result)
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.meta)
            .ok_or_else(|| Error::invalid(SOURCE, "missing chart.result[0].meta"))
    }
}
