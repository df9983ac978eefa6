//! Deribit public API: option book summaries.

use serde::Deserialize;

use crate::domain::options::BookSummary;
use crate::error::Result;
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "deribit";

#[derive(Debug, Clone)]
pub struct Deribit {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Vec<RawBook>,
}

#[derive(Deserialize)]
struct RawBook {
    instrument_name: String,
    open_interest: Option<f64>,
    volume: Option<f64>,
    mark_iv: Option<f64>,
    mark_price: Option<f64>,
    greeks: Option<RawGreeks>,
}

#[derive(Deserialize, Default)]
struct RawGreeks {
    delta: Option<f64>,
    gamma: Option<f64>,
    vega: Option<f64>,
    theta: Option<f64>,
}

impl From<RawBook> for BookSummary {
    fn from(raw: RawBook) -> Self {
        let greeks = raw.greeks.unwrap_or_default();
        Self {
            instrument_name: raw.instrument_name,
            open_interest: raw.open_interest.unwrap_or(0.0),
            volume: raw.volume.unwrap_or(0.0),
            mark_iv: raw.mark_iv.unwrap_or(0.0),
            mark_price: raw.mark_price.unwrap_or(0.0),
            delta: greeks.delta.unwrap_or(0.0),
            gamma: greeks.gamma.unwrap_or(0.0),
            vega: greeks.vega.unwrap_or(0.0),
            theta: greeks.theta.unwrap_or(0.0),
        }
    }
}

impl Deribit {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Book summaries for every BTC option.
    pub async fn btc_option_books(&self) -> Result<Vec<BookSummary>> {
        let url = build_url(
            &self.base_url,
            "/public/get_book_summary_by_currency",
            &[("currency", "BTC"), ("kind", "option")],
        )?;
        let body: Envelope = self.http.get_json(SOURCE, &url).await?;
        Ok(body.result.into_iter().map(BookSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn missing_fields_default_to_zero() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/public/get_book_summary_by_currency")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("currency".into(), "BTC".into()),
                Matcher::UrlEncoded("kind".into(), "option".into()),
            ]))
            .with_body(
                r#"{"jsonrpc":"2.0","result":[
                {"instrument_name":"BTC-28MAR25-100000-C","open_interest":12.5,"volume":3.0,
                 "mark_iv":55.1,"mark_price":0.02,"greeks":{"delta":0.41}},
                {"instrument_name":"BTC-28MAR25-90000-P","mark_iv":null}]}"#,
            )
            .create_async()
            .await;

        let client = Deribit::new(HttpFetcher::from_config(&HttpConfig::default()), server.url());
        let books = client.btc_option_books().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].open_interest, 12.5);
        assert_eq!(books[0].delta, 0.41);
        assert_eq!(books[0].gamma, 0.0);
        assert_eq!(books[1].mark_iv, 0.0);
        assert_eq!(books[1].volume, 0.0);
    }
}
