//! Financial Modeling Prep House and Senate trading endpoints. Needs
//! `FMP_API_KEY`.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{full_name, present, truthy, UNKNOWN};
use crate::domain::congress::CongressionalTrade;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher, RequestOptions};

const SOURCE: &str = "fmp";

#[derive(Debug, Clone)]
pub struct Fmp {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    first_name: Option<String>,
    last_name: Option<String>,
    office: Option<String>,
    district: Option<String>,
    transaction_date: Option<String>,
    disclosure_date: Option<String>,
    date_received: Option<String>,
    symbol: Option<String>,
    asset_description: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    amount: Option<String>,
    #[serde(rename = "capitalGainsOver200USD")]
    capital_gains_over_200_usd: Option<Value>,
    link: Option<String>,
    owner: Option<String>,
}

/// District from `office`, e.g. `"Jane Doe (CA12)"` gives `CA12`.
fn district_from_office(office: Option<&str>) -> Option<String> {
    let office = office?;
    let start = office.find('(')? + 1;
    let end = start + office[start..].find(')')?;
    present(Some(office[start..end].to_string()))
}

impl Record {
    fn into_trade(self, district: String) -> CongressionalTrade {
        let transaction_type = if self.kind.as_deref().is_some_and(|k| k.contains("Sale")) {
            "Sale"
        } else {
            "Purchase"
        };
        CongressionalTrade {
            representative: full_name(self.first_name, self.last_name),
            district,
            party: UNKNOWN.into(),
            trade_date: self.transaction_date.unwrap_or_default(),
            disclosure_date: self
                .disclosure_date
                .or(self.date_received)
                .unwrap_or_default(),
            ticker: present(self.symbol),
            asset_description: present(self.asset_description),
            transaction_type: transaction_type.into(),
            amount: self.amount.unwrap_or_default(),
            cap_gains_over_200_usd: truthy(self.capital_gains_over_200_usd.as_ref()),
            ptr_link: present(self.link),
            owner: present(self.owner),
        }
    }
}

impl Fmp {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch(&self, key: &str, path: &str) -> Result<Vec<Record>> {
        let url = build_url(&self.base_url, path, &[("apikey", key)])?;
        let options = RequestOptions::default().header("X-API-KEY", key);
        self.http.get_json_with(SOURCE, &url, &options).await
    }

    /// House and Senate trades fetched together. Either side may fail; the
    /// call fails only when neither produced a trade.
    pub async fn trades(&self) -> Result<Vec<CongressionalTrade>> {
        let key = self.api_key.as_deref().ok_or(Error::Config(ConfigError::MissingField {
            field: "FMP_API_KEY",
        }))?;

        let (house, senate) = futures_util::join!(
            self.fetch(key, "/house-trades"),
            self.fetch(key, "/senate-trading")
        );

        let mut trades = Vec::new();
        match house {
            Ok(records) => trades.extend(records.into_iter().map(|r| {
                let district = present(r.district.clone())
                    .filter(|d| d != UNKNOWN)
                    .or_else(|| district_from_office(r.office.as_deref()))
                    .unwrap_or_else(|| UNKNOWN.into());
                r.into_trade(district)
            })),
            Err(e) => warn!(error = %e, "FMP house trades unavailable"),
        }
        match senate {
            Ok(records) => {
                trades.extend(records.into_iter().map(|r| r.into_trade("Senate".into())));
            }
            Err(e) => warn!(error = %e, "FMP senate trades unavailable"),
        }

        if trades.is_empty() {
            return Err(Error::invalid(SOURCE, "no trades from house or senate"));
        }
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::{Matcher, Server};

    fn source(base: &str) -> Fmp {
        Fmp::new(
            HttpFetcher::from_config(&HttpConfig::default()),
            base,
            Some("fmp-key".into()),
        )
    }

    #[test]
    fn district_parsed_from_office() {
        assert_eq!(district_from_office(Some("Jane Doe (TX07)")), Some("TX07".into()));
        assert_eq!(district_from_office(Some("Jane Doe")), None);
        assert_eq!(district_from_office(None), None);
    }

    #[tokio::test]
    async fn senate_only_is_enough() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/house-trades")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;
        server
            .mock("GET", "/senate-trading")
            .match_query(Matcher::UrlEncoded("apikey".into(), "fmp-key".into()))
            .with_body(
                r#"[{"firstName":"John","lastName":"Roe","transactionDate":"2024-02-10",
                "dateReceived":"2024-02-20","symbol":"NVDA","type":"Sale (Full)",
                "capitalGainsOver200USD":"True","amount":"$50,001 - $100,000"}]"#,
            )
            .create_async()
            .await;

        let trades = source(&server.url()).trades().await.unwrap();
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.representative, "John Roe");
        assert_eq!(t.district, "Senate");
        assert_eq!(t.transaction_type, "Sale");
        assert_eq!(t.disclosure_date, "2024-02-20");
        assert!(t.cap_gains_over_200_usd);
    }

    #[tokio::test]
    async fn both_sides_failing_is_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        assert!(source(&server.url()).trades().await.is_err());
    }
}
