//! Finnhub congressional trading endpoint. Needs `FINNHUB_API_KEY`.

use serde::Deserialize;

use super::{present, UNKNOWN};
use crate::domain::congress::CongressionalTrade;
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "finnhub";

#[derive(Debug, Clone)]
pub struct Finnhub {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    representative: Option<String>,
    district: Option<String>,
    party: Option<String>,
    transaction_date: Option<String>,
    filing_date: Option<String>,
    symbol: Option<String>,
    asset_description: Option<String>,
    transaction_type: Option<String>,
    amount: Option<String>,
    link: Option<String>,
    owner: Option<String>,
}

impl From<Record> for CongressionalTrade {
    fn from(r: Record) -> Self {
        let symbol = present(r.symbol);
        let description = present(r.asset_description)
            .or_else(|| symbol.as_ref().map(|s| format!("{s} stock")));
        let transaction_type = if r.transaction_type.as_deref() == Some("S") {
            "Sale"
        } else {
            "Purchase"
        };
        Self {
            representative: present(r.representative).unwrap_or_else(|| UNKNOWN.into()),
            district: present(r.district).unwrap_or_else(|| UNKNOWN.into()),
            party: present(r.party).unwrap_or_else(|| UNKNOWN.into()),
            trade_date: r
                .transaction_date
                .clone()
                .or_else(|| r.filing_date.clone())
                .unwrap_or_default(),
            disclosure_date: r.filing_date.or(r.transaction_date).unwrap_or_default(),
            ticker: symbol,
            asset_description: description,
            transaction_type: transaction_type.into(),
            amount: present(r.amount).unwrap_or_else(|| "$1,000 - $15,000".into()),
            cap_gains_over_200_usd: false,
            ptr_link: Some(present(r.link).unwrap_or_else(|| "#".into())),
            owner: Some(present(r.owner).unwrap_or_else(|| "Self".into())),
        }
    }
}

impl Finnhub {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// # Errors
    ///
    /// [`Error::Config`] without an API key, otherwise the request's error.
    pub async fn trades(&self) -> Result<Vec<CongressionalTrade>> {
        let key = self.api_key.as_deref().ok_or(Error::Config(
            crate::error::ConfigError::MissingField {
                field: "FINNHUB_API_KEY",
            },
        ))?;
        let url = build_url(
            &self.base_url,
            "/stock/congressional-trading",
            &[("token", key)],
        )?;
        let records: Vec<Record> = self.http.get_json(SOURCE, &url).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
