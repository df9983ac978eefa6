//! Senate Stock Watcher aggregate file hosted on GitHub.

use serde::Deserialize;

use super::{present, UNKNOWN};
use crate::domain::congress::CongressionalTrade;
use crate::error::Result;
use crate::infrastructure::http::{HttpFetcher, RequestOptions};

const SOURCE: &str = "senate-stock-watcher";

#[derive(Debug, Clone)]
pub struct SenateStockWatcher {
    http: HttpFetcher,
    url: String,
}

#[derive(Deserialize)]
struct Record {
    senator: Option<String>,
    transaction_date: Option<String>,
    ticker: Option<String>,
    asset_description: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    amount: Option<String>,
    ptr_link: Option<String>,
    owner: Option<String>,
}

impl From<Record> for CongressionalTrade {
    fn from(r: Record) -> Self {
        let transaction_type = if r.kind.as_deref().is_some_and(|k| k.contains("Purchase")) {
            "Purchase"
        } else {
            "Sale"
        };
        let date = r.transaction_date.unwrap_or_default();
        Self {
            representative: present(r.senator).unwrap_or_else(|| UNKNOWN.into()),
            district: "Senate".into(),
            // The dataset carries no party affiliation.
            party: UNKNOWN.into(),
            trade_date: date.clone(),
            disclosure_date: date,
            ticker: present(r.ticker).filter(|t| t != "--"),
            asset_description: present(r.asset_description),
            transaction_type: transaction_type.into(),
            amount: r.amount.unwrap_or_default(),
            cap_gains_over_200_usd: false,
            ptr_link: present(r.ptr_link),
            owner: present(r.owner),
        }
    }
}

impl SenateStockWatcher {
    /// `url` is the full address of the aggregate `all_transactions.json`.
    #[must_use]
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn trades(&self) -> Result<Vec<CongressionalTrade>> {
        let url = url::Url::parse(&self.url)?;
        let records: Vec<Record> = self
            .http
            .get_json_with(SOURCE, &url, &RequestOptions::long())
            .await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
