//! House Stock Watcher bulk JSON file.

use serde::Deserialize;
use serde_json::Value;

use super::{present, truthy, UNKNOWN};
use crate::domain::congress::CongressionalTrade;
use crate::error::Result;
use crate::infrastructure::http::{HttpFetcher, RequestOptions};

const SOURCE: &str = "house-stock-watcher";

#[derive(Debug, Clone)]
pub struct HouseStockWatcher {
    http: HttpFetcher,
    url: String,
}

#[derive(Deserialize)]
struct Record {
    representative: Option<String>,
    district: Option<String>,
    party: Option<String>,
    transaction_date: Option<String>,
    trade_date: Option<String>,
    disclosure_date: Option<String>,
    ticker: Option<String>,
    asset_description: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    transaction_type: Option<String>,
    amount: Option<String>,
    cap_gains_over_200_usd: Option<Value>,
    ptr_link: Option<String>,
    owner: Option<String>,
}

impl From<Record> for CongressionalTrade {
    fn from(r: Record) -> Self {
        Self {
            representative: present(r.representative).unwrap_or_else(|| UNKNOWN.into()),
            district: present(r.district).unwrap_or_else(|| UNKNOWN.into()),
            party: present(r.party).unwrap_or_else(|| UNKNOWN.into()),
            trade_date: r.transaction_date.or(r.trade_date).unwrap_or_default(),
            disclosure_date: r.disclosure_date.unwrap_or_default(),
            ticker: present(r.ticker).filter(|t| t != "--"),
            asset_description: present(r.asset_description),
            transaction_type: r.transaction_type.or(r.kind).unwrap_or_default(),
            amount: r.amount.unwrap_or_default(),
            cap_gains_over_200_usd: truthy(r.cap_gains_over_200_usd.as_ref()),
            ptr_link: present(r.ptr_link),
            owner: present(r.owner),
        }
    }
}

impl HouseStockWatcher {
    /// `url` is the full address of `all_transactions.json`.
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
