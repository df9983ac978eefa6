//! Federal Reserve Economic Data (FRED) client.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "fred";

/// 10-year constant maturity Treasury yield.
pub const TEN_YEAR_SERIES: &str = "DGS10";

/// Consumer Price Index for All Urban Consumers, monthly.
pub const CPI_SERIES: &str = "CPIAUCSL";

/// Client for `api.stlouisfed.org/fred`.
#[derive(Debug, Clone)]
pub struct Fred {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Observations {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Deserialize)]
struct RawObservation {
    #[serde(default)]
    date: String,
    value: String,
}

/// One observation; `value` is `None` where FRED reports `"."` or junk.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: String,
    pub value: Option<f64>,
}

impl Fred {
    /// Without a key the public `demo` key is used.
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.unwrap_or_else(|| "demo".into()),
        }
    }

    /// Up to `limit` observations of `series`, newest first, positions
    /// preserved.
    pub async fn observations(&self, series: &str, limit: usize) -> Result<Vec<Observation>> {
        let limit = limit.to_string();
        let url = build_url(
            &self.base_url,
            "/series/observations",
            &[
                ("series_id", series),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("limit", limit.as_str()),
                ("sort_order", "desc"),
            ],
        )?;
        let body: Observations = self.http.get_json(SOURCE, &url).await?;
        Ok(body
            .observations
            .into_iter()
            .map(|o| Observation {
                value: o.value.parse::<f64>().ok().filter(|v| v.is_finite()),
                date: o.date,
            })
            .collect())
    }

    /// The two most recent numeric observations of `series`, newest first.
    ///
    /// FRED marks missing days with `"."`; those are skipped.
    pub async fn latest_pair(&self, series: &str) -> Result<(f64, f64)> {
        let observations = self.observations(series, 5).await?;
        let mut values = observations.iter().filter_map(|o| o.value);

        match (values.next(), values.next()) {
            (Some(latest), Some(previous)) => Ok((latest, previous)),
            _ => Err(Error::invalid(SOURCE, "fewer than two valid observations")),
        }
    }
}
