//! World Bank Open Data API v2.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::economy::DataPoint;
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "worldbank";

#[derive(Debug, Clone)]
pub struct WorldBank {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct RawPoint {
    indicator: Option<RawIndicator>,
    date: Option<String>,
    value: Option<f64>,
    #[serde(default)]
    unit: String,
}

#[derive(Deserialize)]
struct RawIndicator {
    id: String,
}

impl WorldBank {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// The `years` most recent observations of `indicator` for `country`,
    /// with null values dropped.
    ///
    /// The response is `[paging, [points]]`; an error payload has only the
    /// first element.
    pub async fn observations(
        &self,
        country: &str,
        indicator: &str,
        years: u32,
    ) -> Result<Vec<DataPoint>> {
        let mrv = years.to_string();
        let url = build_url(
            &self.base_url,
            &format!("/country/{country}/indicator/{indicator}"),
            &[("format", "json"), ("mrv", mrv.as_str())],
        )?;
        let mut body: Vec<Value> = self.http.get_json(SOURCE, &url).await?;
        if body.len() < 2 || !body[1].is_array() {
            return Err(Error::invalid(SOURCE, "missing data page"));
        }
        let points: Vec<RawPoint> = serde_json::from_value(body.swap_remove(1))?;

        Ok(points
            .into_iter()
            .filter_map(|p| {
                Some(DataPoint {
                    indicator_id: p
                        .indicator
                        .map_or_else(|| indicator.to_string(), |i| i.id),
                    date: p.date?,
                    value: p.value?,
                    unit: p.unit,
                })
            })
            .collect())
    }
}
