//! World Bank economic indicators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of an indicator for a country and year.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub indicator_id: String,
    pub date: String,
    pub value: f64,
    pub unit: String,
}

impl DataPoint {
    fn year(&self) -> i64 {
        self.date.trim().parse().unwrap_or(i64::MIN)
    }
}

/// Latest value of an indicator with its change versus the previous year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicator {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub date: String,
    pub unit: String,
    /// Percent change vs the previous observation; `None` with a single point.
    pub change: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub usgdp: Option<EconomicIndicator>,
    pub inflation: Option<EconomicIndicator>,
    pub unemployment: Option<EconomicIndicator>,
    pub money_supply: Option<EconomicIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEconomicData {
    pub last_updated: DateTime<Utc>,
    pub us_indicators: Vec<EconomicIndicator>,
    pub global_indicators: Vec<EconomicIndicator>,
    pub key_metrics: KeyMetrics,
}

/// `(date, value)` pair of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// A tracked indicator: code, display name and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const US: &str = "USA";
pub const WORLD: &str = "WLD";
/// Observations requested per dashboard indicator.
pub const DASHBOARD_YEARS: u32 = 3;

/// US indicators in dashboard order: GDP, growth, inflation, unemployment,
/// real rate, broad money, debt.
pub const US_INDICATORS: [IndicatorSpec; 7] = [
    IndicatorSpec {
        code: "NY.GDP.MKTP.CD",
        name: "US GDP",
        description: "United States Gross Domestic Product (current US$)",
    },
    IndicatorSpec {
        code: "NY.GDP.MKTP.KD.ZG",
        name: "US GDP Growth",
        description: "United States GDP growth rate (annual %)",
    },
    IndicatorSpec {
        code: "FP.CPI.TOTL.ZG",
        name: "US Inflation",
        description: "United States consumer price inflation (annual %)",
    },
    IndicatorSpec {
        code: "SL.UEM.TOTL.ZS",
        name: "US Unemployment",
        description: "United States unemployment rate (% of labor force)",
    },
    IndicatorSpec {
        code: "FR.INR.RINR",
        name: "US Interest Rate",
        description: "United States real interest rate (%)",
    },
    IndicatorSpec {
        code: "FM.LBL.BMNY.GD.ZS",
        name: "US Money Supply",
        description: "United States broad money (% of GDP)",
    },
    IndicatorSpec {
        code: "GC.DOD.TOTL.GD.ZS",
        name: "US Government Debt",
        description: "United States central government debt (% of GDP)",
    },
];

pub const GLOBAL_INDICATORS: [IndicatorSpec; 3] = [
    IndicatorSpec {
        code: "NY.GDP.MKTP.CD",
        name: "Global GDP",
        description: "World Gross Domestic Product (current US$)",
    },
    IndicatorSpec {
        code: "FP.CPI.TOTL.ZG",
        name: "Global Inflation",
        description: "World consumer price inflation (annual %)",
    },
    IndicatorSpec {
        code: "NE.TRD.GNFS.ZS",
        name: "Global Trade",
        description: "World trade as percentage of GDP",
    },
];

/// Display unit for an indicator code.
#[must_use]
pub fn unit_for(code: &str, upstream_unit: &str) -> String {
    if code.contains("NY.GDP.MKTP.CD") {
        return "USD".into();
    }
    if code.contains(".ZG") || code.contains(".ZS") || code.contains("FR.INR") || code.contains("RINR") {
        return "%".into();
    }
    upstream_unit.to_string()
}

/// Percent change, zero when the previous value is zero.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Summarise observations into the latest value and its change.
#[must_use]
pub fn format_indicator(
    mut points: Vec<DataPoint>,
    name: &str,
    description: &str,
) -> Option<EconomicIndicator> {
    points.sort_by_key(|p| std::cmp::Reverse(p.year()));
    let latest = points.first()?;
    let change = points
        .get(1)
        .map(|previous| percent_change(latest.value, previous.value));
    Some(EconomicIndicator {
        id: latest.indicator_id.clone(),
        name: name.to_string(),
        value: latest.value,
        date: latest.date.clone(),
        unit: unit_for(&latest.indicator_id, &latest.unit),
        change,
        description: description.to_string(),
    })
}

/// Observations as a series sorted by ascending year.
#[must_use]
pub fn time_series(points: Vec<DataPoint>) -> Vec<SeriesPoint> {
    let mut points = points;
    points.sort_by_key(DataPoint::year);
    points
        .into_iter()
        .map(|p| SeriesPoint {
            date: p.date,
            value: p.value,
        })
        .collect()
}

impl GlobalEconomicData {
    /// Assemble from formatted indicators in [`US_INDICATORS`] and
    /// [`GLOBAL_INDICATORS`] order.
    #[must_use]
    pub fn assemble(
        us: Vec<Option<EconomicIndicator>>,
        global: Vec<Option<EconomicIndicator>>,
        now: DateTime<Utc>,
    ) -> Self {
        let pick = |i: usize| us.get(i).cloned().flatten();
        let key_metrics = KeyMetrics {
            usgdp: pick(0),
            inflation: pick(2),
            unemployment: pick(3),
            money_supply: pick(5),
        };
        Self {
            last_updated: now,
            us_indicators: us.into_iter().flatten().collect(),
            global_indicators: global.into_iter().flatten().collect(),
            key_metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(code: &str, date: &str, value: f64) -> DataPoint {
        DataPoint {
            indicator_id: code.into(),
            date: date.into(),
            value,
            unit: String::new(),
        }
    }

    #[test]
    fn units_by_code() {
        assert_eq!(unit_for("NY.GDP.MKTP.CD", ""), "USD");
        assert_eq!(unit_for("FP.CPI.TOTL.ZG", ""), "%");
        assert_eq!(unit_for("SL.UEM.TOTL.ZS", ""), "%");
        assert_eq!(unit_for("FR.INR.RINR", ""), "%");
        assert_eq!(unit_for("SP.POP.TOTL", "people"), "people");
    }

    #[test]
    fn change_against_zero_is_zero() {
        assert_eq!(percent_change(5.0, 0.0), 0.0);
        assert_eq!(percent_change(110.0, 100.0), 10.0);
    }

    #[test]
    fn format_uses_latest_year() {
        let points = vec![
            point("FP.CPI.TOTL.ZG", "2021", 4.7),
            point("FP.CPI.TOTL.ZG", "2023", 4.1),
            point("FP.CPI.TOTL.ZG", "2022", 8.0),
        ];
        let ind = format_indicator(points, "US Inflation", "desc").unwrap();
        assert_eq!(ind.date, "2023");
        assert_eq!(ind.value, 4.1);
        assert_eq!(ind.unit, "%");
        assert!((ind.change.unwrap() - (-48.75)).abs() < 1e-9);
    }

    #[test]
    fn single_point_has_no_change() {
        let ind = format_indicator(vec![point("X", "2020", 1.0)], "X", "X").unwrap();
        assert_eq!(ind.change, None);
        assert!(format_indicator(Vec::new(), "X", "X").is_none());
    }

    #[test]
    fn series_ascending() {
        let series = time_series(vec![point("X", "2022", 2.0), point("X", "2020", 0.0)]);
        assert_eq!(series[0].date, "2020");
        assert_eq!(series[1].value, 2.0);
    }

    #[test]
    fn assemble_picks_key_metrics() {
        let ind = |name: &str| {
            format_indicator(vec![point("NY.GDP.MKTP.CD", "2023", 1.0)], name, "").unwrap()
        };
        let us = vec![Some(ind("gdp")), None, Some(ind("cpi")), None, None, Some(ind("m2")), None];
        let data = GlobalEconomicData::assemble(us, vec![None, None, None], Utc::now());
        assert_eq!(data.us_indicators.len(), 3);
        assert!(data.global_indicators.is_empty());
        assert_eq!(data.key_metrics.usgdp.as_ref().unwrap().name, "gdp");
        assert_eq!(data.key_metrics.inflation.as_ref().unwrap().name, "cpi");
        assert!(data.key_metrics.unemployment.is_none());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["keyMetrics"]["moneySupply"]["name"], "m2");
        assert!(json["usIndicators"].is_array());
    }
}
