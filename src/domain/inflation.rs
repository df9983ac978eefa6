//! US consumer price inflation from monthly CPI readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::financial::round_to;

/// Index of the reading twelve months before the newest one.
const YEAR_AGO_INDEX: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationData {
    /// Year-over-year CPI change in percent, two decimals.
    pub rate: f64,
    /// Month-over-month CPI change in percent, three decimals.
    pub change: f64,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

impl InflationData {
    /// Compute from CPI readings ordered newest first, with `None` for
    /// missing months.
    ///
    /// The current reading is the first present one; the monthly and yearly
    /// comparators are the first present readings at index 1 and 11 or
    /// later.
    #[must_use]
    pub fn from_cpi(readings: &[Option<f64>], now: DateTime<Utc>) -> Option<Self> {
        let first_from = |start: usize| readings.iter().skip(start).flatten().copied().next();

        let current = first_from(0)?;
        let year_ago = first_from(YEAR_AGO_INDEX).filter(|v| *v > 0.0)?;
        let monthly = first_from(1)
            .filter(|prev| *prev > 0.0)
            .map_or(0.0, |prev| (current - prev) / prev * 100.0);

        Some(Self {
            rate: round_to((current - year_ago) / year_ago * 100.0, 2),
            change: round_to(monthly, 3),
            last_updated: now,
            source: "FRED API (CPIAUCSL)".into(),
        })
    }

    #[must_use]
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            rate: 2.4,
            change: 0.1,
            last_updated: now,
            source: "Fallback estimate".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpi(newest: f64, prev: f64, year_ago: f64) -> Vec<Option<f64>> {
        let mut readings = vec![Some(newest), Some(prev)];
        readings.extend(std::iter::repeat(Some(prev)).take(9));
        readings.push(Some(year_ago));
        readings.push(Some(year_ago - 1.0));
        readings
    }

    #[test]
    fn year_over_year_and_monthly_rates() {
        let data = InflationData::from_cpi(&cpi(322.0, 320.0, 313.0), Utc::now()).unwrap();
        assert_eq!(data.rate, 2.88);
        assert_eq!(data.change, 0.625);
        assert_eq!(data.source, "FRED API (CPIAUCSL)");
    }

    #[test]
    fn missing_months_shift_to_next_reading() {
        let mut readings = cpi(322.0, 320.0, 313.0);
        readings[0] = None;
        readings[YEAR_AGO_INDEX] = None;
        let data = InflationData::from_cpi(&readings, Utc::now()).unwrap();
        // current becomes 320.0, year-ago becomes 312.0
        assert_eq!(data.rate, 2.56);
        assert_eq!(data.change, 0.0);
    }

    #[test]
    fn short_history_is_rejected() {
        let readings = vec![Some(321.0); YEAR_AGO_INDEX];
        assert!(InflationData::from_cpi(&readings, Utc::now()).is_none());
        assert!(InflationData::from_cpi(&[], Utc::now()).is_none());
    }
}
