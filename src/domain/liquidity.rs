//! Money supply and Fed balance sheet indicators with year-over-year change
//! and anomaly flags.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::sentiment::Sentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Observations to request so that a year-ago reading is included.
    #[must_use]
    pub const fn observation_limit(self) -> usize {
        match self {
            Self::Daily => 400,
            Self::Weekly => 80,
            Self::Monthly => 24,
            Self::Quarterly => 12,
        }
    }

    /// Allowed distance in days from exactly one year back.
    const fn tolerance_days(self) -> i64 {
        match self {
            Self::Quarterly => 45,
            _ => 30,
        }
    }
}

/// Unit the series is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawUnit {
    Billions,
    Millions,
    Percent,
    Index,
}

impl RawUnit {
    /// Dollar series become billions; others are unchanged.
    #[must_use]
    pub fn normalize(self, raw: f64) -> f64 {
        match self {
            Self::Millions => raw / 1000.0,
            _ => raw,
        }
    }

    const fn display_unit(self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::Index => "Index",
            Self::Billions | Self::Millions => "Billions USD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Velocity,
    Policy,
    FedHoldings,
}

/// A FRED series tracked on the liquidity page.
#[derive(Debug, Clone, Copy)]
pub struct LiquiditySeries {
    pub series_id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub frequency: Frequency,
    pub raw_unit: RawUnit,
    pub description: &'static str,
    /// Absolute YoY percent change above which the reading is flagged.
    pub anomaly_threshold: f64,
    pub category: Category,
}

#[allow(clippy::too_many_arguments)]
const fn series(
    series_id: &'static str,
    name: &'static str,
    short_name: &'static str,
    frequency: Frequency,
    raw_unit: RawUnit,
    anomaly_threshold: f64,
    category: Category,
    description: &'static str,
) -> LiquiditySeries {
    LiquiditySeries {
        series_id,
        name,
        short_name,
        frequency,
        raw_unit,
        description,
        anomaly_threshold,
        category,
    }
}

use self::Category::{Core, FedHoldings, Policy, Velocity};
use self::Frequency::{Daily, Monthly, Quarterly, Weekly};
use self::RawUnit::{Billions, Index, Millions, Percent};

/// Core series in display order, then velocity, policy and Fed holdings.
#[rustfmt::skip]
pub const LIQUIDITY_SERIES: [LiquiditySeries; 13] = [
    series("M2SL", "M2 Money Stock", "M2", Monthly, Billions, 5.0, Core,
        "Broad money supply (cash + deposits + near-monies). YoY spikes >10% often precede inflation or asset bubbles."),
    series("M1SL", "M1 Money Stock", "M1", Monthly, Billions, 5.0, Core,
        "Narrowest measure (cash + checking). Watch for velocity traps or sudden contractions signaling credit crunches."),
    series("RRPONTSYD", "Overnight Reverse Repo (RRP)", "RRP", Daily, Billions, 10.0, Core,
        "Fed's \"parking lot\" for excess cash. Jumps >$2T indicate liquidity hoarding, sterilizing money supply growth."),
    series("WTREGEN", "Treasury General Account (TGA)", "TGA", Weekly, Millions, 15.0, Core,
        "Government's \"checking account\" at Fed. Drawdowns inject reserves, builds drain it. Key for QT/QE pivots."),
    series("WALCL", "Fed Total Assets (Balance Sheet)", "Fed BS", Weekly, Millions, 5.0, Core,
        "Fed's full firepower. Expansions >$1T/quarter signal monetization, correlating with M2 surges and risk-on rallies."),
    series("WRESBAL", "Bank Reserve Balances", "Reserves", Weekly, Millions, 10.0, Core,
        "Bank excess reserves. Floods here (>$3T) mute rate signals, but rapid drains can spike interbank rates."),
    series("CURRCIR", "Currency in Circulation", "Currency", Monthly, Billions, 5.0, Core,
        "Physical dollars abroad/hoarded. Steady climbs amid digital shifts signal de-dollarization fears."),
    series("BOGMBASE", "Monetary Base", "M0", Monthly, Billions, 5.0, Core,
        "High-powered money (reserves + currency). Divergences from M2 highlight multiplier breakdowns."),
    series("M2V", "Velocity of M2 Money Stock", "M2 Velocity", Quarterly, Index, 5.0, Velocity,
        "Money circulation speed. Plunges signal hoarding/trapped liquidity, amplifying debasement risks without growth."),
    series("M1V", "Velocity of M1 Money Stock", "M1 Velocity", Quarterly, Index, 5.0, Velocity,
        "Transaction money velocity. Divergences from M2V highlight credit freezes or digital payment shifts."),
    series("FEDFUNDS", "Effective Federal Funds Rate", "Fed Funds", Monthly, Percent, 20.0, Policy,
        "Policy barometer. Spikes correlate with reserve crunches; overlay with Reserves for irregularity alerts."),
    series("TREAST", "Treasury Securities Held by Fed", "Fed Treasuries", Weekly, Millions, 5.0, FedHoldings,
        "Balance sheet breakdown. Surges indicate QE monetization, inflating base irregularly. Track vs Fed BS for asset mix."),
    series("WSHOMCB", "Mortgage-Backed Securities Held by Fed", "Fed MBS", Weekly, Millions, 5.0, FedHoldings,
        "QE relic. Runoffs drain liquidity subtly. Anomalies presage housing/credit distortions."),
];

/// Latest reading and its year-ago comparator, in the series' raw unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoyReading {
    pub value: f64,
    pub previous: f64,
    pub date: NaiveDate,
}

/// Days of history below which the oldest reading is not a usable
/// comparator.
const MIN_HISTORY_DAYS: i64 = 270;

impl YoyReading {
    /// Pick the latest value and a comparator roughly one year older from
    /// dated readings, newest first.
    ///
    /// Falls back to the oldest reading when none lands in the window, as
    /// long as it is at least nine months back. A zero comparator is
    /// rejected.
    #[must_use]
    pub fn pick(points: &[(NaiveDate, f64)], frequency: Frequency) -> Option<Self> {
        let [(date, value), .., oldest] = points else {
            return None;
        };
        let days_back = |d: &NaiveDate| (*date - *d).num_days().abs();
        let window = (365 - frequency.tolerance_days())..=(365 + frequency.tolerance_days());

        let previous = match points.iter().find(|(d, _)| window.contains(&days_back(d))) {
            Some((_, v)) => *v,
            None if days_back(&oldest.0) >= MIN_HISTORY_DAYS => oldest.1,
            None => return None,
        };
        (previous != 0.0).then_some(Self {
            value: *value,
            previous,
            date: *date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityIndicator {
    pub series_id: String,
    pub name: String,
    pub short_name: String,
    pub value: f64,
    pub display_value: String,
    pub previous_value: f64,
    pub yoy_change: f64,
    pub yoy_change_percent: f64,
    pub date: String,
    pub frequency: Frequency,
    pub unit: String,
    pub raw_unit: RawUnit,
    pub description: String,
    pub is_anomaly: bool,
    pub anomaly_threshold: f64,
    pub category: Category,
}

impl LiquidityIndicator {
    #[must_use]
    pub fn new(series: &LiquiditySeries, reading: YoyReading) -> Self {
        let value = series.raw_unit.normalize(reading.value);
        let previous_value = series.raw_unit.normalize(reading.previous);
        let yoy_change = value - previous_value;
        let yoy_change_percent = yoy_change / previous_value * 100.0;

        Self {
            series_id: series.series_id.into(),
            name: series.name.into(),
            short_name: series.short_name.into(),
            value,
            display_value: display_value(value, series.raw_unit),
            previous_value,
            yoy_change,
            yoy_change_percent,
            date: reading.date.format("%Y-%m-%d").to_string(),
            frequency: series.frequency,
            unit: series.raw_unit.display_unit().into(),
            raw_unit: series.raw_unit,
            description: series.description.into(),
            is_anomaly: yoy_change_percent.abs() > series.anomaly_threshold,
            anomaly_threshold: series.anomaly_threshold,
            category: series.category,
        }
    }
}

/// `$1.23T`, `$45.60B`, `$120.00M`, `4.33%` or `1.39`.
#[must_use]
pub fn display_value(value: f64, unit: RawUnit) -> String {
    match unit {
        RawUnit::Percent => format!("{value:.2}%"),
        RawUnit::Index => format!("{value:.2}"),
        RawUnit::Billions | RawUnit::Millions => {
            if value >= 1000.0 {
                format!("${:.2}T", value / 1000.0)
            } else if value >= 1.0 {
                format!("${value:.2}B")
            } else {
                format!("${:.2}M", value * 1000.0)
            }
        }
    }
}

/// A ratio or spread computed from several indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetric {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub value: f64,
    pub display_value: String,
    pub description: String,
    pub is_anomaly: bool,
    pub anomaly_threshold: f64,
    pub formula: String,
}

/// Net liquidity in billions below which conditions count as tight.
const NET_LIQUIDITY_FLOOR: f64 = 2000.0;
const NET_LIQUIDITY_HIGH: f64 = 5000.0;

fn find<'a>(indicators: &'a [LiquidityIndicator], id: &str) -> Option<&'a LiquidityIndicator> {
    indicators.iter().find(|i| i.series_id == id)
}

/// Net liquidity, the M2/M0 multiplier and the reserve ratio, for
/// whichever of them have their inputs.
#[must_use]
pub fn derived_metrics(indicators: &[LiquidityIndicator]) -> Vec<DerivedMetric> {
    let fed_bs = find(indicators, "WALCL");
    let tga = find(indicators, "WTREGEN");
    let rrp = find(indicators, "RRPONTSYD");
    let m2 = find(indicators, "M2SL");
    let m0 = find(indicators, "BOGMBASE");
    let reserves = find(indicators, "WRESBAL");

    let mut derived = Vec::new();
    if let (Some(fed_bs), Some(tga), Some(rrp)) = (fed_bs, tga, rrp) {
        let net = fed_bs.value - tga.value - rrp.value;
        derived.push(DerivedMetric {
            id: "net_liquidity".into(),
            name: "Net Liquidity Proxy".into(),
            short_name: "Net Liq".into(),
            value: net,
            display_value: display_value(net, RawUnit::Billions),
            description: "Fed BS - TGA - RRP. Effective reserves measure. Low levels (<$2T) precede risk-off moves.".into(),
            is_anomaly: net < NET_LIQUIDITY_FLOOR,
            anomaly_threshold: NET_LIQUIDITY_FLOOR,
            formula: "Fed Total Assets - TGA - RRP".into(),
        });
    }
    if let (Some(m2), Some(m0)) = (m2, m0.filter(|m0| m0.value > 0.0)) {
        let ratio = m2.value / m0.value;
        derived.push(DerivedMetric {
            id: "debasement_ratio".into(),
            name: "Money Multiplier (Debasement Ratio)".into(),
            short_name: "M2/M0".into(),
            value: ratio,
            display_value: format!("{ratio:.2}x"),
            description: "M2 / M0. Rising multiplier shows credit amplification. High values (>4.5x) signal excess leverage.".into(),
            is_anomaly: !(3.5..=4.5).contains(&ratio),
            anomaly_threshold: 4.5,
            formula: "M2 Money Stock / Monetary Base".into(),
        });
    }
    if let (Some(reserves), Some(fed_bs)) = (reserves, fed_bs.filter(|f| f.value > 0.0)) {
        let ratio = reserves.value / fed_bs.value * 100.0;
        derived.push(DerivedMetric {
            id: "reserve_ratio".into(),
            name: "Reserve to Fed Assets Ratio".into(),
            short_name: "Rsv/Fed".into(),
            value: ratio,
            display_value: format!("{ratio:.1}%"),
            description: "Bank reserves as % of Fed BS. Drops below 30% signal tightening stress.".into(),
            is_anomaly: !(30.0..=50.0).contains(&ratio),
            anomaly_threshold: 30.0,
            formula: "Bank Reserves / Fed Total Assets".into(),
        });
    }
    derived
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySummary {
    pub total_indicators: usize,
    pub anomaly_count: usize,
    pub overall_signal: Sentiment,
    pub signal_reasons: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityData {
    pub indicators: Vec<LiquidityIndicator>,
    pub derived_metrics: Vec<DerivedMetric>,
    pub anomalies: Vec<LiquidityIndicator>,
    pub summary: LiquiditySummary,
}

impl LiquidityData {
    /// Order the indicators, derive the composite metrics and read the
    /// overall signal.
    #[must_use]
    pub fn assemble(mut indicators: Vec<LiquidityIndicator>, now: DateTime<Utc>) -> Self {
        let rank = |i: &LiquidityIndicator| {
            let within = LIQUIDITY_SERIES
                .iter()
                .position(|s| s.category == Category::Core && s.series_id == i.series_id)
                .unwrap_or(0);
            (i.category, within)
        };
        indicators.sort_by_key(rank);

        let derived_metrics = derived_metrics(&indicators);
        let anomalies: Vec<_> = indicators.iter().filter(|i| i.is_anomaly).cloned().collect();
        let (overall_signal, signal_reasons) = read_signal(&indicators, &derived_metrics);

        Self {
            summary: LiquiditySummary {
                total_indicators: indicators.len(),
                anomaly_count: anomalies.len(),
                overall_signal,
                signal_reasons,
                last_updated: now,
            },
            indicators,
            derived_metrics,
            anomalies,
        }
    }

    /// No indicators at all.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self::assemble(Vec::new(), now)
    }
}

/// Bullish and bearish reasons from M2, the balance sheet, RRP and net
/// liquidity; the side with more reasons wins.
fn read_signal(
    indicators: &[LiquidityIndicator],
    derived: &[DerivedMetric],
) -> (Sentiment, Vec<String>) {
    let m2 = find(indicators, "M2SL").map(|i| i.yoy_change_percent);
    let fed_bs = find(indicators, "WALCL").map(|i| i.yoy_change_percent);
    let rrp = find(indicators, "RRPONTSYD").map(|i| i.yoy_change_percent);
    let net = derived.iter().find(|d| d.id == "net_liquidity");

    let mut bullish = Vec::new();
    let mut bearish = Vec::new();
    if let Some(pct) = m2.filter(|p| *p > 3.0) {
        bullish.push(format!("M2 expanding +{pct:.1}% YoY"));
    }
    if let Some(pct) = fed_bs.filter(|p| *p > 5.0) {
        bullish.push(format!("Fed BS expanding +{pct:.1}% YoY"));
    }
    if let Some(pct) = rrp.filter(|p| *p < -20.0) {
        bullish.push(format!("RRP draining {pct:.0}% (liquidity release)"));
    }
    if let Some(net) = net.filter(|n| n.value > NET_LIQUIDITY_HIGH) {
        bullish.push(format!("Net Liquidity high at {}", net.display_value));
    }
    if let Some(pct) = m2.filter(|p| *p < -2.0) {
        bearish.push(format!("M2 contracting {pct:.1}% YoY"));
    }
    if let Some(pct) = fed_bs.filter(|p| *p < -3.0) {
        bearish.push(format!("Fed BS contracting {pct:.1}% YoY (QT)"));
    }
    if let Some(net) = net.filter(|n| n.value < NET_LIQUIDITY_FLOOR) {
        bearish.push(format!("Net Liquidity dangerously low at {}", net.display_value));
    }

    let signal = match bullish.len().cmp(&bearish.len()) {
        std::cmp::Ordering::Greater => Sentiment::Bullish,
        std::cmp::Ordering::Less => Sentiment::Bearish,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    };
    bullish.append(&mut bearish);
    (signal, bullish)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series_named(id: &str) -> &'static LiquiditySeries {
        LIQUIDITY_SERIES.iter().find(|s| s.series_id == id).unwrap()
    }

    fn indicator(id: &str, value: f64, previous: f64) -> LiquidityIndicator {
        LiquidityIndicator::new(
            series_named(id),
            YoyReading {
                value,
                previous,
                date: day("2025-05-01"),
            },
        )
    }

    #[test]
    fn yoy_comparator_is_about_a_year_back() {
        let points = [
            (day("2025-05-01"), 110.0),
            (day("2025-01-01"), 105.0),
            (day("2024-05-10"), 100.0),
            (day("2024-01-01"), 90.0),
        ];
        let reading = YoyReading::pick(&points, Frequency::Monthly).unwrap();
        assert_eq!(reading.value, 110.0);
        assert_eq!(reading.previous, 100.0);
        assert_eq!(reading.date, day("2025-05-01"));
    }

    #[test]
    fn oldest_reading_used_when_history_is_long_enough() {
        let points = [(day("2025-05-01"), 110.0), (day("2024-08-01"), 100.0)];
        assert_eq!(YoyReading::pick(&points, Frequency::Monthly).unwrap().previous, 100.0);

        let short = [(day("2025-05-01"), 110.0), (day("2025-01-01"), 100.0)];
        assert!(YoyReading::pick(&short, Frequency::Monthly).is_none());
        assert!(YoyReading::pick(&short[..1], Frequency::Monthly).is_none());
    }

    #[test]
    fn zero_comparator_is_rejected() {
        let points = [(day("2025-05-01"), 1.0), (day("2024-05-01"), 0.0)];
        assert!(YoyReading::pick(&points, Frequency::Daily).is_none());
    }

    #[test]
    fn millions_are_shown_in_billions_and_flagged() {
        let tga = indicator("WTREGEN", 800_000.0, 600_000.0);
        assert_eq!(tga.value, 800.0);
        assert_eq!(tga.display_value, "$800.00B");
        assert_eq!(tga.unit, "Billions USD");
        assert!((tga.yoy_change_percent - 33.333).abs() < 1e-3);
        assert!(tga.is_anomaly);

        let fed_funds = indicator("FEDFUNDS", 4.33, 4.0);
        assert_eq!(fed_funds.display_value, "4.33%");
        assert!(!fed_funds.is_anomaly);
    }

    #[test]
    fn display_value_scales() {
        assert_eq!(display_value(21_500.0, RawUnit::Billions), "$21.50T");
        assert_eq!(display_value(0.25, RawUnit::Billions), "$250.00M");
        assert_eq!(display_value(1.3912, RawUnit::Index), "1.39");
    }

    #[test]
    fn derived_metrics_need_their_inputs() {
        let indicators = vec![
            indicator("WALCL", 6_700_000.0, 7_000_000.0),
            indicator("WTREGEN", 800_000.0, 700_000.0),
            indicator("RRPONTSYD", 200.0, 400.0),
            indicator("WRESBAL", 3_300_000.0, 3_200_000.0),
        ];
        let derived = derived_metrics(&indicators);
        let ids: Vec<_> = derived.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["net_liquidity", "reserve_ratio"]);
        assert_eq!(derived[0].value, 5700.0);
        assert_eq!(derived[0].display_value, "$5.70T");
        assert!(!derived[0].is_anomaly);
        assert_eq!(derived[1].display_value, "49.3%");
    }

    #[test]
    fn assemble_orders_and_reads_signal() {
        let indicators = vec![
            indicator("FEDFUNDS", 4.33, 5.33),
            indicator("RRPONTSYD", 200.0, 400.0),
            indicator("M2SL", 21_900.0, 21_000.0),
            indicator("WTREGEN", 800_000.0, 700_000.0),
            indicator("WALCL", 6_700_000.0, 7_000_000.0),
        ];
        let data = LiquidityData::assemble(indicators, Utc::now());

        let order: Vec<_> = data.indicators.iter().map(|i| i.short_name.as_str()).collect();
        assert_eq!(order, ["M2", "RRP", "TGA", "Fed BS", "Fed Funds"]);
        assert_eq!(data.summary.total_indicators, 5);
        assert_eq!(data.summary.anomaly_count, data.anomalies.len());
        // M2 +4.3%, RRP -50%, net liquidity $5.70T against Fed BS -4.3%
        assert_eq!(data.summary.overall_signal, Sentiment::Bullish);
        assert_eq!(data.summary.signal_reasons.len(), 4);
        assert_eq!(data.summary.signal_reasons[0], "M2 expanding +4.3% YoY");
        assert_eq!(data.summary.signal_reasons[3], "Fed BS contracting -4.3% YoY (QT)");
    }

    #[test]
    fn empty_reads_neutral() {
        let data = LiquidityData::empty(Utc::now());
        assert!(data.indicators.is_empty());
        assert_eq!(data.summary.overall_signal, Sentiment::Neutral);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["summary"]["totalIndicators"], 0);
        assert_eq!(json["derivedMetrics"], serde_json::json!([]));
    }
}
