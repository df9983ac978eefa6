//! Congressional trading disclosures and their crypto relevance.
//!
//! Raw disclosures from any source are normalised into
//! [`CongressionalTrade`]; [`summarize`] turns a batch into the dashboard
//! aggregate [`HouseStockData`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DIRECT_TICKERS: [&str; 9] = [
    "COIN", "MSTR", "RIOT", "MARA", "CLSK", "HUT", "BITF", "CAN", "HIVE",
];
const RELATED_TICKERS: [&str; 10] = [
    "NVDA", "AMD", "TSM", "PYPL", "SQ", "V", "MA", "JPM", "BAC", "GS",
];
const INFRASTRUCTURE_TICKERS: [&str; 6] = ["IBM", "ORCL", "MSFT", "AMZN", "GOOGL", "META"];
const CRYPTO_KEYWORDS: [&str; 6] = [
    "bitcoin",
    "crypto",
    "blockchain",
    "digital currency",
    "mining",
    "coinbase",
];

const TOP_TRADERS: usize = 10;
const RECENT_WINDOW_DAYS: i64 = 90;
const RECENT_LIMIT: usize = 20;

/// One disclosed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongressionalTrade {
    pub representative: String,
    pub district: String,
    pub party: String,
    pub trade_date: String,
    pub disclosure_date: String,
    pub ticker: Option<String>,
    pub asset_description: Option<String>,
    pub transaction_type: String,
    pub amount: String,
    pub cap_gains_over_200_usd: bool,
    pub ptr_link: Option<String>,
    pub owner: Option<String>,
}

impl CongressionalTrade {
    /// Trade date parsed from any of the formats the sources use.
    #[must_use]
    pub fn trade_day(&self) -> Option<NaiveDate> {
        parse_day(&self.trade_date)
    }
}

/// How directly a holding is exposed to Bitcoin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoRelevance {
    Direct,
    Related,
    Infrastructure,
}

/// A trade judged crypto-relevant, with its impact score (1..=10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoRelatedTrade {
    #[serde(flatten)]
    pub trade: CongressionalTrade,
    pub crypto_relevance: CryptoRelevance,
    pub bitcoin_impact_score: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBreakdown {
    pub democrat: u32,
    pub republican: u32,
    pub independent: u32,
}

impl PartyBreakdown {
    fn record(&mut self, party: &str) {
        let party = party.trim().to_lowercase();
        match party.as_str() {
            "democrat" | "democratic" => self.democrat += 1,
            "republican" => self.republican += 1,
            "independent" => self.independent += 1,
            other => match other.chars().next() {
                Some('d') => self.democrat += 1,
                Some('r') => self.republican += 1,
                _ => self.independent += 1,
            },
        }
    }
}

/// A member ranked by number of crypto-relevant trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTrader {
    pub name: String,
    pub party: String,
    pub district: String,
    pub crypto_trade_count: u32,
    /// Sum of range lower bounds, e.g. `"$16K+"`.
    pub total_value: String,
    pub last_trade_date: String,
}

/// Dashboard aggregate over one batch of disclosures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseStockData {
    pub last_updated: DateTime<Utc>,
    pub total_trades: usize,
    pub crypto_trades: Vec<CryptoRelatedTrade>,
    pub recent_activity: Vec<CongressionalTrade>,
    pub party_breakdown: PartyBreakdown,
    pub top_crypto_traders: Vec<TopTrader>,
    pub fallback_data: bool,
}

impl HouseStockData {
    /// No source produced data.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            last_updated: now,
            total_trades: 0,
            crypto_trades: Vec::new(),
            recent_activity: Vec::new(),
            party_breakdown: PartyBreakdown::default(),
            top_crypto_traders: Vec::new(),
            fallback_data: false,
        }
    }
}

/// Classify a holding. Missing ticker or description is never relevant.
#[must_use]
pub fn classify(ticker: Option<&str>, description: Option<&str>) -> Option<(CryptoRelevance, u8)> {
    let ticker = ticker.filter(|t| !t.is_empty())?;
    let description = description.filter(|d| !d.is_empty())?;

    let upper = ticker.to_uppercase();
    if DIRECT_TICKERS.contains(&upper.as_str()) {
        return Some((CryptoRelevance::Direct, 10));
    }
    if INFRASTRUCTURE_TICKERS.contains(&upper.as_str()) {
        return Some((CryptoRelevance::Infrastructure, 6));
    }
    if RELATED_TICKERS.contains(&upper.as_str()) {
        return Some((CryptoRelevance::Related, 7));
    }
    let lower = description.to_lowercase();
    if CRYPTO_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some((CryptoRelevance::Direct, 9));
    }
    None
}

/// Lower bound of an amount range such as `"$1,001 - $15,000"`.
#[must_use]
pub fn amount_lower_bound(amount: &str) -> Option<u64> {
    let start = amount.find(|c: char| c.is_ascii_digit())?;
    let digits: String = amount[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parse `YYYY-MM-DD`, `MM/DD/YYYY` or an RFC 3339 timestamp.
#[must_use]
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}

struct TraderStats {
    name: String,
    party: String,
    district: String,
    count: u32,
    total_value: u64,
    last_trade_date: String,
    last_day: Option<NaiveDate>,
    first_seen: usize,
}

/// Aggregate a batch of trades.
#[must_use]
pub fn summarize(
    trades: Vec<CongressionalTrade>,
    fallback: bool,
    now: DateTime<Utc>,
) -> HouseStockData {
    let mut crypto_trades = Vec::new();
    let mut party_breakdown = PartyBreakdown::default();
    let mut traders: HashMap<String, TraderStats> = HashMap::new();

    for trade in &trades {
        let Some((relevance, score)) =
            classify(trade.ticker.as_deref(), trade.asset_description.as_deref())
        else {
            continue;
        };

        party_breakdown.record(&trade.party);

        let key = format!("{}-{}", trade.representative, trade.district);
        let next_index = traders.len();
        let stats = traders.entry(key).or_insert_with(|| TraderStats {
            name: trade.representative.clone(),
            party: trade.party.clone(),
            district: trade.district.clone(),
            count: 0,
            total_value: 0,
            last_trade_date: trade.trade_date.clone(),
            last_day: trade.trade_day(),
            first_seen: next_index,
        });
        stats.count += 1;
        stats.total_value += amount_lower_bound(&trade.amount).unwrap_or(0);
        let day = trade.trade_day();
        if day > stats.last_day {
            stats.last_day = day;
            stats.last_trade_date = trade.trade_date.clone();
        }

        crypto_trades.push(CryptoRelatedTrade {
            trade: trade.clone(),
            crypto_relevance: relevance,
            bitcoin_impact_score: score,
        });
    }

    let mut ranked: Vec<TraderStats> = traders.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
    let top_crypto_traders = ranked
        .into_iter()
        .take(TOP_TRADERS)
        .map(|s| TopTrader {
            name: s.name,
            party: s.party,
            district: s.district,
            crypto_trade_count: s.count,
            total_value: format!("${}K+", (s.total_value as f64 / 1000.0).round()),
            last_trade_date: s.last_trade_date,
        })
        .collect();

    // Trade days are midnight UTC instants, compared against the exact cutoff.
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut recent_activity: Vec<CongressionalTrade> = trades
        .iter()
        .filter(|t| {
            t.trade_day()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .is_some_and(|start| start.and_utc() >= cutoff)
        })
        .cloned()
        .collect();
    recent_activity.sort_by(|a, b| b.trade_day().cmp(&a.trade_day()));
    recent_activity.truncate(RECENT_LIMIT);

    crypto_trades.sort_by(|a, b| b.trade.trade_day().cmp(&a.trade.trade_day()));

    HouseStockData {
        last_updated: now,
        total_trades: trades.len(),
        crypto_trades,
        recent_activity,
        party_breakdown,
        top_crypto_traders,
        fallback_data: fallback,
    }
}
