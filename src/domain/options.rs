//! Bitcoin options positioning from exchange book summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::financial::round_to;
use super::sentiment::Sentiment;

const TOP_CONTRACTS: usize = 10;

/// One option instrument's book summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookSummary {
    pub instrument_name: String,
    pub open_interest: f64,
    pub volume: f64,
    pub mark_iv: f64,
    pub mark_price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

/// Strike, expiry and side from a `BTC-28MAR25-100000-C` style name.
#[must_use]
pub fn parse_instrument(name: &str) -> Option<(f64, String, OptionKind)> {
    let parts: Vec<&str> = name.split('-').collect();
    let [_, expiry, strike, side] = parts.as_slice() else {
        return None;
    };
    let strike = strike.parse::<f64>().ok()?;
    let kind = if *side == "C" {
        OptionKind::Call
    } else {
        OptionKind::Put
    };
    Some((strike, (*expiry).to_string(), kind))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub instrument_name: String,
    pub strike: f64,
    pub expiry: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub open_interest: f64,
    pub volume24h: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub implied_volatility: f64,
    pub mark_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsFlow {
    pub put_call_ratio: f64,
    #[serde(rename = "totalCallOI")]
    pub total_call_oi: f64,
    #[serde(rename = "totalPutOI")]
    pub total_put_oi: f64,
    pub total_call_volume: f64,
    pub total_put_volume: f64,
    pub net_delta: f64,
    pub avg_implied_volatility: f64,
    pub top_contracts: Vec<OptionContract>,
    pub market_sentiment: Sentiment,
    pub flow_analysis: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl OptionsFlow {
    /// Aggregate open interest, volume, delta exposure and implied
    /// volatility. Instruments with unparseable names are skipped.
    #[must_use]
    pub fn from_books(books: &[BookSummary], now: DateTime<Utc>) -> Self {
        let mut call_oi = 0.0;
        let mut put_oi = 0.0;
        let mut call_volume = 0.0;
        let mut put_volume = 0.0;
        let mut net_delta = 0.0;
        let mut iv_sum = 0.0;
        let mut iv_count = 0u32;
        let mut contracts = Vec::new();

        for book in books {
            let Some((strike, expiry, kind)) = parse_instrument(&book.instrument_name) else {
                continue;
            };
            match kind {
                OptionKind::Call => {
                    call_oi += book.open_interest;
                    call_volume += book.volume;
                }
                OptionKind::Put => {
                    put_oi += book.open_interest;
                    put_volume += book.volume;
                }
            }
            net_delta += book.delta * book.open_interest;
            if book.mark_iv > 0.0 {
                iv_sum += book.mark_iv;
                iv_count += 1;
            }
            contracts.push(OptionContract {
                instrument_name: book.instrument_name.clone(),
                strike,
                expiry,
                kind,
                open_interest: book.open_interest,
                volume24h: book.volume,
                delta: book.delta,
                gamma: book.gamma,
                vega: book.vega,
                theta: book.theta,
                implied_volatility: book.mark_iv,
                mark_price: book.mark_price,
            });
        }

        let put_call_ratio = put_oi / nonzero(call_oi);
        let avg_iv = if iv_count > 0 {
            iv_sum / f64::from(iv_count)
        } else {
            0.0
        };
        contracts.sort_by(|a, b| b.volume24h.total_cmp(&a.volume24h));
        contracts.truncate(TOP_CONTRACTS);

        Self {
            put_call_ratio: round_to(put_call_ratio, 2),
            total_call_oi: round_to(call_oi, 2),
            total_put_oi: round_to(put_oi, 2),
            total_call_volume: round_to(call_volume, 2),
            total_put_volume: round_to(put_volume, 2),
            net_delta: round_to(net_delta, 2),
            avg_implied_volatility: round_to(avg_iv, 2),
            top_contracts: contracts,
            market_sentiment: market_sentiment(put_call_ratio, net_delta),
            flow_analysis: flow_analysis(put_call_ratio, net_delta, avg_iv, call_volume, put_volume),
            timestamp: now,
        }
    }

    /// Zeroed payload sent alongside an error.
    #[must_use]
    pub fn unavailable(now: DateTime<Utc>) -> Self {
        Self {
            put_call_ratio: 0.0,
            total_call_oi: 0.0,
            total_put_oi: 0.0,
            total_call_volume: 0.0,
            total_put_volume: 0.0,
            net_delta: 0.0,
            avg_implied_volatility: 0.0,
            top_contracts: Vec::new(),
            market_sentiment: Sentiment::Neutral,
            flow_analysis: vec!["Unable to fetch options data - please try again later".into()],
            timestamp: now,
        }
    }
}

fn nonzero(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

#[must_use]
pub fn market_sentiment(put_call_ratio: f64, net_delta: f64) -> Sentiment {
    if put_call_ratio < 0.7 && net_delta > 0.0 {
        Sentiment::Bullish
    } else if put_call_ratio > 1.3 && net_delta < 0.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

fn flow_analysis(
    put_call_ratio: f64,
    net_delta: f64,
    avg_iv: f64,
    call_volume: f64,
    put_volume: f64,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    lines.push(if put_call_ratio < 0.7 {
        "📈 Low put-call ratio indicates strong bullish positioning - traders are favoring calls over puts"
    } else if put_call_ratio > 1.3 {
        "📉 High put-call ratio suggests bearish sentiment - increased demand for protective puts"
    } else {
        "⚖️ Put-call ratio near equilibrium - balanced market sentiment with no clear directional bias"
    });
    lines.push(if net_delta > 10_000.0 {
        "🟢 Positive net delta exposure indicates bullish options positioning across the market"
    } else if net_delta < -10_000.0 {
        "🔴 Negative net delta suggests bearish hedging activity or put accumulation"
    } else {
        "➖ Neutral net delta reflects balanced positioning between calls and puts"
    });
    lines.push(if avg_iv > 80.0 {
        "⚡ Elevated implied volatility signals market expects significant price movement ahead"
    } else if avg_iv < 50.0 {
        "😴 Low implied volatility suggests market complacency and reduced hedging demand"
    } else {
        "📊 Moderate implied volatility indicates normal market conditions"
    });

    let volume_ratio = call_volume / nonzero(put_volume);
    if volume_ratio > 1.5 {
        lines.push("💪 Call volume dominance shows strong bullish conviction from options traders");
    } else if volume_ratio < 0.67 {
        lines.push("🛡️ Put volume exceeding calls indicates defensive positioning and risk aversion");
    }
    lines.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(name: &str, oi: f64, volume: f64, delta: f64, iv: f64) -> BookSummary {
        BookSummary {
            instrument_name: name.into(),
            open_interest: oi,
            volume,
            mark_iv: iv,
            delta,
            ..BookSummary::default()
        }
    }

    #[test]
    fn instrument_names() {
        assert_eq!(
            parse_instrument("BTC-28MAR25-100000-C"),
            Some((100_000.0, "28MAR25".into(), OptionKind::Call))
        );
        assert_eq!(parse_instrument("BTC-28MAR25-90000-P").unwrap().2, OptionKind::Put);
        assert_eq!(parse_instrument("BTC-PERPETUAL"), None);
        assert_eq!(parse_instrument("BTC-28MAR25-abc-C"), None);
    }

    #[test]
    fn call_heavy_book_reads_bullish() {
        let books = [
            book("BTC-28MAR25-100000-C", 1000.0, 50.0, 0.5, 60.0),
            book("BTC-28MAR25-110000-C", 500.0, 200.0, 0.3, 0.0),
            book("BTC-28MAR25-80000-P", 300.0, 20.0, -0.2, 70.0),
            book("BTC-PERPETUAL", 9999.0, 9999.0, 1.0, 1.0),
        ];
        let flow = OptionsFlow::from_books(&books, Utc::now());

        assert_eq!(flow.total_call_oi, 1500.0);
        assert_eq!(flow.total_put_oi, 300.0);
        assert_eq!(flow.put_call_ratio, 0.2);
        assert_eq!(flow.net_delta, 590.0);
        assert_eq!(flow.avg_implied_volatility, 65.0);
        assert_eq!(flow.market_sentiment, Sentiment::Bullish);
        assert_eq!(flow.top_contracts.len(), 3);
        assert_eq!(flow.top_contracts[0].instrument_name, "BTC-28MAR25-110000-C");
        assert_eq!(flow.flow_analysis.len(), 4);
        assert!(flow.flow_analysis[0].contains("Low put-call ratio"));
        assert!(flow.flow_analysis[3].contains("Call volume dominance"));
    }

    #[test]
    fn put_heavy_book_reads_bearish() {
        let books = [
            book("BTC-1JAN26-50000-P", 2000.0, 10.0, -0.6, 90.0),
            book("BTC-1JAN26-120000-C", 1000.0, 10.0, 0.1, 90.0),
        ];
        let flow = OptionsFlow::from_books(&books, Utc::now());
        assert_eq!(flow.put_call_ratio, 2.0);
        assert_eq!(flow.market_sentiment, Sentiment::Bearish);
        assert!(flow.flow_analysis[2].contains("Elevated implied volatility"));
        assert_eq!(flow.flow_analysis.len(), 3);
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(OptionsFlow::unavailable(Utc::now())).unwrap();
        assert_eq!(json["totalCallOI"], 0.0);
        assert_eq!(json["marketSentiment"], "neutral");
        assert_eq!(json["topContracts"], serde_json::json!([]));
        assert!(json.get("avgImpliedVolatility").is_some());
    }
}
