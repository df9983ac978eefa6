//! Multi-timeframe Bitcoin price outlooks.
//!
//! Outlooks come either from a completion model (parsed with
//! [`parse_model_output`]) or from fixed technical multipliers
//! ([`MultiTimeframePredictions::technical_fallback`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicator::TechnicalIndicators;
pub use super::sentiment::Sentiment;

/// Price used when no source reports one.
pub const DEFAULT_PRICE: f64 = 60_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframePrediction {
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub duration: String,
    pub target_price: f64,
    pub low_estimate: f64,
    pub high_estimate: f64,
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub key_drivers: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub technical_outlook: String,
}

impl TimeframePrediction {
    fn rescaled(&self, ratio: f64) -> Self {
        Self {
            target_price: (self.target_price * ratio).round(),
            low_estimate: (self.low_estimate * ratio).round(),
            high_estimate: (self.high_estimate * ratio).round(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub one_month: TimeframePrediction,
    pub three_month: TimeframePrediction,
    pub six_month: TimeframePrediction,
    pub one_year: TimeframePrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub date: String,
    pub event: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTimeframePredictions {
    pub current_price: f64,
    pub timestamp: DateTime<Utc>,
    pub predictions: Predictions,
    pub overall_sentiment: Sentiment,
    pub confidence_score: f64,
    pub market_regime: String,
    pub volatility_outlook: String,
    pub risk_reward_ratio: f64,
    pub key_events: Vec<KeyEvent>,
    pub ai_insights: Vec<String>,
}

/// The JSON object the model is asked to return.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelOutput {
    predictions: Predictions,
    overall_sentiment: Sentiment,
    confidence_score: f64,
    #[serde(default)]
    market_regime: String,
    #[serde(default)]
    volatility_outlook: String,
    #[serde(default)]
    risk_reward_ratio: f64,
    #[serde(default)]
    key_events: Vec<KeyEvent>,
    #[serde(default)]
    ai_insights: Vec<String>,
}

/// Remove markdown code fences a model may wrap JSON in.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a model reply into predictions anchored at `current_price`.
///
/// # Errors
///
/// Returns the JSON error when the reply does not match the requested shape.
pub fn parse_model_output(
    reply: &str,
    current_price: f64,
    now: DateTime<Utc>,
) -> Result<MultiTimeframePredictions, serde_json::Error> {
    let out: ModelOutput = serde_json::from_str(&strip_code_fences(reply))?;
    Ok(MultiTimeframePredictions {
        current_price,
        timestamp: now,
        predictions: out.predictions,
        overall_sentiment: out.overall_sentiment,
        confidence_score: out.confidence_score,
        market_regime: out.market_regime,
        volatility_outlook: out.volatility_outlook,
        risk_reward_ratio: out.risk_reward_ratio,
        key_events: out.key_events,
        ai_insights: out.ai_insights,
    })
}

/// Inputs for the model prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSnapshot {
    pub price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub ath: f64,
    pub circulating_supply: f64,
}

pub const SYSTEM_PROMPT: &str = "You are an expert Bitcoin market analyst. Provide accurate, \
data-driven predictions based on technical analysis, market conditions, and fundamental \
factors. Always respond with valid JSON only.";

/// Build the user prompt from live metrics and indicators.
#[must_use]
pub fn build_prompt(
    market: &MarketSnapshot,
    ind: &TechnicalIndicators,
    now: DateTime<Utc>,
) -> String {
    let trend = if ind.last_price > ind.sma20 {
        "Above 20-day SMA"
    } else {
        "Below 20-day SMA"
    };
    let sma50 = ind
        .sma50
        .map_or_else(|| "n/a".to_string(), |v| format!("${v:.2}"));

    format!(
        "Current Bitcoin Market Analysis ({date}):

CURRENT METRICS:
- Price: ${price:.2}
- 24h Change: {change:.2}%
- Market Cap: ${cap:.2}B
- 24h Volume: ${volume:.2}B
- All-Time High: ${ath:.2}
- Circulating Supply: {supply:.2}M BTC

TECHNICAL INDICATORS:
- RSI (14): {rsi:.2}
- 20-day SMA: ${sma20:.2}
- 50-day SMA: {sma50}
- MACD: {macd:.2}
- 30-day Volatility: {vol:.2}%
- 30-day Momentum: {mom:.2}%
- Volume Trend: {vtrend:.2}%

MARKET CONTEXT:
- Current trend: {trend}
- RSI status: {rsi_status}
- Volatility: {vol_status}

Analyze the data and provide predictions for FOUR timeframes: 1 month, 3 months, 6 months, and 1 year.
For each give a target price, low estimate, high estimate, probability (0-100), 2-3 key drivers, 2-3 risks and a short technical outlook.
Also give overall sentiment (bullish/bearish/neutral), a confidence score (0-100), the market regime, a volatility outlook, a risk/reward ratio, upcoming key events with dates and impact (high/medium/low), and 3-5 insights.

Return ONLY valid JSON with this exact structure (no markdown, no code blocks):
{{
  \"predictions\": {{
    \"oneMonth\": {{\"timeframe\": \"1 Month\", \"duration\": \"30 days\", \"targetPrice\": number, \"lowEstimate\": number, \"highEstimate\": number, \"probability\": number, \"keyDrivers\": [\"...\"], \"risks\": [\"...\"], \"technicalOutlook\": \"...\"}},
    \"threeMonth\": {{ same structure }},
    \"sixMonth\": {{ same structure }},
    \"oneYear\": {{ same structure }}
  }},
  \"overallSentiment\": \"bullish|bearish|neutral\",
  \"confidenceScore\": number,
  \"marketRegime\": \"string\",
  \"volatilityOutlook\": \"string\",
  \"riskRewardRatio\": number,
  \"keyEvents\": [{{\"date\": \"YYYY-MM-DD\", \"event\": \"description\", \"impact\": \"high|medium|low\"}}],
  \"aiInsights\": [\"...\"]
}}",
        date = now.format("%Y-%m-%d"),
        price = market.price,
        change = market.change_24h,
        cap = market.market_cap / 1e9,
        volume = market.volume_24h / 1e9,
        ath = market.ath,
        supply = market.circulating_supply / 1e6,
        rsi = ind.rsi,
        sma20 = ind.sma20,
        macd = ind.macd,
        vol = ind.volatility,
        mom = ind.momentum_30d,
        vtrend = ind.volume_trend,
        rsi_status = ind.rsi_status(),
        vol_status = ind.volatility_status(),
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

struct Horizon {
    timeframe: &'static str,
    duration: &'static str,
    target: f64,
    low: f64,
    high: f64,
    probability: f64,
    drivers: [&'static str; 3],
    risks: &'static [&'static str],
    outlook: &'static str,
}

const HORIZONS: [Horizon; 4] = [
    Horizon {
        timeframe: "1 Month",
        duration: "30 days",
        target: 1.05,
        low: 0.92,
        high: 1.18,
        probability: 65.0,
        drivers: [
            "Technical support levels holding steady",
            "Institutional interest remains strong",
            "Historical volatility patterns suggest range-bound movement",
        ],
        risks: &["Short-term market volatility", "Macroeconomic uncertainties"],
        outlook: "Consolidation with moderate upside potential based on technical indicators",
    },
    Horizon {
        timeframe: "3 Months",
        duration: "90 days",
        target: 1.15,
        low: 0.88,
        high: 1.35,
        probability: 60.0,
        drivers: [
            "Seasonal historical trends favor Q4 strength",
            "Continued institutional adoption trajectory",
            "Network fundamentals remain robust",
        ],
        risks: &[
            "Regulatory developments",
            "Global economic conditions",
            "Market correlation with traditional assets",
        ],
        outlook: "Potential breakout from consolidation zone with technical support intact",
    },
    Horizon {
        timeframe: "6 Months",
        duration: "180 days",
        target: 1.28,
        low: 0.82,
        high: 1.55,
        probability: 55.0,
        drivers: [
            "Bitcoin halving cycle dynamics",
            "Growing institutional and corporate treasury adoption",
            "Improving regulatory clarity in major markets",
        ],
        risks: &[
            "Potential market corrections",
            "Geopolitical events",
            "Regulatory policy changes",
        ],
        outlook: "Building momentum toward potential bull phase continuation",
    },
    Horizon {
        timeframe: "1 Year",
        duration: "365 days",
        target: 1.50,
        low: 0.75,
        high: 2.10,
        probability: 50.0,
        drivers: [
            "Long-term supply scarcity with fixed 21M supply cap",
            "Mainstream adoption acceleration",
            "Bitcoin as macro hedge narrative strengthening",
        ],
        risks: &[
            "Major market disruption events",
            "Technology or security risks",
            "Significant regulatory headwinds",
        ],
        outlook: "Long-term bullish structure remains intact with historical cycle patterns supportive",
    },
];

impl Horizon {
    fn predict(&self, price: f64) -> TimeframePrediction {
        TimeframePrediction {
            timeframe: self.timeframe.into(),
            duration: self.duration.into(),
            target_price: price * self.target,
            low_estimate: price * self.low,
            high_estimate: price * self.high,
            probability: self.probability,
            key_drivers: strings(&self.drivers),
            risks: strings(self.risks),
            technical_outlook: self.outlook.into(),
        }
    }
}

impl MultiTimeframePredictions {
    /// Fixed-multiplier outlook used when the model is unavailable.
    #[must_use]
    pub fn technical_fallback(
        price: f64,
        change_24h: f64,
        rate_limited: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let [m1, m3, m6, y1] = &HORIZONS;
        let notice = if rate_limited {
            "Advanced AI predictions temporarily unavailable due to rate limits - technical fallback analysis active"
        } else {
            "AI analysis service temporarily unavailable - using technical analysis fallback"
        };
        Self {
            current_price: price,
            timestamp: now,
            predictions: Predictions {
                one_month: m1.predict(price),
                three_month: m3.predict(price),
                six_month: m6.predict(price),
                one_year: y1.predict(price),
            },
            overall_sentiment: Sentiment::from_change(change_24h),
            confidence_score: 58.0,
            market_regime: "Technical Consolidation Phase".into(),
            volatility_outlook: "Moderate to high volatility expected based on historical patterns"
                .into(),
            risk_reward_ratio: 2.3,
            key_events: vec![
                KeyEvent {
                    date: "2024-04".into(),
                    event: "Bitcoin Halving (estimated)".into(),
                    impact: Impact::High,
                },
                KeyEvent {
                    date: "Quarterly".into(),
                    event: "Federal Reserve rate decisions".into(),
                    impact: Impact::High,
                },
            ],
            ai_insights: strings(&[
                notice,
                "Technical indicators suggest monitoring key support/resistance levels for breakout signals",
                "Dollar-cost averaging remains prudent strategy during consolidation phases",
                "Watch for volume confirmation on any directional moves",
            ]),
        }
    }

    /// Re-anchor a cached outlook on a fresh price, scaling every target
    /// and estimate by `new / old` and rounding to whole dollars.
    ///
    /// Returns the outlook unchanged when the old price is not positive.
    #[must_use]
    pub fn rescaled(&self, new_price: f64, now: DateTime<Utc>) -> Self {
        if self.current_price <= 0.0 || new_price <= 0.0 {
            return self.clone();
        }
        let ratio = new_price / self.current_price;
        let p = &self.predictions;
        Self {
            current_price: new_price,
            timestamp: now,
            predictions: Predictions {
                one_month: p.one_month.rescaled(ratio),
                three_month: p.three_month.rescaled(ratio),
                six_month: p.six_month.rescaled(ratio),
                one_year: p.one_year.rescaled(ratio),
            },
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_REPLY: &str = r#"```json
{
  "predictions": {
    "oneMonth": {"timeframe": "1 Month", "duration": "30 days", "targetPrice": 105000, "lowEstimate": 95000, "highEstimate": 115000, "probability": 70, "keyDrivers": ["ETF flows"], "risks": ["Macro"], "technicalOutlook": "Up"},
    "threeMonth": {"targetPrice": 110000, "lowEstimate": 90000, "highEstimate": 130000},
    "sixMonth": {"targetPrice": 120000, "lowEstimate": 85000, "highEstimate": 150000},
    "oneYear": {"targetPrice": 150000, "lowEstimate": 80000, "highEstimate": 200000}
  },
  "overallSentiment": "bullish",
  "confidenceScore": 72,
  "marketRegime": "Bull Market",
  "volatilityOutlook": "Elevated",
  "riskRewardRatio": 2.8,
  "keyEvents": [{"date": "2025-09-17", "event": "FOMC", "impact": "high"}],
  "aiInsights": ["Momentum is strong"]
}
```"#;

    #[test]
    fn sentiment_thresholds() {
        assert_eq!(Sentiment::from_change(2.5), Sentiment::Bullish);
        assert_eq!(Sentiment::from_change(-2.5), Sentiment::Bearish);
        assert_eq!(Sentiment::from_change(2.0), Sentiment::Neutral);
    }

    #[test]
    fn strip_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parse_fenced_model_output() {
        let now = Utc::now();
        let parsed = parse_model_output(MODEL_REPLY, 100_000.0, now).unwrap();
        assert_eq!(parsed.current_price, 100_000.0);
        assert_eq!(parsed.overall_sentiment, Sentiment::Bullish);
        assert_eq!(parsed.predictions.one_month.key_drivers, vec!["ETF flows"]);
        assert_eq!(parsed.predictions.three_month.target_price, 110_000.0);
        assert!(parsed.predictions.three_month.risks.is_empty());
        assert_eq!(parsed.key_events[0].impact, Impact::High);
    }

    #[test]
    fn parse_rejects_prose() {
        assert!(parse_model_output("I cannot help with that.", 1.0, Utc::now()).is_err());
    }

    #[test]
    fn fallback_multipliers() {
        let p = MultiTimeframePredictions::technical_fallback(100_000.0, 3.0, false, Utc::now());
        assert!((p.predictions.one_month.target_price - 105_000.0).abs() < 1e-6);
        assert!((p.predictions.three_month.low_estimate - 88_000.0).abs() < 1e-6);
        assert!((p.predictions.six_month.high_estimate - 155_000.0).abs() < 1e-6);
        assert!((p.predictions.one_year.high_estimate - 210_000.0).abs() < 1e-6);
        assert_eq!(p.predictions.one_year.probability, 50.0);
        assert_eq!(p.overall_sentiment, Sentiment::Bullish);
        assert_eq!(p.confidence_score, 58.0);
        assert_eq!(p.risk_reward_ratio, 2.3);
        assert!(p.ai_insights[0].contains("service temporarily unavailable"));
    }

    #[test]
    fn fallback_mentions_rate_limit() {
        let p = MultiTimeframePredictions::technical_fallback(1.0, 0.0, true, Utc::now());
        assert!(p.ai_insights[0].contains("rate limits"));
        assert_eq!(p.overall_sentiment, Sentiment::Neutral);
    }

    #[test]
    fn rescale_rounds_targets() {
        let base = MultiTimeframePredictions::technical_fallback(100_000.0, 0.0, false, Utc::now());
        let scaled = base.rescaled(110_000.0, Utc::now());
        assert_eq!(scaled.current_price, 110_000.0);
        assert_eq!(scaled.predictions.one_month.target_price, 115_500.0);
        assert_eq!(scaled.predictions.one_year.low_estimate, 82_500.0);
        assert_eq!(scaled.confidence_score, base.confidence_score);
    }

    #[test]
    fn rescale_with_zero_price_is_noop() {
        let base = MultiTimeframePredictions::technical_fallback(100_000.0, 0.0, false, Utc::now());
        assert_eq!(base.rescaled(0.0, Utc::now()), base);
    }

    #[test]
    fn serializes_camel_case() {
        let p = MultiTimeframePredictions::technical_fallback(1.0, 0.0, false, Utc::now());
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["predictions"]["oneMonth"]["targetPrice"].is_number());
        assert_eq!(json["overallSentiment"], "neutral");
        assert_eq!(json["marketRegime"], "Technical Consolidation Phase");
    }

    #[test]
    fn prompt_mentions_indicators() {
        let prices: Vec<f64> = (1..=60).map(f64::from).collect();
        let ind = TechnicalIndicators::compute(&prices, &[]).unwrap();
        let market = MarketSnapshot {
            price: 60.0,
            change_24h: 1.0,
            volume_24h: 2e9,
            market_cap: 1e12,
            ath: 100.0,
            circulating_supply: 19.5e6,
        };
        let prompt = build_prompt(&market, &ind, Utc::now());
        assert!(prompt.contains("RSI (14)"));
        assert!(prompt.contains("Above 20-day SMA") || prompt.contains("Below 20-day SMA"));
        assert!(prompt.contains("\"oneMonth\""));
        assert!(prompt.contains("Circulating Supply: 19.50M BTC"));
    }
}
