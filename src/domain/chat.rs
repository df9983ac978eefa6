//! Chatbot answers built from live dashboard figures.

use serde::{Deserialize, Serialize};

use super::financial::TreasuryData;
use super::inflation::InflationData;
use super::market::BitcoinMarketData;
use super::sentiment::{Sentiment, SentimentData};

const NA: &str = "N/A";

pub const SYSTEM_PROMPT: &str = "You are a helpful Bitcoin and cryptocurrency assistant. \
Provide accurate, helpful responses about Bitcoin markets, trading, and the data available \
on this website. Keep responses conversational but informative.";

/// Body of `POST /chatbot/ask`. Any JSON type is accepted for `question`
/// so a wrong type can be reported like a missing one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: serde_json::Value,
}

impl ChatRequest {
    /// The trimmed question, if it is a non-blank string.
    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.question
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Display strings for the figures quoted in answers; `"N/A"` when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    pub price: String,
    pub change_24h: String,
    pub treasury_yield: String,
    pub inflation_rate: String,
    pub sentiment: String,
}

impl ChatContext {
    #[must_use]
    pub fn new(
        market: Option<&BitcoinMarketData>,
        treasury: Option<&TreasuryData>,
        inflation: Option<&InflationData>,
        sentiment: Option<&SentimentData>,
    ) -> Self {
        Self {
            price: market.map_or_else(|| NA.into(), |m| format_usd(m.current_price.usd)),
            change_24h: market.map_or_else(
                || NA.into(),
                |m| format!("{:.2}%", m.price_change_percentage_24h),
            ),
            treasury_yield: treasury
                .map_or_else(|| NA.into(), |t| format!("{:.2}%", t.yield_pct)),
            inflation_rate: inflation.map_or_else(|| NA.into(), |i| format!("{:.2}%", i.rate)),
            sentiment: sentiment.map_or_else(
                || NA.into(),
                |s| format!("{} ({}/100)", sentiment_label(s.overall), s.overall_score),
            ),
        }
    }
}

fn sentiment_label(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Bullish => "bullish",
        Sentiment::Bearish => "bearish",
        Sentiment::Neutral => "neutral",
    }
}

/// What a question is about, by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Price,
    Fed,
    Sentiment,
    General,
}

impl Topic {
    #[must_use]
    pub fn classify(question: &str) -> Self {
        let q = question.to_lowercase();
        if q.contains("price") || q.contains("bitcoin") {
            Self::Price
        } else if q.contains("fed") || q.contains("treasury") {
            Self::Fed
        } else if q.contains("sentiment") || q.contains("market") {
            Self::Sentiment
        } else {
            Self::General
        }
    }
}

/// Data-driven answer for a topic.
#[must_use]
pub fn template_answer(topic: Topic, ctx: &ChatContext) -> String {
    let ChatContext {
        price,
        change_24h,
        treasury_yield,
        inflation_rate,
        sentiment,
    } = ctx;
    match topic {
        Topic::Price => format!(
            "Based on the live data from our dashboard:

**Current Bitcoin Price**: {price} (24h change: {change_24h})
**Market Sentiment**: {sentiment}
**Federal Reserve Data**: US 10-Year Treasury {treasury_yield}, US Inflation Rate {inflation_rate}

The data is updated in real-time from CoinGecko, the Federal Reserve FRED API, and other authoritative sources. You can see detailed charts and metrics in the dashboard."
        ),
        Topic::Fed => format!(
            "Here's the current Federal Reserve economic data:

**US 10-Year Treasury**: {treasury_yield} (from FRED API)
**US Inflation Rate**: {inflation_rate} (from FRED API)
**Bitcoin Price**: {price} (24h change: {change_24h})

Treasury yields and inflation significantly impact Bitcoin's price movements as they affect investor risk appetite."
        ),
        Topic::Sentiment => format!(
            "Current market analysis:

**Market Sentiment**: {sentiment}
**Bitcoin Price**: {price} (24h change: {change_24h})
**Fed Context**: Treasury at {treasury_yield}, Inflation at {inflation_rate}

Our sentiment analysis combines price action, social media data, trading activity, and news sentiment."
        ),
        Topic::General => format!(
            "I can help you understand the Bitcoin data on this website! Here's what's currently available:

**Live Bitcoin Price**: {price} (24h change: {change_24h})
**Market Sentiment**: {sentiment}
**Federal Reserve Data**: Treasury {treasury_yield}, Inflation {inflation_rate}

**Available on the dashboard:**
- Real-time price charts and technical indicators
- Federal Reserve economic data (FRED API)
- Bitcoin dominance and global market metrics
- Congressional trading activity
- News feed with sentiment analysis

Feel free to ask about any specific metrics you see in the dashboard!"
        ),
    }
}

/// Prompt giving the model the live figures and the user's question.
#[must_use]
pub fn context_prompt(question: &str, ctx: &ChatContext) -> String {
    format!(
        "You are a helpful Bitcoin and cryptocurrency assistant on BitcoinHub, a comprehensive Bitcoin information platform.

Current live data from our website:
- Bitcoin Price: {} (24h change: {})
- US 10-Year Treasury: {} (from Federal Reserve FRED API)
- US Inflation Rate: {} (from Federal Reserve FRED API)
- Market Sentiment: {}

Answer the user's question about Bitcoin markets, the data on our website, or general cryptocurrency topics. Be helpful, accurate, and reference the current data when relevant. Keep responses concise but informative.

User question: {question}",
        ctx.price, ctx.change_24h, ctx.treasury_yield, ctx.inflation_rate, ctx.sentiment
    )
}

/// `$117,234.5`-style rendering with thousands separators and at most two
/// decimals.
#[must_use]
pub fn format_usd(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    match frac {
        0 => format!("{sign}${grouped}"),
        f if f % 10 == 0 => format!("{sign}${grouped}.{}", f / 10),
        f => format!("{sign}${grouped}.{f:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn question_must_be_a_non_blank_string() {
        let parse = |body: &str| serde_json::from_str::<ChatRequest>(body).unwrap();
        assert_eq!(parse(r#"{"question":"  why?  "}"#).question(), Some("why?"));
        assert_eq!(parse(r#"{"question":42}"#).question(), None);
        assert_eq!(parse(r#"{"question":["a"]}"#).question(), None);
        assert_eq!(parse(r#"{"question":"   "}"#).question(), None);
        assert_eq!(parse("{}").question(), None);
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(117_234.5), "$117,234.5");
        assert_eq!(format_usd(41_285.34), "$41,285.34");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(format_usd(0.05), "$0.05");
    }

    #[test]
    fn topics() {
        assert_eq!(Topic::classify("What is the BTC price?"), Topic::Price);
        assert_eq!(Topic::classify("Tell me about Bitcoin"), Topic::Price);
        assert_eq!(Topic::classify("What did the Fed do?"), Topic::Fed);
        assert_eq!(Topic::classify("How is the market?"), Topic::Sentiment);
        assert_eq!(Topic::classify("What is a halving?"), Topic::General);
    }

    #[test]
    fn context_marks_missing_figures() {
        let ctx = ChatContext::new(None, None, None, None);
        assert_eq!(ctx.price, "N/A");
        assert_eq!(ctx.inflation_rate, "N/A");
        assert_eq!(ctx.sentiment, "N/A");
        let answer = template_answer(Topic::Price, &ctx);
        assert!(answer.contains("N/A (24h change: N/A)"));
    }

    #[test]
    fn context_renders_live_figures() {
        let market = BitcoinMarketData::fallback();
        let sentiment = SentimentData::fallback(Utc::now());
        let inflation = InflationData::fallback(Utc::now());
        let ctx = ChatContext::new(Some(&market), None, Some(&inflation), Some(&sentiment));
        assert_eq!(ctx.price, "$41,285.34");
        assert_eq!(ctx.inflation_rate, "2.40%");
        assert!(template_answer(Topic::Fed, &ctx).contains("**US Inflation Rate**: 2.40%"));
        assert!(context_prompt("why?", &ctx).contains("- US Inflation Rate: 2.40%"));
        assert_eq!(ctx.change_24h, "2.14%");
        assert_eq!(ctx.sentiment, "neutral (50/100)");
        assert!(context_prompt("why?", &ctx).ends_with("User question: why?"));
    }
}
