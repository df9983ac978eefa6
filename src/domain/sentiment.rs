//! Market sentiment readings and their aggregation.
//!
//! Each source produces a [`Reading`] (score 0..=100 plus a confidence
//! 0..=1). [`aggregate`] weights them by confidence into [`SentimentData`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    /// Label a 0..=100 score with the given bullish/bearish thresholds.
    #[must_use]
    pub fn from_score(score: f64, bullish_above: f64, bearish_below: f64) -> Self {
        if score > bullish_above {
            Self::Bullish
        } else if score < bearish_below {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    /// Standard 60/40 split.
    #[must_use]
    pub fn from_standard_score(score: f64) -> Self {
        Self::from_score(score, 60.0, 40.0)
    }

    /// Classify a 24h change: above +2% bullish, below -2% bearish.
    #[must_use]
    pub fn from_change(change_24h: f64) -> Self {
        Self::from_score(change_24h, 2.0, -2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 55.0 {
            Self::Increasing
        } else if score < 45.0 {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

/// One source's opinion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub score: f64,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

impl Reading {
    /// Neutral 50 with the given confidence.
    #[must_use]
    pub fn neutral(confidence: f64) -> Self {
        Self {
            score: 50.0,
            sentiment: Sentiment::Neutral,
            confidence,
        }
    }
}

/// A headline used for news sentiment and keyword extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub source: String,
    pub url: String,
}

impl NewsArticle {
    fn text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSource {
    pub source: String,
    pub score: f64,
    #[serde(rename = "type")]
    pub sentiment: Sentiment,
    pub trend: Trend,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub weight: u32,
    #[serde(rename = "type")]
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentData {
    pub overall: Sentiment,
    pub overall_score: f64,
    pub confidence: f64,
    pub sources: Vec<SentimentSource>,
    pub keywords: Vec<Keyword>,
    pub last_updated: DateTime<Utc>,
}

impl SentimentData {
    /// Neutral reading used when the whole analysis fails.
    #[must_use]
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            overall: Sentiment::Neutral,
            overall_score: 50.0,
            confidence: 0.5,
            sources: vec![SentimentSource {
                source: "Market Data".into(),
                score: 50.0,
                sentiment: Sentiment::Neutral,
                trend: Trend::Stable,
                confidence: 0.5,
                last_updated: now,
            }],
            keywords: vec![
                Keyword {
                    text: "consolidation".into(),
                    weight: 5,
                    sentiment: Sentiment::Neutral,
                },
                Keyword {
                    text: "volatility".into(),
                    weight: 4,
                    sentiment: Sentiment::Neutral,
                },
            ],
            last_updated: now,
        }
    }
}

const BULLISH_TERMS: [&str; 18] = [
    "bullish", "surge", "rally", "breakout", "adoption", "institutional", "buy",
    "accumulate", "positive", "growth", "increase", "rise", "upward", "all-time high",
    "breakthrough", "milestone", "record", "optimistic",
];
const BEARISH_TERMS: [&str; 18] = [
    "bearish", "crash", "dump", "selloff", "decline", "regulatory", "sell", "negative",
    "fall", "drop", "decrease", "downward", "correction", "liquidation", "resistance",
    "concerns", "warning", "risk",
];

/// Score headlines by counting bullish and bearish terms.
#[must_use]
pub fn keyword_sentiment(articles: &[NewsArticle]) -> Reading {
    let mut bullish = 0usize;
    let mut bearish = 0usize;
    let mut words = 0usize;

    for article in articles {
        let text = article.text();
        words += text.split_whitespace().count();
        bullish += BULLISH_TERMS.iter().map(|k| text.matches(k).count() * 2).sum::<usize>();
        bearish += BEARISH_TERMS.iter().map(|k| text.matches(k).count() * 2).sum::<usize>();
    }

    let hits = bullish + bearish;
    let net = bullish as f64 - bearish as f64;
    let score = (50.0 + net / hits.max(1) as f64 * 50.0).clamp(0.0, 100.0);
    let confidence = if words == 0 {
        0.0
    } else {
        (hits as f64 / words as f64 * 10.0).min(0.9)
    };
    Reading {
        score,
        sentiment: Sentiment::from_standard_score(score),
        confidence,
    }
}

/// Reply shape requested from the model for news sentiment.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelNewsSentiment {
    pub score: Option<f64>,
    #[serde(rename = "type")]
    pub sentiment: Option<Sentiment>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}

impl ModelNewsSentiment {
    #[must_use]
    pub fn reading(&self) -> Reading {
        Reading {
            score: self.score.filter(|s| *s != 0.0).unwrap_or(50.0).clamp(0.0, 100.0),
            sentiment: self.sentiment.unwrap_or(Sentiment::Neutral),
            confidence: self
                .confidence
                .filter(|c| *c != 0.0)
                .unwrap_or(0.7)
                .clamp(0.0, 1.0),
        }
    }
}

/// Prompt asking the model to rate up to 15 headlines.
#[must_use]
pub fn news_prompt(articles: &[NewsArticle]) -> String {
    let news = articles
        .iter()
        .take(15)
        .map(|a| {
            let desc = if a.description.is_empty() {
                "No description"
            } else {
                a.description.as_str()
            };
            format!("{} - {}", a.title, desc)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a professional Bitcoin market analyst. Analyze these recent Bitcoin news headlines and descriptions for market sentiment.

Consider regulatory developments, institutional activity, technical developments, market structure changes and macroeconomic factors affecting Bitcoin.

Provide JSON response with:
- score: number 0-100 (0=extremely bearish, 30=bearish, 50=neutral, 70=bullish, 100=extremely bullish)
- type: \"bullish\", \"bearish\", or \"neutral\"
- confidence: 0-1
- reasoning: brief explanation

Recent Bitcoin news:
{news}

Respond with JSON only:"
    )
}

/// Minimal view of a Reddit post.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialPost {
    pub title: String,
    pub score: i64,
    pub upvote_ratio: f64,
}

const SOCIAL_BULLISH: [&str; 8] = [
    "bullish", "moon", "hodl", "buying", "pump", "rally", "adoption", "institutional",
];
const SOCIAL_BEARISH: [&str; 6] = ["bearish", "crash", "dump", "sell", "fear", "regulation"];

/// Average per-post score from title keywords and engagement.
#[must_use]
pub fn social_sentiment(posts: &[SocialPost]) -> Reading {
    let total: f64 = posts
        .iter()
        .map(|post| {
            let title = post.title.to_lowercase();
            let mut score: f64 = 50.0;
            if SOCIAL_BULLISH.iter().any(|k| title.contains(k)) {
                score += 20.0;
            }
            if SOCIAL_BEARISH.iter().any(|k| title.contains(k)) {
                score -= 20.0;
            }
            if post.score > 100 && post.upvote_ratio > 0.8 {
                score += 10.0;
            }
            if post.score < 50 || post.upvote_ratio < 0.6 {
                score -= 10.0;
            }
            score.clamp(0.0, 100.0)
        })
        .sum();
    let avg = if posts.is_empty() {
        50.0
    } else {
        total / posts.len() as f64
    };
    Reading {
        score: avg,
        sentiment: Sentiment::from_standard_score(avg),
        confidence: 0.75,
    }
}

/// Social proxy from the 24h price change when Reddit is unavailable.
#[must_use]
pub fn price_change_proxy(change_24h: f64) -> Reading {
    let score = (50.0 + change_24h * 2.0).clamp(20.0, 80.0);
    Reading {
        score,
        sentiment: Sentiment::from_standard_score(score),
        confidence: 0.6,
    }
}

/// Inputs for the market data reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketSignals {
    pub market_cap_change_24h: f64,
    pub volume_change_24h: f64,
    /// Latest candle `(close, low, high)`.
    pub candle: Option<(f64, f64, f64)>,
    pub rank: Option<u32>,
}

/// Score from market cap momentum, volume, candle position and rank.
#[must_use]
pub fn market_sentiment(signals: &MarketSignals) -> Reading {
    let mut score: f64 = 50.0;
    if signals.market_cap_change_24h > 2.0 {
        score += 15.0;
    } else if signals.market_cap_change_24h < -2.0 {
        score -= 15.0;
    }
    if signals.volume_change_24h > 10.0 {
        score += 10.0;
    } else if signals.volume_change_24h < -10.0 {
        score -= 10.0;
    }
    if let Some((close, low, high)) = signals.candle {
        if high > low {
            let position = (close - low) / (high - low);
            if position > 0.8 {
                score += 10.0;
            } else if position < 0.2 {
                score -= 10.0;
            }
        }
    }
    if signals.rank == Some(1) {
        score += 5.0;
    }
    let score = score.clamp(20.0, 80.0);
    Reading {
        score,
        sentiment: Sentiment::from_score(score, 55.0, 45.0),
        confidence: 0.8,
    }
}

/// Fear & greed index as a trading activity reading.
#[must_use]
pub fn fear_greed_sentiment(value: f64) -> Reading {
    let value = if value == 0.0 { 50.0 } else { value.clamp(0.0, 100.0) };
    Reading {
        score: value,
        sentiment: Sentiment::from_standard_score(value),
        confidence: 0.85,
    }
}

const ACTIONABLE: [&str; 15] = [
    "breaking out",
    "institutional buying",
    "adoption surge",
    "price target",
    "strong support",
    "selling pressure",
    "resistance level",
    "profit taking",
    "market correction",
    "regulatory concerns",
    "consolidation",
    "range trading",
    "volatility",
    "waiting for breakout",
    "technical analysis",
];
const BULLISH_STEMS: [&str; 9] = [
    "bullish", "surge", "rally", "breakout", "adoption", "institutional", "growth",
    "milestone", "record",
];
const BEARISH_STEMS: [&str; 8] = [
    "bearish", "correction", "selloff", "decline", "regulatory", "resistance", "concerns",
    "liquidation",
];

/// Most frequent actionable phrases in the headlines (top 6), or four
/// general terms when none occur.
#[must_use]
pub fn extract_keywords(articles: &[NewsArticle], overall: Sentiment) -> Vec<Keyword> {
    let text = articles
        .iter()
        .map(NewsArticle::text)
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts: Vec<(&str, usize)> = ACTIONABLE
        .iter()
        .map(|k| (*k, text.matches(k).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    if counts.is_empty() {
        let neutral = |text: &str, weight| Keyword {
            text: text.into(),
            weight,
            sentiment: Sentiment::Neutral,
        };
        return vec![
            neutral("market analysis", 6),
            Keyword {
                text: "price action".into(),
                weight: 5,
                sentiment: overall,
            },
            neutral("trading volume", 4),
            neutral("technical levels", 4),
        ];
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(6)
        .map(|(phrase, n)| {
            let sentiment = if BULLISH_STEMS.iter().any(|s| phrase.contains(s)) {
                Sentiment::Bullish
            } else if BEARISH_STEMS.iter().any(|s| phrase.contains(s)) {
                Sentiment::Bearish
            } else {
                Sentiment::Neutral
            };
            Keyword {
                text: phrase.into(),
                weight: u32::try_from(n.saturating_mul(3)).unwrap_or(u32::MAX).min(10),
                sentiment,
            }
        })
        .collect()
}

/// Combine named readings into the overall picture.
///
/// The overall score is the confidence-weighted mean; overall confidence is
/// the mean confidence.
#[must_use]
pub fn aggregate(
    readings: &[(&str, Reading)],
    keywords: Vec<Keyword>,
    now: DateTime<Utc>,
) -> SentimentData {
    let total_weight: f64 = readings.iter().map(|(_, r)| r.confidence).sum();
    if readings.is_empty() || total_weight <= 0.0 {
        return SentimentData::fallback(now);
    }
    let weighted =
        readings.iter().map(|(_, r)| r.score * r.confidence).sum::<f64>() / total_weight;
    let overall_confidence = total_weight / readings.len() as f64;

    SentimentData {
        overall: Sentiment::from_standard_score(weighted),
        overall_score: weighted.round(),
        confidence: overall_confidence,
        sources: readings
            .iter()
            .map(|(name, r)| SentimentSource {
                source: (*name).to_string(),
                score: r.score,
                sentiment: r.sentiment,
                trend: Trend::from_score(r.score),
                confidence: r.confidence,
                last_updated: now,
            })
            .collect(),
        keywords,
        last_updated: now,
    }
}
