//! Technical indicators over a daily close series.
//!
//! All functions take closes oldest-first.

/// Minimum number of closes needed for [`TechnicalIndicators::compute`].
pub const MIN_PRICES: usize = 30;

/// Snapshot of the indicators fed into the prediction prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub sma20: f64,
    /// `None` when fewer than 50 closes are available.
    pub sma50: Option<f64>,
    pub ema12: f64,
    pub ema26: f64,
    pub macd: f64,
    /// Annualised volatility of the last 30 daily returns, percent.
    pub volatility: f64,
    /// Last-7 vs last-30 average volume, percent.
    pub volume_trend: f64,
    /// Change over the last 30 closes, percent.
    pub momentum_30d: f64,
    pub last_price: f64,
}

impl TechnicalIndicators {
    /// Compute every indicator, or `None` with fewer than [`MIN_PRICES`]
    /// closes.
    #[must_use]
    pub fn compute(prices: &[f64], volumes: &[f64]) -> Option<Self> {
        if prices.len() < MIN_PRICES {
            return None;
        }
        let rsi = rsi(prices, 14).last().copied()?;
        let sma20 = sma(prices, 20).last().copied()?;
        let sma50 = sma(prices, 50).last().copied();
        let ema12 = ema(prices, 12)?;
        let ema26 = ema(prices, 26)?;
        let last_price = *prices.last()?;
        let base = prices[prices.len() - 30];
        let momentum_30d = if base == 0.0 {
            0.0
        } else {
            (last_price - base) / base * 100.0
        };

        Some(Self {
            rsi,
            sma20,
            sma50,
            ema12,
            ema26,
            macd: ema12 - ema26,
            volatility: volatility(prices, 30),
            volume_trend: volume_trend(volumes),
            momentum_30d,
            last_price,
        })
    }

    #[must_use]
    pub fn rsi_status(&self) -> &'static str {
        if self.rsi > 70.0 {
            "Overbought"
        } else if self.rsi < 30.0 {
            "Oversold"
        } else {
            "Neutral"
        }
    }

    #[must_use]
    pub fn volatility_status(&self) -> &'static str {
        if self.volatility > 60.0 {
            "High"
        } else if self.volatility > 40.0 {
            "Moderate"
        } else {
            "Low"
        }
    }
}

/// RSI over sliding windows of `period` changes, using simple averages.
/// A zero average loss is treated as one.
#[must_use]
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return Vec::new();
    }
    (period..prices.len())
        .map(|i| {
            let (gains, losses) = prices[i + 1 - period..=i]
                .iter()
                .zip(&prices[i - period..i])
                .map(|(cur, prev)| cur - prev)
                .fold((0.0, 0.0), |(g, l), change| {
                    if change > 0.0 {
                        (g + change, l)
                    } else {
                        (g, l - change)
                    }
                });
            let avg_gain = gains / period as f64;
            let avg_loss = losses / period as f64;
            let rs = avg_gain / if avg_loss == 0.0 { 1.0 } else { avg_loss };
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect()
}

/// Simple moving average for every full window.
#[must_use]
pub fn sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential moving average seeded with the first close.
#[must_use]
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    let (first, rest) = prices.split_first()?;
    let k = 2.0 / (period as f64 + 1.0);
    Some(rest.iter().fold(*first, |ema, p| p * k + ema * (1.0 - k)))
}

/// Annualised standard deviation of the last `period` simple returns,
/// as a percentage.
#[must_use]
pub fn volatility(prices: &[f64], period: usize) -> f64 {
    if period == 0 {
        return 0.0;
    }
    let returns: Vec<f64> = prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect();
    let recent = &returns[returns.len().saturating_sub(period)..];
    let n = period as f64;
    let mean = recent.iter().sum::<f64>() / n;
    let variance = recent.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() * 365f64.sqrt() * 100.0
}

/// Average of the last 7 volumes relative to the last 30, percent.
#[must_use]
pub fn volume_trend(volumes: &[f64]) -> f64 {
    let tail = |n: usize| volumes[volumes.len().saturating_sub(n)..].iter().sum::<f64>() / n as f64;
    let month = tail(30);
    if month == 0.0 {
        return 0.0;
    }
    (tail(7) - month) / month * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn rsi_of_monotonic_rise_is_high() {
        // Avg loss of zero is treated as one, so RSI is finite.
        let values = rsi(&ramp(20), 14);
        assert_eq!(values.len(), 6);
        let rs = 1.0;
        assert!((values[0] - (100.0 - 100.0 / (1.0 + rs))).abs() < 1e-9);
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        let prices: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 12.0 }).collect();
        let values = rsi(&prices, 14);
        for v in values {
            assert!((v - 50.0).abs() < 10.0);
        }
    }

    #[test]
    fn sma_windows() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.5, 2.5, 3.5]);
        assert!(sma(&[1.0], 2).is_empty());
    }

    #[test]
    fn ema_of_constant_is_constant() {
        assert_eq!(ema(&[5.0; 40], 12), Some(5.0));
        assert_eq!(ema(&[], 12), None);
    }

    #[test]
    fn volatility_of_constant_is_zero() {
        assert_eq!(volatility(&[100.0; 40], 30), 0.0);
    }

    #[test]
    fn volume_trend_detects_surge() {
        let mut volumes = vec![100.0; 23];
        volumes.extend([200.0; 7]);
        let trend = volume_trend(&volumes);
        // last-7 avg 200, last-30 avg 130
        assert!((trend - (70.0 / 130.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn compute_requires_thirty_prices() {
        assert!(TechnicalIndicators::compute(&ramp(29), &[]).is_none());
        let ind = TechnicalIndicators::compute(&ramp(60), &[1.0; 60]).unwrap();
        assert_eq!(ind.last_price, 60.0);
        assert!(ind.sma50.is_some());
        assert!((ind.momentum_30d - (60.0 - 31.0) / 31.0 * 100.0).abs() < 1e-9);
        assert!(ind.macd > 0.0);
        assert_eq!(ind.volume_trend, 0.0);
    }

    #[test]
    fn sma50_absent_with_short_history() {
        let ind = TechnicalIndicators::compute(&ramp(40), &[]).unwrap();
        assert!(ind.sma50.is_none());
    }

    #[test]
    fn status_labels() {
        let mut ind = TechnicalIndicators::compute(&ramp(40), &[]).unwrap();
        ind.rsi = 75.0;
        ind.volatility = 50.0;
        assert_eq!(ind.rsi_status(), "Overbought");
        assert_eq!(ind.volatility_status(), "Moderate");
    }
}
