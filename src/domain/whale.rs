//! Large on-chain Bitcoin transfers from the unconfirmed mempool.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SATS_PER_BTC: f64 = 100_000_000.0;
/// Transfers smaller than this many BTC are ignored.
pub const WHALE_MIN_BTC: f64 = 100.0;
const MAX_TRANSACTIONS: usize = 20;

const KNOWN_EXCHANGES: [&str; 5] = [
    "1NDyJtNTjmwk5xPNhjgAMu4HDHigtobu1s",
    "34xp4vRoCGJym3xR7yCVPFHoCNxv4Twseo",
    "3D2oetdNuZUqQHPJmcMDDHYoqkyNVsFk9r",
    "bc1qgdjqv0av3q56jvd82tkdjpy7gdp9ut8tlqmgrpmv24sq90ecnvqqjwvw97",
    "bc1qa5wkgaew2dkv56kfvj49j0av5nml45x9ek9hz6",
];

fn is_exchange(address: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| KNOWN_EXCHANGES.into_iter().collect())
        .contains(address)
}

/// A mempool transaction as reported by the explorer.
#[derive(Debug, Clone, PartialEq)]
pub struct MempoolTx {
    pub hash: String,
    /// Unix seconds.
    pub time: i64,
    pub first_input: Option<String>,
    pub first_output: Option<String>,
    pub output_sats: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    LargeTransfer,
    ExchangeInflow,
    ExchangeOutflow,
    Unknown,
}

impl TransferKind {
    #[must_use]
    pub fn classify(from: &str, to: &str) -> Self {
        match (is_exchange(from), is_exchange(to)) {
            (true, false) => Self::ExchangeOutflow,
            (false, true) => Self::ExchangeInflow,
            _ => Self::LargeTransfer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    #[must_use]
    pub fn of(amount_btc: f64) -> Self {
        if amount_btc >= 1000.0 {
            Self::High
        } else if amount_btc >= 500.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleTransaction {
    pub hash: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub amount: f64,
    #[serde(rename = "amountUSD")]
    pub amount_usd: f64,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: TransferKind,
    pub significance: Significance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleAlerts {
    pub transactions: Vec<WhaleTransaction>,
    pub current_price: f64,
    pub total_volume24h: f64,
    pub largest_transaction: Option<WhaleTransaction>,
    pub timestamp: DateTime<Utc>,
}

impl WhaleAlerts {
    /// Zeroed payload sent alongside an error.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            transactions: Vec::new(),
            current_price: 0.0,
            total_volume24h: 0.0,
            largest_transaction: None,
            timestamp: now,
        }
    }

    /// Keep transfers of at least [`WHALE_MIN_BTC`], newest first, capped at
    /// twenty. Volume and the largest transfer cover every whale, not only
    /// the ones kept.
    #[must_use]
    pub fn from_mempool(txs: &[MempoolTx], btc_price: f64, now: DateTime<Utc>) -> Self {
        let mut whales: Vec<WhaleTransaction> = txs
            .iter()
            .filter_map(|tx| {
                let amount = tx.output_sats as f64 / SATS_PER_BTC;
                if amount < WHALE_MIN_BTC {
                    return None;
                }
                let from = tx.first_input.clone().unwrap_or_else(|| "Unknown".into());
                let to = tx.first_output.clone().unwrap_or_else(|| "Unknown".into());
                Some(WhaleTransaction {
                    hash: tx.hash.clone(),
                    timestamp: tx.time.saturating_mul(1000),
                    amount,
                    amount_usd: amount * btc_price,
                    kind: TransferKind::classify(&from, &to),
                    significance: Significance::of(amount),
                    from,
                    to,
                })
            })
            .collect();

        let total_volume24h = whales.iter().map(|w| w.amount_usd).sum();
        let largest_transaction = whales
            .iter()
            .fold(None::<&WhaleTransaction>, |best, w| match best {
                Some(b) if b.amount >= w.amount => Some(b),
                _ => Some(w),
            })
            .cloned();

        whales.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        whales.truncate(MAX_TRANSACTIONS);

        Self {
            transactions: whales,
            current_price: btc_price,
            total_volume24h,
            largest_transaction,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, time: i64, btc: f64, from: Option<&str>, to: Option<&str>) -> MempoolTx {
        MempoolTx {
            hash: hash.into(),
            time,
            first_input: from.map(Into::into),
            first_output: to.map(Into::into),
            output_sats: (btc * SATS_PER_BTC) as u64,
        }
    }

    #[test]
    fn classifies_exchange_flows() {
        let binance = KNOWN_EXCHANGES[0];
        assert_eq!(TransferKind::classify(binance, "bc1qcold"), TransferKind::ExchangeOutflow);
        assert_eq!(TransferKind::classify("bc1qcold", binance), TransferKind::ExchangeInflow);
        assert_eq!(TransferKind::classify(binance, KNOWN_EXCHANGES[2]), TransferKind::LargeTransfer);
        assert_eq!(TransferKind::classify("a", "b"), TransferKind::LargeTransfer);
    }

    #[test]
    fn significance_bands() {
        assert_eq!(Significance::of(1000.0), Significance::High);
        assert_eq!(Significance::of(500.0), Significance::Medium);
        assert_eq!(Significance::of(100.0), Significance::Low);
    }

    #[test]
    fn keeps_only_whales_newest_first() {
        let txs = [
            tx("small", 300, 99.0, None, None),
            tx("old", 100, 1200.0, Some("a"), Some(KNOWN_EXCHANGES[1])),
            tx("new", 200, 150.0, None, None),
        ];
        let alerts = WhaleAlerts::from_mempool(&txs, 50_000.0, Utc::now());

        let hashes: Vec<_> = alerts.transactions.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, ["new", "old"]);
        assert_eq!(alerts.transactions[0].timestamp, 200_000);
        assert_eq!(alerts.transactions[0].from, "Unknown");
        assert_eq!(alerts.transactions[1].kind, TransferKind::ExchangeInflow);
        assert_eq!(alerts.total_volume24h, 1350.0 * 50_000.0);
        assert_eq!(alerts.largest_transaction.as_ref().unwrap().hash, "old");
    }

    #[test]
    fn caps_list_but_not_volume() {
        let txs: Vec<_> = (0..25).map(|i| tx(&format!("t{i}"), i, 100.0, None, None)).collect();
        let alerts = WhaleAlerts::from_mempool(&txs, 1.0, Utc::now());
        assert_eq!(alerts.transactions.len(), 20);
        assert_eq!(alerts.transactions[0].hash, "t24");
        assert_eq!(alerts.total_volume24h, 2500.0);
        // ties keep the first seen
        assert_eq!(alerts.largest_transaction.unwrap().hash, "t0");
    }

    #[test]
    fn serializes_with_wire_names() {
        let txs = [tx("h", 1, 100.0, None, None)];
        let json = serde_json::to_value(WhaleAlerts::from_mempool(&txs, 2.0, Utc::now())).unwrap();
        let first = &json["transactions"][0];
        assert_eq!(first["amountUSD"], 200.0);
        assert_eq!(first["type"], "large_transfer");
        assert_eq!(first["significance"], "low");
        assert!(json.get("totalVolume24h").is_some());
    }
}
