//! Blockchain.com explorer: unconfirmed mempool transactions.

use serde::Deserialize;

use crate::domain::whale::MempoolTx;
use crate::error::Result;
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "blockchain.com";

#[derive(Debug, Clone)]
pub struct Blockchain {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Unconfirmed {
    #[serde(default)]
    txs: Vec<RawTx>,
}

#[derive(Deserialize)]
struct RawTx {
    hash: String,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Deserialize)]
struct RawInput {
    prev_out: Option<RawOutput>,
}

#[derive(Deserialize)]
struct RawOutput {
    addr: Option<String>,
    #[serde(default)]
    value: u64,
}

impl Blockchain {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Transactions currently waiting in the mempool, with their summed
    /// output value.
    pub async fn unconfirmed(&self) -> Result<Vec<MempoolTx>> {
        let url = build_url(
            &self.base_url,
            "/unconfirmed-transactions",
            &[("format", "json")],
        )?;
        let body: Unconfirmed = self.http.get_json(SOURCE, &url).await?;

        Ok(body
            .txs
            .into_iter()
            .map(|tx| MempoolTx {
                output_sats: tx.out.iter().map(|o| o.value).sum(),
                first_input: tx
                    .inputs
                    .into_iter()
                    .next()
                    .and_then(|i| i.prev_out)
                    .and_then(|o| o.addr),
                first_output: tx.out.into_iter().next().and_then(|o| o.addr),
                hash: tx.hash,
                time: tx.time,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn sums_outputs_and_reads_first_addresses() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/unconfirmed-transactions")
            .match_query(Matcher::UrlEncoded("format".into(), "json".into()))
            .with_body(
                r#"{"txs":[
                {"hash":"aa","time":1700000000,
                 "inputs":[{"prev_out":{"addr":"from1","value":5}}],
                 "out":[{"addr":"to1","value":15000000000},{"value":2500000000}]},
                {"hash":"bb","time":1700000001,"inputs":[{}],"out":[]}]}"#,
            )
            .create_async()
            .await;

        let client = Blockchain::new(HttpFetcher::from_config(&HttpConfig::default()), server.url());
        let txs = client.unconfirmed().await.unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].output_sats, 17_500_000_000);
        assert_eq!(txs[0].first_input.as_deref(), Some("from1"));
        assert_eq!(txs[0].first_output.as_deref(), Some("to1"));
        assert_eq!(txs[1].first_input, None);
        assert_eq!(txs[1].output_sats, 0);
    }
}
