//! Bitcoin options flow from Deribit.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::deribit::Deribit;
use crate::domain::options::OptionsFlow;
use crate::error::{Error, Result};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::CacheConfig;
use crate::port::Clock;

pub struct OptionsService {
    deribit: Deribit,
    clock: Arc<dyn Clock>,
    cache: TtlCache<OptionsFlow>,
}

impl OptionsService {
    #[must_use]
    pub fn new(deribit: Deribit, cache: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            deribit,
            cache: TtlCache::new(CacheConfig::ttl(cache.options_secs), Arc::clone(&clock)),
            clock,
        }
    }

    /// Put/call ratio, delta exposure, implied volatility and the most
    /// traded contracts.
    ///
    /// # Errors
    ///
    /// Fails when Deribit is unreachable or lists no options and no earlier
    /// snapshot is cached.
    pub async fn flow(&self) -> Result<OptionsFlow> {
        if let Some(data) = self.cache.get_fresh() {
            return Ok(data);
        }

        let fetched = self.deribit.btc_option_books().await.and_then(|books| {
            let flow = OptionsFlow::from_books(&books, self.clock.now());
            if flow.top_contracts.is_empty() {
                return Err(Error::invalid("deribit", "no option instruments"));
            }
            Ok(flow)
        });
        match fetched {
            Ok(flow) => {
                info!(
                    put_call_ratio = flow.put_call_ratio,
                    sentiment = ?flow.market_sentiment,
                    "Options flow refreshed"
                );
                self.cache.put(flow.clone());
                Ok(flow)
            }
            Err(err) => {
                warn!(source = "deribit", error = %err, "Options flow unavailable");
                self.cache.get_any().ok_or(err)
            }
        }
    }
}
