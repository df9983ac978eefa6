//! Route handlers. Each one delegates to a service on [`AppState`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ApiError;
use crate::application::AppState;
use crate::domain::chat::{ChatRequest, ChatResponse};
use crate::domain::congress::HouseStockData;
use crate::domain::dominance::{DominanceData, GlobalCryptoMetrics};
use crate::domain::economy::{EconomicIndicator, GlobalEconomicData, SeriesPoint};
use crate::domain::financial::{FedWatchData, FinancialMarketData, TreasuryData};
use crate::domain::inflation::InflationData;
use crate::domain::liquidity::LiquidityData;
use crate::domain::market::{BitcoinMarketData, BitcoinPrice, ChartPoint, Timeframe};
use crate::domain::options::OptionsFlow;
use crate::domain::prediction::MultiTimeframePredictions;
use crate::domain::sentiment::SentimentData;
use crate::domain::whale::WhaleAlerts;

type AppStateRef = State<Arc<AppState>>;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    refresh: Option<String>,
}

impl RefreshQuery {
    fn requested(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    timeframe: Option<String>,
    refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YearsQuery {
    years: Option<String>,
}

impl YearsQuery {
    /// Positive year count; anything unparsable means "use the default".
    fn years(&self) -> Option<u32> {
        self.years
            .as_deref()
            .and_then(|y| y.trim().parse().ok())
            .filter(|y| *y > 0)
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn bitcoin_price(
    State(state): AppStateRef,
    Query(q): Query<RefreshQuery>,
) -> Json<BitcoinPrice> {
    Json(state.market.price(q.requested()).await)
}

pub async fn bitcoin_market_data(
    State(state): AppStateRef,
    Query(q): Query<RefreshQuery>,
) -> Json<BitcoinMarketData> {
    Json(state.market.market_data(q.requested()).await)
}

pub async fn bitcoin_chart(
    State(state): AppStateRef,
    Query(q): Query<ChartQuery>,
) -> Json<Vec<ChartPoint>> {
    let timeframe = q.timeframe.as_deref().map(Timeframe::parse).unwrap_or_default();
    let refresh = q.refresh.as_deref() == Some("true");
    Json(state.market.chart(timeframe, refresh).await)
}

pub async fn bitcoin_dominance(
    State(state): AppStateRef,
    Query(q): Query<RefreshQuery>,
) -> Json<DominanceData> {
    Json(state.dominance.dominance(q.requested()).await)
}

pub async fn global_metrics(State(state): AppStateRef) -> Json<GlobalCryptoMetrics> {
    Json(state.dominance.global_metrics().await)
}

pub async fn sentiment(State(state): AppStateRef) -> Json<SentimentData> {
    Json(state.sentiment.analysis().await)
}

pub async fn treasury(State(state): AppStateRef) -> Result<Json<TreasuryData>, ApiError> {
    state.financial.treasury().await.map(Json).map_err(|err| {
        warn!(error = %err, "Treasury request failed");
        ApiError::unavailable(
            "Unable to fetch live Treasury data. Please check if financial data providers are accessible.",
            &err,
        )
    })
}

pub async fn fed_watch(State(state): AppStateRef) -> Json<FedWatchData> {
    Json(state.financial.fed_watch())
}

pub async fn inflation(
    State(state): AppStateRef,
    Query(q): Query<RefreshQuery>,
) -> Json<InflationData> {
    Json(state.financial.inflation(q.requested()).await)
}

pub async fn liquidity(State(state): AppStateRef) -> Json<LiquidityData> {
    Json(state.liquidity.liquidity().await)
}

pub async fn whale_alerts(State(state): AppStateRef) -> Result<Json<WhaleAlerts>, ApiError> {
    state.whales.alerts().await.map(Json).map_err(|err| {
        warn!(error = %err, "Whale alerts request failed");
        ApiError::failed(
            "Failed to fetch whale alerts",
            &err,
            serde_json::to_value(WhaleAlerts::empty(state.now())).unwrap_or_default(),
        )
    })
}

pub async fn options_flow(State(state): AppStateRef) -> Result<Json<OptionsFlow>, ApiError> {
    state.options.flow().await.map(Json).map_err(|err| {
        warn!(error = %err, "Options flow request failed");
        ApiError::failed(
            "Failed to fetch options flow data",
            &err,
            serde_json::to_value(OptionsFlow::unavailable(state.now())).unwrap_or_default(),
        )
    })
}

pub async fn financial_markets(State(state): AppStateRef) -> Json<FinancialMarketData> {
    Json(state.financial.markets().await)
}

pub async fn economic_data(State(state): AppStateRef) -> Json<GlobalEconomicData> {
    Json(state.economy.dashboard().await)
}

pub async fn economic_indicator(
    State(state): AppStateRef,
    Path((country, indicator)): Path<(String, String)>,
    Query(q): Query<YearsQuery>,
) -> Json<Option<EconomicIndicator>> {
    Json(state.economy.indicator(&country, &indicator, q.years()).await)
}

pub async fn economic_time_series(
    State(state): AppStateRef,
    Path((country, indicator)): Path<(String, String)>,
    Query(q): Query<YearsQuery>,
) -> Json<Vec<SeriesPoint>> {
    Json(state.economy.time_series(&country, &indicator, q.years()).await)
}

pub async fn congressional_trades(State(state): AppStateRef) -> Json<HouseStockData> {
    Json(state.congress.trades().await)
}

pub async fn predictions(State(state): AppStateRef) -> Json<MultiTimeframePredictions> {
    Json(state.predictions.predictions().await)
}

/// Unparseable bodies and non-string questions get the same 400 as a
/// missing question.
pub async fn chatbot_ask(
    State(state): AppStateRef,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "Unreadable chat request");
        ChatRequest::default()
    });
    let question = request
        .question()
        .ok_or_else(|| ApiError::bad_request("Question is required"))?;
    let answer = state.chat.ask(question).await;
    Ok(Json(ChatResponse { answer }))
}

pub async fn last_updated(State(state): AppStateRef) -> Json<String> {
    Json(state.last_updated())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_query_ignores_garbage() {
        let q = |s: &str| YearsQuery {
            years: Some(s.into()),
        };
        assert_eq!(q("15").years(), Some(15));
        assert_eq!(q("abc").years(), None);
        assert_eq!(q("0").years(), None);
        assert_eq!(YearsQuery::default().years(), None);
    }

    #[test]
    fn only_literal_true_refreshes() {
        let q = |s: &str| RefreshQuery {
            refresh: Some(s.into()),
        };
        assert!(q("true").requested());
        assert!(!q("1").requested());
        assert!(!RefreshQuery::default().requested());
    }
}
