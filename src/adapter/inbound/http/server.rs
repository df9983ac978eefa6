//! Router construction and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::application::AppState;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::ServerConfig;

/// Every route, with tracing and optional permissive CORS.
pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let api = Router::new()
        .route("/bitcoin/price", get(handlers::bitcoin_price))
        .route("/bitcoin/market-data", get(handlers::bitcoin_market_data))
        .route("/bitcoin/chart", get(handlers::bitcoin_chart))
        .route("/bitcoin/dominance", get(handlers::bitcoin_dominance))
        .route("/crypto/global-metrics", get(handlers::global_metrics))
        .route("/sentiment/analysis", get(handlers::sentiment))
        .route("/financial/treasury", get(handlers::treasury))
        .route("/financial/fed-watch", get(handlers::fed_watch))
        .route("/financial/fedwatch", get(handlers::fed_watch))
        .route("/financial/markets", get(handlers::financial_markets))
        .route("/financial/inflation", get(handlers::inflation))
        .route("/liquidity", get(handlers::liquidity))
        .route("/whale-alerts", get(handlers::whale_alerts))
        .route("/options-flow", get(handlers::options_flow))
        .route("/worldbank/economic-data", get(handlers::economic_data))
        .route(
            "/worldbank/indicator/:country/:indicator",
            get(handlers::economic_indicator),
        )
        .route(
            "/worldbank/timeseries/:country/:indicator",
            get(handlers::economic_time_series),
        )
        .route("/politics/congressional-trades", get(handlers::congressional_trades))
        .route("/ai/multi-timeframe-predictions", get(handlers::predictions))
        .route("/chatbot/ask", post(handlers::chatbot_ask))
        .route("/last-updated", get(handlers::last_updated));

    let router = Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .with_state(state);

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
    } else {
        router
    };
    router.layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error when the address is invalid or cannot be bound.
pub async fn serve(state: Arc<AppState>, server: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
            field: "server.host",
            reason: e.to_string(),
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, cors = server.enable_cors, "API listening");

    axum::serve(listener, router(state, server.enable_cors))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
