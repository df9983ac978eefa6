#![cfg(feature = "integration-tests")]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use bitcoin_hub::application::AppState;
use bitcoin_hub::infrastructure::config::Config;
use bitcoin_hub::port::SystemClock;
use tokio::time::timeout;

fn smoke_enabled() -> bool {
    matches!(env::var("BITCOIN_HUB_SMOKE").ok().as_deref(), Some("1"))
}

fn live_state() -> AppState {
    let config = Config::load_or_default("config.toml").expect("config");
    AppState::from_config(&config, Arc::new(SystemClock))
}

#[tokio::test]
#[ignore = "requires BITCOIN_HUB_SMOKE=1 and network access"]
async fn smoke_live_price_is_not_the_default() {
    if !smoke_enabled() {
        eprintln!("Skipping smoke test (set BITCOIN_HUB_SMOKE=1 to enable)");
        return;
    }

    let state = live_state();
    let price = timeout(Duration::from_secs(30), state.market.price(true))
        .await
        .expect("Timed out fetching price");
    assert!(
        (price.usd - bitcoin_hub::domain::market::FALLBACK_PRICE).abs() > f64::EPSILON,
        "every price source failed"
    );
}

#[tokio::test]
#[ignore = "requires BITCOIN_HUB_SMOKE=1 and network access"]
async fn smoke_live_chart_has_points() {
    if !smoke_enabled() {
        eprintln!("Skipping smoke test (set BITCOIN_HUB_SMOKE=1 to enable)");
        return;
    }

    let state = live_state();
    let points = timeout(
        Duration::from_secs(60),
        state.market.chart(Default::default(), true),
    )
    .await
    .expect("Timed out fetching chart");
    assert!(points.len() > 10);
}
