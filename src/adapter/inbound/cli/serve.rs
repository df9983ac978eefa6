//! Handler for the `serve` command.

use std::sync::Arc;

use tracing::info;

use super::command::ServeArgs;
use super::{load_config, output};
use crate::adapter::inbound::http;
use crate::application::AppState;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::SystemClock;

/// Load config, apply flag overrides, and serve until shutdown.
pub async fn execute(args: &ServeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args);
    config.init_logging();

    print_startup(&config);
    info!(addr = %config.bind_addr(), "bitcoin-hub starting");

    let state = Arc::new(AppState::from_config(&config, Arc::new(SystemClock)));
    http::serve(state, &config.server).await?;

    info!("bitcoin-hub stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || output::is_json() {
        config.logging.format = "json".into();
    }
    if args.no_cors {
        config.server.enable_cors = false;
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Listening", output::highlight(format!("http://{}", config.bind_addr())));
    output::field("CORS", if config.server.enable_cors { "enabled" } else { "disabled" });
    if output::verbosity() > 0 {
        output::field("Timeout", format!("{}ms", config.http.timeout_ms));
        output::field("Price TTL", format!("{}s", config.cache.price_secs));
    }
    let llm = match (&config.keys.xai, &config.keys.openai) {
        (Some(_), _) => "xAI Grok",
        (None, Some(_)) => "OpenAI (chat only)",
        (None, None) => "none, using rule-based fallbacks",
    };
    output::field("LLM", llm);
    output::note("Press Ctrl+C to stop");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::command::ConfigArg;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = ServeArgs {
            config: ConfigArg::default(),
            host: Some("0.0.0.0".into()),
            port: Some(9000),
            log_level: Some("debug".into()),
            json_logs: true,
            no_cors: true,
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(!config.server.enable_cors);
    }

    #[test]
    fn absent_overrides_keep_defaults() {
        let mut config = Config::default();
        apply_overrides(&mut config, &ServeArgs::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert!(config.server.enable_cors);
    }
}
