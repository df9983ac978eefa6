//! Handler for the `check` command.

use super::command::CheckArgs;
use super::{load_config, output};
use crate::error::Result;
use crate::infrastructure::config::{ApiKeys, Config};

/// Validate the configuration and list which API keys are set.
///
/// Missing keys are warnings: every route still answers, from another
/// source or a built-in default.
pub fn execute(args: &CheckArgs) -> Result<()> {
    let path = args.config.resolve();
    let config = load_config(&args.config)?;

    output::section("Configuration");
    if path.exists() {
        output::field("File", path.display());
    } else {
        output::field("File", "none, using defaults");
    }
    output::success("Configuration is valid");
    output::field("Listen", config.bind_addr());
    output::field("Upstream timeout", format!("{}ms", config.http.timeout_ms));

    output::section("API keys");
    let missing = report_keys(&config.keys);

    output::section("Summary");
    if missing == 0 {
        output::success("All API keys configured");
    } else {
        output::hint(&format!(
            "{missing} key(s) unset; affected data falls back to other sources or defaults"
        ));
    }
    if !has_llm(&config) {
        output::warning("No LLM key set; predictions, news scoring and chat use rule-based fallbacks");
    }
    Ok(())
}

fn report_keys(keys: &ApiKeys) -> usize {
    let mut missing = 0;
    for (name, present) in keys.presence() {
        if present {
            output::success(name);
        } else {
            output::field(name, "not set");
            missing += 1;
        }
    }
    missing
}

fn has_llm(config: &Config) -> bool {
    config.keys.xai.is_some() || config.keys.openai.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_presence_accepts_either_provider() {
        let mut config = Config::default();
        assert!(!has_llm(&config));
        config.keys.openai = Some("sk-test".into());
        assert!(has_llm(&config));
    }

    #[test]
    fn report_counts_missing_keys() {
        let keys = ApiKeys {
            fred: Some("k".into()),
            news: Some("k".into()),
            ..ApiKeys::default()
        };
        assert_eq!(report_keys(&keys), 5);
    }
}
