//! Congressional trading disclosure sources.
//!
//! Every source maps its own record layout onto
//! [`CongressionalTrade`](crate::domain::congress::CongressionalTrade).

pub mod finnhub;
pub mod fmp;
pub mod house;
pub mod senate;

pub use finnhub::Finnhub;
pub use fmp::Fmp;
pub use house::HouseStockWatcher;
pub use senate::SenateStockWatcher;

use serde_json::Value;

const UNKNOWN: &str = "Unknown";

/// `true`, `"True"` and `"true"` all count as set.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Trimmed non-empty string, or `None`.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn full_name(first: Option<String>, last: Option<String>) -> String {
    let first = present(first).unwrap_or_else(|| UNKNOWN.into());
    let last = present(last).unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthy_accepts_bool_and_strings() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("True"))));
        assert!(!truthy(Some(&json!("False"))));
        assert!(!truthy(None));
    }

    #[test]
    fn names_default_to_unknown() {
        assert_eq!(full_name(None, Some("Smith".into())), "Unknown Smith");
        assert_eq!(full_name(Some("Jane".into()), None), "Jane");
    }
}
