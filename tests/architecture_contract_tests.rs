//! Layering contract tests.

mod support;

use support::architecture::{find_lines_containing, path_exists, read_relative};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "tokio::",
            "reqwest::",
            "axum::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::application", "crate::infrastructure"],
    );
    assert!(hits.is_empty(), "ports reach outward: {hits:#?}");
}

#[test]
fn outbound_adapters_do_not_know_services_or_routes() {
    let hits = find_lines_containing(
        "src/adapter/outbound",
        &["crate::application", "crate::adapter::inbound", "axum::"],
    );
    assert!(
        hits.is_empty(),
        "outbound adapters import inbound or application code: {hits:#?}"
    );
}

#[test]
fn services_do_not_import_the_http_surface() {
    let hits = find_lines_containing("src/application", &["crate::adapter::inbound", "axum::"]);
    assert!(hits.is_empty(), "services depend on the router: {hits:#?}");
}

#[test]
fn llm_contract_lives_in_outbound_port() {
    assert!(
        path_exists("src/port/outbound/llm.rs"),
        "LLM trait contract should live under port/outbound"
    );
    for service in ["src/application/prediction.rs", "src/application/sentiment.rs"] {
        let source = read_relative(service);
        assert!(
            !source.contains("ChatCompletions"),
            "{service} should depend on the Llm port, not a concrete client"
        );
    }
}

#[test]
fn services_read_time_through_the_clock_port() {
    let hits = find_lines_containing("src/application", &["Utc::now()"]);
    assert!(
        hits.is_empty(),
        "services should use the injected clock: {hits:#?}"
    );
}
