#![cfg(test)]
use credmap_common::rules::RulesFile;
use credmap_core::apply::{self, Resolution};
use credmap_core::discovery::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS};

fn resolve(text: &str) -> Resolution {
    let rules = RulesFile::from_toml(text).expect("rules should parse");
    apply::apply(&rules).expect("rules should resolve")
}

#[test]
fn discovery_lists_flow_through_resolution() {
    let resolution = resolve(
        r#"
        [discovery]
        addresses = [
            { addr = "192.168.1.13" },
            { addr = "192.168.1.37", retries = 3, timeout = 500 },
        ]
        include = [{ begin = "192.168.0.1", end = "192.168.0.254" }]
        exclude = [{ begin = "10.0.2.0", end = "10.0.2.255" }]
        "#,
    );

    let discovery = &resolution.discovery;
    assert_eq!(discovery.addresses().len(), 2);
    assert_eq!(discovery.addresses()[0].retries, DEFAULT_RETRIES);
    assert_eq!(discovery.addresses()[0].timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(discovery.addresses()[1].retries, 3);
    assert_eq!(discovery.addresses()[1].timeout_ms, 500);
    assert_eq!(discovery.includes().len(), 1);
    assert_eq!(discovery.excludes().len(), 1);
}

#[test]
fn broad_include_supersedes_narrow_ones() {
    let resolution = resolve(
        r#"
        [discovery]
        include = [
            { begin = "192.168.0.10", end = "192.168.0.20" },
            { begin = "192.168.0.30", end = "192.168.0.40" },
            { begin = "192.168.0.1", end = "192.168.0.254" },
            { begin = "192.168.0.50", end = "192.168.0.60" },
        ]
        "#,
    );

    let includes = resolution.discovery.includes();
    assert_eq!(includes.len(), 1);
    assert_eq!(includes[0].begin.to_string(), "192.168.0.1");
    assert_eq!(includes[0].end.to_string(), "192.168.0.254");
}

#[test]
fn repeated_address_keeps_the_last_tuning() {
    let resolution = resolve(
        r#"
        [discovery]
        addresses = [
            { addr = "192.168.1.13", retries = 1 },
            { addr = "192.168.1.13", retries = 9, timeout = 100 },
        ]
        "#,
    );

    let addresses = resolution.discovery.addresses();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].retries, 9);
    assert_eq!(addresses[0].timeout_ms, 100);
}

#[test]
fn malformed_discovery_entry_is_reported_against_its_list() {
    let rules = RulesFile::from_toml(
        r#"
        [discovery]
        exclude = [{ begin = "10.0.2.255", end = "10.0.2.0" }]
        "#,
    )
    .unwrap();
    let err = apply::apply(&rules).unwrap_err();
    assert!(format!("{err:#}").contains("exclude range #1"));
}
