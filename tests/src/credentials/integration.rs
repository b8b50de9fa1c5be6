#![cfg(test)]
use credmap_common::network::segment::Segment;
use credmap_common::rules::RulesFile;
use credmap_core::apply::{self, Resolution};
use credmap_core::credentials::{DOMAIN, Definition, Protocol, READ_COMMUNITY, USERNAME};

fn resolve(text: &str) -> Resolution {
    let rules = RulesFile::from_toml(text).expect("rules should parse");
    apply::apply(&rules).expect("rules should resolve")
}

fn segments(def: &Definition) -> Vec<String> {
    def.segments().iter().map(Segment::to_string).collect()
}

/// No address may end up covered by two definitions.
fn assert_partition(resolution: &Resolution) {
    let all: Vec<(usize, Segment)> = resolution
        .store
        .definitions()
        .iter()
        .enumerate()
        .flat_map(|(i, def)| def.segments().iter().map(move |seg| (i, *seg)))
        .collect();
    for (pos, (def_a, seg_a)) in all.iter().enumerate() {
        for (def_b, seg_b) in all.iter().skip(pos + 1) {
            assert!(
                def_a == def_b || !seg_a.intersects(seg_b.begin(), seg_b.end()),
                "definitions {def_a} and {def_b} overlap on {seg_a} / {seg_b}"
            );
        }
    }
}

/// The reference rules file: a default community, one versioned range
/// and two specifics sharing a community.
#[test]
fn reference_rules_resolve_deterministically() {
    let resolution = resolve(
        r#"
        [defaults]
        community = "public"
        version = "v2c"

        [[snmp]]
        community = "public"
        version = "v1"
        begin = "192.168.0.10"
        end = "192.168.0.19"

        [[snmp]]
        community = "private"
        begin = "192.168.1.13"

        [[snmp]]
        community = "private"
        begin = "192.168.1.37"
        "#,
    );

    let definitions = resolution.store.definitions();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].attributes()[READ_COMMUNITY], "public");
    assert_eq!(segments(&definitions[0]), vec!["192.168.0.10-192.168.0.19"]);
    assert_eq!(definitions[1].attributes()[READ_COMMUNITY], "private");
    assert_eq!(segments(&definitions[1]), vec!["192.168.1.13", "192.168.1.37"]);
    assert_eq!(resolution.store.default_attributes()[READ_COMMUNITY], "public");
    assert_partition(&resolution);
}

/// The documented override example: a range for account A, then one
/// address for account B carved out of the middle of it.
#[test]
fn later_wmi_account_carves_an_earlier_range() {
    let resolution = resolve(
        r#"
        [[wmi]]
        username = "acct-a"
        domain = "CORP"
        begin = "192.168.0.1"
        end = "192.168.0.254"

        [[wmi]]
        username = "acct-b"
        domain = "CORP"
        begin = "192.168.0.8"
        "#,
    );

    let definitions = resolution.store.definitions();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].attributes()[USERNAME], "acct-a");
    assert_eq!(
        segments(&definitions[0]),
        vec!["192.168.0.1-192.168.0.7", "192.168.0.9-192.168.0.254"]
    );
    assert_eq!(definitions[1].attributes()[USERNAME], "acct-b");
    assert_eq!(segments(&definitions[1]), vec!["192.168.0.8"]);
    assert_partition(&resolution);
}

#[test]
fn snmp_and_wmi_rules_share_the_address_space() {
    let resolution = resolve(
        r#"
        [[snmp]]
        community = "public"
        begin = "10.0.0.1"
        end = "10.0.0.100"

        [[wmi]]
        username = "monitor"
        domain = "CORP"
        password = "secret"
        begin = "10.0.0.40"
        end = "10.0.0.60"
        "#,
    );

    let definitions = resolution.store.definitions();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].protocol(), Protocol::Snmp);
    assert_eq!(
        segments(&definitions[0]),
        vec!["10.0.0.1-10.0.0.39", "10.0.0.61-10.0.0.100"]
    );
    assert_eq!(definitions[1].protocol(), Protocol::Wmi);
    assert_eq!(definitions[1].attributes()[DOMAIN], "CORP");
    assert_eq!(segments(&definitions[1]), vec!["10.0.0.40-10.0.0.60"]);
    assert_partition(&resolution);
}

/// Successive overrides keep the store a partition whatever the order.
#[test]
fn layered_overrides_stay_disjoint() {
    let resolution = resolve(
        r#"
        [[snmp]]
        community = "a"
        begin = "172.16.0.1"
        end = "172.16.3.254"

        [[snmp]]
        community = "b"
        begin = "172.16.1.0"
        end = "172.16.1.255"

        [[snmp]]
        community = "c"
        begin = "172.16.1.128"

        [[snmp]]
        community = "a"
        begin = "172.16.1.10"
        "#,
    );

    let definitions = resolution.store.definitions();
    assert_eq!(definitions.len(), 3);
    assert_eq!(
        segments(&definitions[0]),
        vec![
            "172.16.0.1-172.16.0.255",
            "172.16.1.10",
            "172.16.2.0-172.16.3.254",
        ]
    );
    assert_eq!(
        segments(&definitions[1]),
        vec![
            "172.16.1.0-172.16.1.9",
            "172.16.1.11-172.16.1.127",
            "172.16.1.129-172.16.1.255",
        ]
    );
    assert_eq!(segments(&definitions[2]), vec!["172.16.1.128"]);
    assert_partition(&resolution);
}

#[test]
fn rules_without_addresses_only_shape_the_defaults() {
    let resolution = resolve(
        r#"
        [[snmp]]
        community = "first"

        [[snmp]]
        community = "second"
        version = "v3"
        "#,
    );

    assert!(resolution.store.definitions().is_empty());
    assert_eq!(resolution.store.default_attributes()[READ_COMMUNITY], "second");
    assert_eq!(resolution.store.default_attributes()["version"], "v3");
    assert_eq!(resolution.summary().definitions, 0);
}

#[test]
fn inverted_range_fails_the_whole_resolution() {
    let rules = RulesFile::from_toml(
        r#"
        [[snmp]]
        community = "public"
        begin = "10.0.0.50"
        end = "10.0.0.10"
        "#,
    )
    .unwrap();
    let err = apply::apply(&rules).unwrap_err();
    assert!(format!("{err:#}").contains("snmp credential #1"));
}
