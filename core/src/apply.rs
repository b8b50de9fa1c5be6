//! # Rules Application
//!
//! Walks a parsed rules file in authoring order and drives the
//! credential store and discovery plan with it. Order matters: a later
//! credential overrides any part of an earlier one it can replace.

use anyhow::Context;
use credmap_common::network::addr::Addr;
use credmap_common::rules::{AddressRule, RangeRule, RulesFile, SnmpRule, WmiRule};
use tracing::debug;

use crate::credentials::{
    AttributeMap, CredentialStore, DOMAIN, Protocol, READ_COMMUNITY, USERNAME, VERSION,
};
use crate::discovery::DiscoveryPlan;

/// Everything a rules file resolves to.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub store: CredentialStore,
    pub discovery: DiscoveryPlan,
}

/// Headline numbers for terminal reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub definitions: usize,
    pub segments: usize,
    pub covered_addresses: u64,
    pub redundant_skips: usize,
}

impl Resolution {
    pub fn summary(&self) -> Summary {
        let definitions = self.store.definitions();
        Summary {
            definitions: definitions.len(),
            segments: definitions.iter().map(|def| def.segments().len()).sum(),
            covered_addresses: definitions.iter().map(|def| def.address_count()).sum(),
            redundant_skips: self.store.redundant_skips(),
        }
    }
}

/// Resolves a whole rules file.
pub fn apply(rules: &RulesFile) -> anyhow::Result<Resolution> {
    let mut store = CredentialStore::new(default_attributes(rules));
    let mut discovery = DiscoveryPlan::new();

    for (index, rule) in rules.snmp.iter().enumerate() {
        apply_snmp(&mut store, rule)
            .with_context(|| format!("snmp credential #{}", index + 1))?;
    }
    for (index, rule) in rules.wmi.iter().enumerate() {
        apply_wmi(&mut store, rule).with_context(|| format!("wmi credential #{}", index + 1))?;
    }
    for (index, rule) in rules.discovery.addresses.iter().enumerate() {
        apply_address(&mut discovery, rule)
            .with_context(|| format!("discovery address #{}", index + 1))?;
    }
    for (index, rule) in rules.discovery.include.iter().enumerate() {
        apply_range(&mut discovery, rule, true)
            .with_context(|| format!("include range #{}", index + 1))?;
    }
    for (index, rule) in rules.discovery.exclude.iter().enumerate() {
        apply_range(&mut discovery, rule, false)
            .with_context(|| format!("exclude range #{}", index + 1))?;
    }

    debug!(
        definitions = store.definitions().len(),
        "rules applied"
    );
    Ok(Resolution { store, discovery })
}

/// Default credentials from the `[defaults]` section.
fn default_attributes(rules: &RulesFile) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    if let Some(community) = &rules.defaults.community {
        attributes.insert(READ_COMMUNITY.to_string(), community.clone());
    }
    if let Some(version) = &rules.defaults.version {
        attributes.insert(VERSION.to_string(), version.clone());
    }
    attributes
}

fn apply_snmp(store: &mut CredentialStore, rule: &SnmpRule) -> anyhow::Result<()> {
    let mut attributes = AttributeMap::new();
    // The user-facing key is `community`; the definition carries it as
    // the `read-community` attribute.
    attributes.insert(READ_COMMUNITY.to_string(), rule.community.clone());
    if let Some(version) = &rule.version {
        attributes.insert(VERSION.to_string(), version.clone());
    }
    if let Some(port) = rule.port {
        attributes.insert("port".to_string(), port.to_string());
    }
    let (begin, end) = parse_bounds(rule.begin.as_deref(), rule.end.as_deref())?;
    store.assign(Protocol::Snmp, begin, end, attributes)?;
    Ok(())
}

fn apply_wmi(store: &mut CredentialStore, rule: &WmiRule) -> anyhow::Result<()> {
    let mut attributes = AttributeMap::new();
    attributes.insert(USERNAME.to_string(), rule.username.clone());
    attributes.insert(DOMAIN.to_string(), rule.domain.clone());
    if let Some(password) = &rule.password {
        attributes.insert("password".to_string(), password.clone());
    }
    let (begin, end) = parse_bounds(rule.begin.as_deref(), rule.end.as_deref())?;
    store.assign(Protocol::Wmi, begin, end, attributes)?;
    Ok(())
}

fn apply_address(discovery: &mut DiscoveryPlan, rule: &AddressRule) -> anyhow::Result<()> {
    let addr: Addr = rule.addr.parse()?;
    discovery.add_address(addr, rule.retries, rule.timeout);
    Ok(())
}

fn apply_range(
    discovery: &mut DiscoveryPlan,
    rule: &RangeRule,
    include: bool,
) -> anyhow::Result<()> {
    let begin: Addr = rule.begin.parse()?;
    let end: Addr = rule.end.parse()?;
    if include {
        discovery.include(begin, end, rule.retries, rule.timeout)?;
    } else {
        discovery.exclude(begin, end)?;
    }
    Ok(())
}

fn parse_bounds(
    begin: Option<&str>,
    end: Option<&str>,
) -> anyhow::Result<(Option<Addr>, Option<Addr>)> {
    let begin: Option<Addr> = begin.map(str::parse).transpose()?;
    let end: Option<Addr> = end.map(str::parse).transpose()?;
    Ok((begin, end))
}
