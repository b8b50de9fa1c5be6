use std::path::Path;

use anyhow::Context;
use colored::*;
use credmap_common::rules::RulesFile;
use credmap_core::apply::{self, Resolution};
use credmap_core::credentials::Definition;
use credmap_core::discovery::DiscoveryPlan;

use crate::terminal::print;

/// Resolves a rules file and prints the resulting plan.
pub fn resolve(path: &Path) -> anyhow::Result<()> {
    let rules = RulesFile::load(path)?;
    let resolution: Resolution = apply::apply(&rules)
        .with_context(|| format!("failed to resolve rules from '{}'", path.display()))?;

    print_defaults(&resolution);
    print_definitions(resolution.store.definitions());
    print_discovery(&resolution.discovery);
    print_summary(&resolution);
    Ok(())
}

fn print_defaults(resolution: &Resolution) {
    let defaults = resolution.store.default_attributes();
    if defaults.is_empty() {
        return;
    }
    print::status("default credentials");
    let count = defaults.len();
    for (idx, (key, value)) in defaults.iter().enumerate() {
        print::tree_item(key, &render_value(key, value), idx + 1 == count);
    }
    print::blank();
}

fn print_definitions(definitions: &[Definition]) {
    if definitions.is_empty() {
        print::status("no address-specific credentials defined");
        print::blank();
        return;
    }
    for (idx, def) in definitions.iter().enumerate() {
        print_definition(idx, def);
        if idx + 1 != definitions.len() {
            print::blank();
        }
    }
    print::blank();
}

fn print_definition(idx: usize, def: &Definition) {
    let name = format!("{} {}", def.protocol(), def.label());
    print::tree_head(idx, &name);
    for (key, value) in def.attributes() {
        print::tree_item(key, &render_value(key, value), false);
    }
    let segments = def.segments();
    for (pos, segment) in segments.iter().enumerate() {
        let rendered = segment.to_string().yellow().to_string();
        print::tree_item("covers", &rendered, pos + 1 == segments.len());
    }
}

fn print_discovery(discovery: &DiscoveryPlan) {
    if discovery.addresses().is_empty()
        && discovery.includes().is_empty()
        && discovery.excludes().is_empty()
    {
        return;
    }
    print::status("discovery plan");
    for entry in discovery.addresses() {
        let value = format!(
            "{} (retries {}, timeout {}ms)",
            entry.addr, entry.retries, entry.timeout_ms
        );
        print::tree_item("monitor", &value, false);
    }
    for entry in discovery.includes() {
        print::tree_item("include", &format!("{}-{}", entry.begin, entry.end), false);
    }
    let excludes = discovery.excludes();
    for (pos, entry) in excludes.iter().enumerate() {
        print::tree_item(
            "exclude",
            &format!("{}-{}", entry.begin, entry.end),
            pos + 1 == excludes.len(),
        );
    }
    print::blank();
}

fn print_summary(resolution: &Resolution) {
    let summary = resolution.summary();
    let headline = format!(
        "{} definitions, {} segments, {} addresses covered",
        summary.definitions, summary.segments, summary.covered_addresses
    )
    .bold()
    .green();

    print::fat_separator();
    print::status(headline.to_string());
    if summary.redundant_skips > 0 {
        let note = format!(
            "{} redundant assignment(s) skipped",
            summary.redundant_skips
        )
        .yellow();
        print::status(note.to_string());
    }
}

/// Secrets never hit the terminal in clear text.
fn render_value(key: &str, value: &str) -> String {
    if key == "password" {
        "••••••".dimmed().to_string()
    } else {
        value.to_string()
    }
}
