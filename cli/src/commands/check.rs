use std::path::Path;

use anyhow::Context;
use colored::*;
use credmap_common::rules::RulesFile;
use credmap_core::apply;

use crate::terminal::print;

/// Parses and dry-runs a rules file, reporting what it would produce.
pub fn check(path: &Path) -> anyhow::Result<()> {
    let rules = RulesFile::load(path)?;
    let resolution = apply::apply(&rules)
        .with_context(|| format!("rules file '{}' failed to resolve", path.display()))?;

    let summary = resolution.summary();
    let verdict = format!("'{}' is valid", path.display()).bold().green();
    print::status(verdict.to_string());
    print::status(format!(
        "would produce {} definitions over {} segments ({} addresses)",
        summary.definitions, summary.segments, summary.covered_addresses
    ));
    print::status(format!(
        "discovery: {} addresses, {} include ranges, {} exclude ranges",
        resolution.discovery.addresses().len(),
        resolution.discovery.includes().len(),
        resolution.discovery.excludes().len()
    ));
    if summary.redundant_skips > 0 {
        let note = format!(
            "{} assignment(s) are redundant and would be skipped",
            summary.redundant_skips
        )
        .yellow();
        print::status(note.to_string());
    }
    Ok(())
}
