//! # Rules File Model
//!
//! TOML model of the monitoring rules a user authors:
//! * Default SNMP credentials under `[defaults]`.
//! * Ordered `[[snmp]]` and `[[wmi]]` credential assignments.
//! * `[discovery]` address and include/exclude range lists.
//!
//! Addresses stay as strings here; they are parsed when the rules are
//! applied so a malformed entry is reported against the entry that
//! carries it. Rule order is significant: a later credential overrides
//! any part of an earlier one it can replace.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse rules file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// A full rules file, in authoring order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub snmp: Vec<SnmpRule>,
    #[serde(default)]
    pub wmi: Vec<WmiRule>,
    #[serde(default)]
    pub discovery: DiscoveryRules,
}

/// Credentials applied to every address not claimed by a rule below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub community: Option<String>,
    pub version: Option<String>,
}

/// One SNMP credential assignment.
///
/// `begin` absent means the rule updates the default credentials;
/// `end` absent means the rule covers the single address `begin`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnmpRule {
    pub community: String,
    pub version: Option<String>,
    pub port: Option<u16>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

/// One WMI credential assignment, same address semantics as [`SnmpRule`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WmiRule {
    pub username: String,
    pub domain: String,
    pub password: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryRules {
    #[serde(default)]
    pub addresses: Vec<AddressRule>,
    #[serde(default)]
    pub include: Vec<RangeRule>,
    #[serde(default)]
    pub exclude: Vec<RangeRule>,
}

/// A single monitored address with ping tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressRule {
    pub addr: String,
    pub retries: Option<u32>,
    pub timeout: Option<u32>,
}

/// A monitored (or excluded) address range.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeRule {
    pub begin: String,
    pub end: String,
    pub retries: Option<u32>,
    pub timeout: Option<u32>,
}

impl RulesFile {
    /// Reads and parses a rules file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| RulesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses rules from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
