//! # Credential Definitions
//!
//! Data model for credentialed address coverage. A [`Definition`] binds
//! one attribute set (SNMP community details or WMI account details) to
//! an ordered list of disjoint [`Segment`]s. Definitions are matched and
//! reused by their identity attributes:
//!
//! * SNMP: `read-community`, plus `version` when both sides carry one
//!   (two definitions without a version also match).
//! * WMI: `username` and `domain`.
//!
//! The resolution algorithm itself lives in [`store`].

use std::collections::BTreeMap;
use std::fmt;

use credmap_common::network::addr::Addr;
use credmap_common::network::segment::Segment;
use thiserror::Error;

mod store;

pub use store::CredentialStore;

/// Attribute key carrying the SNMP community string.
pub const READ_COMMUNITY: &str = "read-community";
/// Attribute key carrying the SNMP protocol version.
pub const VERSION: &str = "version";
/// Attribute key carrying the WMI account name.
pub const USERNAME: &str = "username";
/// Attribute key carrying the WMI account domain.
pub const DOMAIN: &str = "domain";

/// Credential attributes, ordered by key for deterministic output.
pub type AttributeMap = BTreeMap<String, String>;

/// The protocol class a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Snmp,
    Wmi,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Snmp => "SNMP",
            Protocol::Wmi => "WMI",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`CredentialStore::assign`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignError {
    /// The requested range is malformed. Raised before any mutation.
    #[error("invalid address range: {reason}")]
    InvalidRange {
        /// Human-readable description of what was wrong with the bounds.
        reason: String,
    },

    /// A reused definition carries a conflicting identity attribute.
    ///
    /// Definition matching guarantees identity attributes agree, so this
    /// indicates a caller bug; it is surfaced rather than recovered.
    #[error("definition attribute conflict on '{key}': have '{existing}', assigning '{incoming}'")]
    AttributeConflict {
        key: String,
        existing: String,
        incoming: String,
    },
}

/// One credential definition: an attribute set and the segments it owns.
#[derive(Debug, Clone)]
pub struct Definition {
    protocol: Protocol,
    attributes: AttributeMap,
    segments: Vec<Segment>,
}

impl Definition {
    fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            attributes: AttributeMap::new(),
            segments: Vec::new(),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Segments owned by this definition, ascending by lower bound.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total number of addresses covered by this definition.
    pub fn address_count(&self) -> u64 {
        self.segments.iter().map(Segment::address_count).sum()
    }

    /// A short human-readable identity label, e.g. for terminal output.
    pub fn label(&self) -> String {
        match self.protocol {
            Protocol::Snmp => {
                let community = self.attr(READ_COMMUNITY).unwrap_or("?");
                match self.attr(VERSION) {
                    Some(version) => format!("community '{community}' ({version})"),
                    None => format!("community '{community}'"),
                }
            }
            Protocol::Wmi => {
                let username = self.attr(USERNAME).unwrap_or("?");
                let domain = self.attr(DOMAIN).unwrap_or("?");
                format!("user '{domain}\\{username}'")
            }
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Identity-attribute match: decides whether an assignment with the
    /// given protocol and attributes reuses this definition.
    fn matches(&self, protocol: Protocol, attributes: &AttributeMap) -> bool {
        if self.protocol != protocol {
            return false;
        }
        let same = |key: &str| -> bool {
            match (self.attr(key), attributes.get(key)) {
                (Some(existing), Some(incoming)) => existing == incoming,
                _ => false,
            }
        };
        let both_absent =
            |key: &str| -> bool { self.attr(key).is_none() && !attributes.contains_key(key) };
        match protocol {
            Protocol::Snmp => same(READ_COMMUNITY) && (same(VERSION) || both_absent(VERSION)),
            Protocol::Wmi => same(USERNAME) && same(DOMAIN),
        }
    }

    /// Identity keys that must never change once a definition exists.
    fn identity_keys(protocol: Protocol) -> &'static [&'static str] {
        match protocol {
            Protocol::Snmp => &[READ_COMMUNITY, VERSION],
            Protocol::Wmi => &[USERNAME, DOMAIN],
        }
    }

    /// Guards against an identity attribute being rewritten to a new
    /// value through attribute application.
    fn check_identity(&self, attributes: &AttributeMap) -> Result<(), AssignError> {
        for key in Self::identity_keys(self.protocol) {
            if let (Some(existing), Some(incoming)) = (self.attr(key), attributes.get(*key)) {
                if existing != incoming {
                    return Err(AssignError::AttributeConflict {
                        key: (*key).to_string(),
                        existing: existing.to_string(),
                        incoming: incoming.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Inserts a segment keeping the list sorted, then renormalizes.
    fn insert_segment(&mut self, segment: Segment) {
        let pos = self
            .segments
            .binary_search(&segment)
            .unwrap_or_else(|pos| pos);
        self.segments.insert(pos, segment);
        self.coalesce();
    }

    /// Merges overlapping or directly adjacent segments.
    ///
    /// Segments of one definition share the same credentials, so touching
    /// coverage collapses into a single range and duplicates vanish.
    fn coalesce(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            if let Some(last) = merged.last_mut() {
                let touches = match last.end().next() {
                    Some(first_free) => segment.begin() <= first_free,
                    // The previous segment already ends at the top of the
                    // address space; anything sorted after it overlaps.
                    None => true,
                };
                if touches {
                    let begin: Addr = last.begin();
                    let end: Addr = last.end().max(segment.end());
                    *last = Segment::range(begin, end);
                    continue;
                }
            }
            merged.push(segment);
        }
        self.segments = merged;
    }

    /// Drops every segment matching `predicate`, returning the removed ones.
    fn remove_segments(&mut self, predicate: impl Fn(&Segment) -> bool) -> Vec<Segment> {
        let (removed, kept): (Vec<Segment>, Vec<Segment>) =
            self.segments.drain(..).partition(|seg| predicate(seg));
        self.segments = kept;
        removed
    }

    fn apply_attributes(&mut self, attributes: AttributeMap) {
        for (key, value) in attributes {
            self.attributes.insert(key, value);
        }
    }
}
