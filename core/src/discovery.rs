//! # Discovery Plan
//!
//! Bookkeeping for the lists handed to the monitoring daemon's discovery
//! loop: individually monitored addresses plus included and excluded
//! ranges. Unlike the credential store, these lists are not a partition;
//! a new range only supersedes ranges of the same action it fully
//! covers, and partially overlapping ranges are left as authored.

use credmap_common::network::addr::Addr;
use thiserror::Error;
use tracing::debug;

/// Default probe retry count, matching the daemon's own default.
pub const DEFAULT_RETRIES: u32 = 1;
/// Default probe timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("invalid discovery range: end '{end}' is below begin '{begin}'")]
    InvalidRange { begin: Addr, end: Addr },
}

/// A single monitored address with probe tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoredAddress {
    pub addr: Addr,
    pub retries: u32,
    pub timeout_ms: u32,
}

/// An included or excluded address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub begin: Addr,
    pub end: Addr,
    pub retries: Option<u32>,
    pub timeout_ms: Option<u32>,
}

impl RangeEntry {
    fn covers(&self, other: &RangeEntry) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }
}

/// The discovery configuration under construction.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryPlan {
    addresses: Vec<MonitoredAddress>,
    includes: Vec<RangeEntry>,
    excludes: Vec<RangeEntry>,
}

impl DiscoveryPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[MonitoredAddress] {
        &self.addresses
    }

    pub fn includes(&self) -> &[RangeEntry] {
        &self.includes
    }

    pub fn excludes(&self) -> &[RangeEntry] {
        &self.excludes
    }

    /// Adds a monitored address; re-adding an address replaces its
    /// probe tuning in place.
    pub fn add_address(&mut self, addr: Addr, retries: Option<u32>, timeout_ms: Option<u32>) {
        let entry = MonitoredAddress {
            addr,
            retries: retries.unwrap_or(DEFAULT_RETRIES),
            timeout_ms: timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };
        match self.addresses.iter_mut().find(|old| old.addr == addr) {
            Some(old) => {
                debug!(%addr, "replacing monitored address entry");
                *old = entry;
            }
            None => self.addresses.push(entry),
        }
    }

    /// Includes a range in the discovery sweep.
    pub fn include(
        &mut self,
        begin: Addr,
        end: Addr,
        retries: Option<u32>,
        timeout_ms: Option<u32>,
    ) -> Result<(), DiscoveryError> {
        Self::manage(
            &mut self.includes,
            RangeEntry {
                begin,
                end,
                retries,
                timeout_ms,
            },
        )
    }

    /// Excludes a range from the discovery sweep.
    pub fn exclude(&mut self, begin: Addr, end: Addr) -> Result<(), DiscoveryError> {
        Self::manage(
            &mut self.excludes,
            RangeEntry {
                begin,
                end,
                retries: None,
                timeout_ms: None,
            },
        )
    }

    /// Appends `entry` to `list`: ranges the new entry fully covers are
    /// removed first, then the entry itself is discarded when a
    /// surviving range already covers it.
    fn manage(list: &mut Vec<RangeEntry>, entry: RangeEntry) -> Result<(), DiscoveryError> {
        if entry.end < entry.begin {
            return Err(DiscoveryError::InvalidRange {
                begin: entry.begin,
                end: entry.end,
            });
        }
        list.retain(|old| {
            let superseded = entry.covers(old);
            if superseded {
                debug!(begin = %old.begin, end = %old.end, "removing superseded range");
            }
            !superseded
        });
        if let Some(covering) = list.iter().find(|old| old.covers(&entry)) {
            debug!(
                begin = %entry.begin,
                end = %entry.end,
                covered_by_begin = %covering.begin,
                covered_by_end = %covering.end,
                "range already covered, skipped"
            );
            return Ok(());
        }
        list.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Addr {
        s.parse().unwrap()
    }

    fn spans(list: &[RangeEntry]) -> Vec<(String, String)> {
        list.iter()
            .map(|entry| (entry.begin.to_string(), entry.end.to_string()))
            .collect()
    }

    #[test]
    fn readding_an_address_replaces_its_tuning() {
        let mut plan = DiscoveryPlan::new();
        plan.add_address(addr("192.168.1.13"), None, None);
        plan.add_address(addr("192.168.1.37"), Some(3), None);
        plan.add_address(addr("192.168.1.13"), Some(5), Some(500));

        assert_eq!(plan.addresses().len(), 2);
        assert_eq!(plan.addresses()[0].retries, 5);
        assert_eq!(plan.addresses()[0].timeout_ms, 500);
        assert_eq!(plan.addresses()[1].retries, 3);
        assert_eq!(plan.addresses()[1].timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn broader_include_removes_ranges_it_covers() {
        let mut plan = DiscoveryPlan::new();
        plan.include(addr("192.168.0.10"), addr("192.168.0.20"), None, None)
            .unwrap();
        plan.include(addr("192.168.0.50"), addr("192.168.0.60"), None, None)
            .unwrap();
        plan.include(addr("192.168.0.1"), addr("192.168.0.254"), None, None)
            .unwrap();

        assert_eq!(
            spans(plan.includes()),
            vec![("192.168.0.1".to_string(), "192.168.0.254".to_string())]
        );
    }

    #[test]
    fn covered_include_is_discarded() {
        let mut plan = DiscoveryPlan::new();
        plan.include(addr("192.168.0.1"), addr("192.168.0.254"), None, None)
            .unwrap();
        plan.include(addr("192.168.0.10"), addr("192.168.0.20"), None, None)
            .unwrap();

        assert_eq!(plan.includes().len(), 1);
    }

    #[test]
    fn equal_reinclude_replaces_the_old_entry() {
        let mut plan = DiscoveryPlan::new();
        plan.include(addr("192.168.0.1"), addr("192.168.0.254"), Some(1), None)
            .unwrap();
        plan.include(addr("192.168.0.1"), addr("192.168.0.254"), Some(5), None)
            .unwrap();

        assert_eq!(plan.includes().len(), 1);
        assert_eq!(plan.includes()[0].retries, Some(5));
    }

    #[test]
    fn partial_overlaps_are_left_as_authored() {
        let mut plan = DiscoveryPlan::new();
        plan.include(addr("10.0.0.1"), addr("10.0.0.100"), None, None)
            .unwrap();
        plan.include(addr("10.0.0.50"), addr("10.0.0.150"), None, None)
            .unwrap();

        assert_eq!(
            spans(plan.includes()),
            vec![
                ("10.0.0.1".to_string(), "10.0.0.100".to_string()),
                ("10.0.0.50".to_string(), "10.0.0.150".to_string()),
            ]
        );
    }

    #[test]
    fn includes_and_excludes_do_not_interact() {
        let mut plan = DiscoveryPlan::new();
        plan.include(addr("10.0.0.1"), addr("10.0.0.100"), None, None)
            .unwrap();
        plan.exclude(addr("10.0.0.1"), addr("10.0.0.100")).unwrap();
        plan.exclude(addr("10.0.2.0"), addr("10.0.2.255")).unwrap();

        assert_eq!(plan.includes().len(), 1);
        assert_eq!(plan.excludes().len(), 2);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut plan = DiscoveryPlan::new();
        let err = plan
            .include(addr("10.0.0.100"), addr("10.0.0.1"), None, None)
            .unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::InvalidRange {
                begin: addr("10.0.0.100"),
                end: addr("10.0.0.1"),
            }
        );
        assert!(plan.includes().is_empty());
    }
}
