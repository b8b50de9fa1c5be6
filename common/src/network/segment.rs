//! # Address Segment Model
//!
//! A segment is the unit of address coverage in a credential definition:
//! either one specific address or a closed range `[begin, end]`.
//!
//! Segments are built through the constructors so that a range collapsing
//! to a single address is always represented as `Specific`; a `Range`
//! with `begin == end` never enters a store.

use std::cmp::Ordering;
use std::fmt;

use crate::network::addr::Addr;

/// A contiguous span of IPv4 addresses owned by one credential definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A single address.
    Specific(Addr),
    /// A closed interval `[begin, end]` with `begin < end`.
    Range { begin: Addr, end: Addr },
}

impl Segment {
    pub fn specific(addr: Addr) -> Self {
        Segment::Specific(addr)
    }

    /// Builds a range segment, normalizing `begin == end` to `Specific`.
    ///
    /// Callers validate `begin <= end` before construction.
    pub fn range(begin: Addr, end: Addr) -> Self {
        debug_assert!(begin <= end, "range built with end below begin");
        if begin == end {
            Segment::Specific(begin)
        } else {
            Segment::Range { begin, end }
        }
    }

    pub fn begin(&self) -> Addr {
        match *self {
            Segment::Specific(addr) => addr,
            Segment::Range { begin, .. } => begin,
        }
    }

    pub fn end(&self) -> Addr {
        match *self {
            Segment::Specific(addr) => addr,
            Segment::Range { end, .. } => end,
        }
    }

    pub fn contains(&self, addr: Addr) -> bool {
        self.begin() <= addr && addr <= self.end()
    }

    /// True when this segment shares at least one address with `[begin, end]`.
    pub fn intersects(&self, begin: Addr, end: Addr) -> bool {
        self.begin() <= end && begin <= self.end()
    }

    /// Number of addresses covered by this segment.
    pub fn address_count(&self) -> u64 {
        u64::from(self.begin().distance(self.end())) + 1
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    /// Orders by lower bound, then by upper bound.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.begin(), self.end()).cmp(&(other.begin(), other.end()))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Specific(addr) => write!(f, "{addr}"),
            Segment::Range { begin, end } => write!(f, "{begin}-{end}"),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
