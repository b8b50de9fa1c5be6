//! # IPv4 Address Ordinal
//!
//! Wraps an IPv4 address as a 32-bit unsigned ordinal so that range
//! reasoning (containment, adjacency, splitting) reduces to integer
//! comparisons and checked arithmetic.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a dot-decimal address string cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddrParseError {
    /// The input is not exactly four dot-separated octets in 0-255.
    #[error("invalid IPv4 address '{input}'")]
    InvalidFormat { input: String },
}

/// An IPv4 address, ordered by numeric magnitude.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(u32);

impl Addr {
    /// Bottom of the address space (`0.0.0.0`).
    pub const MIN: Addr = Addr(0);
    /// Top of the address space (`255.255.255.255`).
    pub const MAX: Addr = Addr(u32::MAX);

    pub fn new(ordinal: u32) -> Self {
        Addr(ordinal)
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }

    /// The address one above, or `None` at the top of the address space.
    pub fn next(self) -> Option<Addr> {
        self.0.checked_add(1).map(Addr)
    }

    /// The address one below, or `None` at the bottom of the address space.
    pub fn prev(self) -> Option<Addr> {
        self.0.checked_sub(1).map(Addr)
    }

    /// Signed offset; `None` when the result leaves the address space.
    pub fn offset(self, n: i64) -> Option<Addr> {
        let shifted: i64 = i64::from(self.0).checked_add(n)?;
        u32::try_from(shifted).ok().map(Addr)
    }

    /// Absolute difference in addresses between `self` and `other`.
    pub fn distance(self, other: Addr) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(addr: Ipv4Addr) -> Self {
        Addr(u32::from(addr))
    }
}

impl From<Addr> for Ipv4Addr {
    fn from(addr: Addr) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl FromStr for Addr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>()
            .map(Addr::from)
            .map_err(|_| AddrParseError::InvalidFormat {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv4Addr::from(self.0))
    }
}

impl fmt::Debug for Addr {
    /// Dot-decimal in debug output too; the raw ordinal is unreadable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({})", Ipv4Addr::from(self.0))
    }
}
