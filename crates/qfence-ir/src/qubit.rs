//! Site, pair and classical bit identifiers.
//!
//! A site is one physical execution unit on a device. Sites carry no
//! structure beyond their integer label, which need not be contiguous
//! (devices routinely expose sites such as `31` and `32` without `0..31`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IrError, IrResult};

/// Identifier of a physical site (qubit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl FromStr for QubitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(QubitId)
    }
}

/// Index into the output (readout) register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ro[{}]", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// An unordered pair of distinct sites.
///
/// Stored canonically with the smaller site first, so `(1, 0)` and `(0, 1)`
/// compare and hash equal. The canonical key is `"<lo>-<hi>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QubitPair {
    lo: QubitId,
    hi: QubitId,
}

impl QubitPair {
    /// Create a pair, rejecting a site paired with itself.
    pub fn new(a: impl Into<QubitId>, b: impl Into<QubitId>) -> IrResult<Self> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(IrError::InvalidPair(a));
        }
        Ok(if a < b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        })
    }

    /// The smaller site.
    pub fn lo(&self) -> QubitId {
        self.lo
    }

    /// The larger site.
    pub fn hi(&self) -> QubitId {
        self.hi
    }

    /// Both sites, smaller first.
    pub fn sites(&self) -> [QubitId; 2] {
        [self.lo, self.hi]
    }

    /// Check whether `site` is one of the two endpoints.
    pub fn contains(&self, site: QubitId) -> bool {
        self.lo == site || self.hi == site
    }

    /// Canonical catalog key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QubitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

impl FromStr for QubitPair {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IrError::InvalidPairKey(s.to_string());
        let (a, b) = s.split_once('-').ok_or_else(invalid)?;
        let a = a.parse::<QubitId>().map_err(|_| invalid())?;
        let b = b.parse::<QubitId>().map_err(|_| invalid())?;
        QubitPair::new(a, b)
    }
}

impl Serialize for QubitPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QubitPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}
