//! Heading levels and classifier output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A heading depth, 1 being the top level. Serialized as `"H1"`, `"H2"`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const TOP: HeadingLevel = HeadingLevel(1);

    /// Create a level, returning `None` for 0.
    pub fn new(depth: u8) -> Option<Self> {
        (depth >= 1).then_some(Self(depth))
    }

    /// Create a level, raising 0 to 1.
    pub fn saturating(depth: u8) -> Self {
        Self(depth.max(1))
    }

    pub fn depth(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl FromStr for HeadingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('H')
            .ok_or_else(|| format!("heading level must start with 'H': {s:?}"))?;
        let depth: u8 = digits
            .parse()
            .map_err(|_| format!("invalid heading depth: {s:?}"))?;
        HeadingLevel::new(depth).ok_or_else(|| format!("heading depth must be >= 1: {s:?}"))
    }
}

impl Serialize for HeadingLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HeadingLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A text run provisionally identified as a section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Provisional level before outline repair.
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
    /// `order_index` of the first fragment of the run.
    pub order_index: usize,
    /// `order_index` of the last fragment of the run.
    pub last_order_index: usize,
    /// Internal score used to break ties; never persisted.
    pub confidence: f32,
}
