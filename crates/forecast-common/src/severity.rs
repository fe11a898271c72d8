//! Warning severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered warning severity, lowest to highest.
///
/// Persisted by integer rank so database ordering matches the enum order;
/// provider feeds that report free-text severities are parsed
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    /// Storage rank, ascending with severity.
    pub fn rank(&self) -> i16 {
        match self {
            Severity::Minor => 0,
            Severity::Moderate => 1,
            Severity::Severe => 2,
            Severity::Extreme => 3,
        }
    }

    pub fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            0 => Some(Severity::Minor),
            1 => Some(Severity::Moderate),
            2 => Some(Severity::Severe),
            3 => Some(Severity::Extreme),
            _ => None,
        }
    }

    /// Display color for threat panels.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Minor => "green",
            Severity::Moderate => "yellow",
            Severity::Severe => "orange",
            Severity::Extreme => "red",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown severity: {0}")]
pub struct SeverityParseError(String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    /// Accepts the canonical labels plus the aliases seen in provider feeds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minor" | "low" => Ok(Severity::Minor),
            "moderate" => Ok(Severity::Moderate),
            "severe" | "high" => Ok(Severity::Severe),
            "extreme" => Ok(Severity::Extreme),
            other => Err(SeverityParseError(other.to_string())),
        }
    }
}
