use crate::correlation::BandGroups;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the link the uploaded logs describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Reports of our own beacon heard by remote receivers; joined on `OPERATOR`.
    #[default]
    Transmission,
    /// Stations we heard ourselves; joined on `CALL`.
    Reception,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Transmission => "transmission",
            AnalysisMode::Reception => "reception",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transmission" | "tx" => Ok(AnalysisMode::Transmission),
            "reception" | "rx" => Ok(AnalysisMode::Reception),
            other => Err(AnalysisError::InvalidMode(other.to_string())),
        }
    }
}

/// Request-level failures. Everything below this level is recovered locally.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("At least 2 files required (got {found})")]
    InsufficientFiles { found: usize },
    #[error("Need at least 2 valid antenna files (got {found})")]
    InsufficientAntennas { found: usize },
    #[error("unknown analysis mode: {0}")]
    InvalidMode(String),
    #[error("{0}")]
    Internal(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// One reduction pass over the correlated groups.
///
/// Implementations return `None` when no antenna contributes anything,
/// never an empty summary.
pub trait Reduction {
    type Summary;

    fn reduce(&self, groups: &BandGroups<'_>) -> Option<Self::Summary>;
}
