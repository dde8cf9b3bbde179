//! Output of the external analysis service.
//!
//! The platform never computes these values; it stores and displays what
//! the analysis service returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error returned when a compliance score is outside 0..=100.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("compliance score must be between 0 and 100 (got {0})")]
pub struct ScoreError(pub u32);

/// Compliance score, a percentage from 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ComplianceScore(u8);

impl ComplianceScore {
    /// Build a score.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if `value` exceeds 100.
    pub fn new(value: u32) -> Result<Self, ScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ScoreError(value))
    }

    /// Build a score, clamping anything above 100.
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for ComplianceScore {
    type Error = ScoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ComplianceScore> for u32 {
    fn from(score: ComplianceScore) -> Self {
        Self::from(score.0)
    }
}

/// Severity tag of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Warning,
    Info,
    Success,
}

/// One observation from the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: FindingSeverity,
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn new(severity: FindingSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Complete analysis output for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: ComplianceScore,
    /// Findings in the order the service reported them.
    pub findings: Vec<Finding>,
    /// Measurement key to already-formatted value (e.g. `"450.00 m²"`).
    pub measurements: BTreeMap<String, String>,
}

impl AnalysisResult {
    /// Number of findings with the given severity.
    #[must_use]
    pub fn count(&self, severity: FindingSeverity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert_eq!(ComplianceScore::new(0).unwrap().value(), 0);
        assert_eq!(ComplianceScore::new(100).unwrap().value(), 100);
        assert_eq!(ComplianceScore::new(101), Err(ScoreError(101)));
        assert_eq!(ComplianceScore::new(300), Err(ScoreError(300)));
        assert_eq!(ComplianceScore::saturating(250).value(), 100);
    }

    #[test]
    fn test_score_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<ComplianceScore>("87").is_ok());
        assert!(serde_json::from_str::<ComplianceScore>("120").is_err());
    }

    #[test]
    fn test_count_by_severity() {
        let result = AnalysisResult {
            score: ComplianceScore::new(87).unwrap(),
            findings: vec![
                Finding::new(FindingSeverity::Warning, "setback"),
                Finding::new(FindingSeverity::Info, "occupancy"),
                Finding::new(FindingSeverity::Warning, "height"),
            ],
            measurements: BTreeMap::new(),
        };
        assert_eq!(result.count(FindingSeverity::Warning), 2);
        assert_eq!(result.count(FindingSeverity::Success), 0);
    }
}
