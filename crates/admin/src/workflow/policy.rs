//! Submission policy.

use core::fmt;
use std::str::FromStr;

use thiserror::Error;

use urbanplan_core::DocumentCategory;

use super::session::UploadedDocument;

/// Document requirement checked when a workflow is submitted.
///
/// Only stored documents (uploaded or analyzed) count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPolicy {
    /// At least this many stored documents, any category.
    MinimumDocuments(usize),
    /// Every category holds as many stored documents as it has required items.
    AllRequiredCategories,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self::MinimumDocuments(2)
    }
}

impl SubmissionPolicy {
    /// Whether `documents` satisfy the policy.
    #[must_use]
    pub fn is_satisfied_by(&self, documents: &[UploadedDocument]) -> bool {
        match self {
            Self::MinimumDocuments(minimum) => stored(documents, None) >= *minimum,
            Self::AllRequiredCategories => self.missing(documents).is_empty(),
        }
    }

    /// Categories still short of their required count.
    ///
    /// Always empty for [`SubmissionPolicy::MinimumDocuments`].
    #[must_use]
    pub fn missing(&self, documents: &[UploadedDocument]) -> Vec<DocumentCategory> {
        match self {
            Self::MinimumDocuments(_) => Vec::new(),
            Self::AllRequiredCategories => DocumentCategory::ALL
                .into_iter()
                .filter(|category| stored(documents, Some(*category)) < category.required_count())
                .collect(),
        }
    }
}

fn stored(documents: &[UploadedDocument], category: Option<DocumentCategory>) -> usize {
    documents
        .iter()
        .filter(|doc| doc.status.is_stored())
        .filter(|doc| category.is_none_or(|c| doc.category == c))
        .count()
}

impl fmt::Display for SubmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinimumDocuments(n) => write!(f, "min:{n}"),
            Self::AllRequiredCategories => f.write_str("all-categories"),
        }
    }
}

/// Error parsing a submission policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid submission policy '{0}' (expected 'min:<n>' or 'all-categories')")]
pub struct PolicyParseError(pub String);

impl FromStr for SubmissionPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        if value == "all-categories" {
            return Ok(Self::AllRequiredCategories);
        }
        value
            .strip_prefix("min:")
            .and_then(|n| n.trim().parse::<usize>().ok())
            .map(Self::MinimumDocuments)
            .ok_or_else(|| PolicyParseError(s.to_string()))
    }
}
