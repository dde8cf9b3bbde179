//! Status enums for projects, tasks and municipalities.

use serde::{Deserialize, Serialize};

/// Review status of a project submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
    /// Returned to the applicant with outstanding issues.
    NeedsChanges,
}

impl ProjectStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InReview,
        Self::Approved,
        Self::Rejected,
        Self::NeedsChanges,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::InReview => "Em Análise",
            Self::Approved => "Aprovado",
            Self::Rejected => "Reprovado",
            Self::NeedsChanges => "Pendências",
        }
    }

    /// Whether an analyst still has work to do on the project.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InReview)
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pendente" => Ok(Self::Pending),
            "in_review" | "em_analise" => Ok(Self::InReview),
            "approved" | "aprovado" => Ok(Self::Approved),
            "rejected" | "reprovado" => Ok(Self::Rejected),
            "needs_changes" | "pendencias" => Ok(Self::NeedsChanges),
            _ => Err(format!("invalid project status: {s}")),
        }
    }
}

/// Land-use kind of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Residential,
    Commercial,
    Industrial,
    Mixed,
}

/// Progress of a calendar task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em Andamento",
            Self::Done => "Concluída",
        }
    }
}

/// Priority of a calendar task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
        }
    }
}

/// Onboarding status of a municipality on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MunicipalityStatus {
    Active,
    Inactive,
    Pending,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_from_legacy_tags() {
        assert_eq!("em_analise".parse::<ProjectStatus>().unwrap(), ProjectStatus::InReview);
        assert_eq!("pendencias".parse::<ProjectStatus>().unwrap(), ProjectStatus::NeedsChanges);
        assert!("archived".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_project_status_serde_matches_from_str() {
        for status in ProjectStatus::ALL {
            let tag = serde_json::to_value(status).unwrap();
            let parsed: ProjectStatus = tag.as_str().unwrap().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_open_statuses() {
        assert!(ProjectStatus::Pending.is_open());
        assert!(ProjectStatus::InReview.is_open());
        assert!(!ProjectStatus::Approved.is_open());
        assert!(!ProjectStatus::NeedsChanges.is_open());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }
}
