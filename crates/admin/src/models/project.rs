//! Catalog records: projects, tasks, municipalities and analyst stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use urbanplan_core::{
    IdentityId, MunicipalityId, MunicipalityStatus, OrganizationId, ProjectId, ProjectKind,
    ProjectStatus, TaskId, TaskPriority, TaskStatus,
};

/// A permit application under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub organization: OrganizationId,
    pub protocol: String,
    pub kind: ProjectKind,
    pub address: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst: Option<IdentityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dated to-do item on an analyst's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner: IdentityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    pub due: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
}

/// A municipality using the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: MunicipalityId,
    pub name: String,
    pub state: String,
    pub analysts: u32,
    pub projects: u32,
    pub status: MunicipalityStatus,
}

/// Monthly numbers of one analyst, as shown to their administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystPerformance {
    pub id: IdentityId,
    pub name: String,
    pub projects: u32,
    pub approved: u32,
    pub rejected: u32,
    pub needs_changes: u32,
    /// Average review time in days.
    pub average_days: f64,
}

impl AnalystPerformance {
    /// Approved share of reviewed projects, rounded to a whole percent.
    #[must_use]
    pub fn approval_rate(&self) -> u32 {
        if self.projects == 0 {
            return 0;
        }
        (f64::from(self.approved) * 100.0 / f64::from(self.projects)).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_rate() {
        let analyst = AnalystPerformance {
            id: IdentityId::new(1),
            name: "Maria Santos".to_string(),
            projects: 15,
            approved: 12,
            rejected: 2,
            needs_changes: 1,
            average_days: 2.1,
        };
        assert_eq!(analyst.approval_rate(), 80);

        let idle = AnalystPerformance {
            projects: 0,
            approved: 0,
            ..analyst
        };
        assert_eq!(idle.approval_rate(), 0);
    }
}
