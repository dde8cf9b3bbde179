//! Read-only demo catalog: projects, calendar tasks, analyst team and
//! municipalities.
//!
//! The catalog is seeded once at startup with dates relative to the
//! supplied instant and never mutated afterwards, so it is shared without
//! locking.

pub mod calendar;
pub mod dashboard;
pub mod projects;
pub mod seed;

use chrono::{DateTime, Utc};

use urbanplan_core::{Identity, Role};

pub use calendar::{CalendarDay, CalendarError, MonthGrid, YearMonth, tasks_on};
pub use dashboard::DashboardSummary;
pub use projects::{ProjectQuery, StatusCount, StatusCounts};

use crate::models::{AnalystPerformance, Municipality, Project, Task};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    analysts: Vec<AnalystPerformance>,
    municipalities: Vec<Municipality>,
}

impl Catalog {
    #[must_use]
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            projects: seed::projects(now),
            tasks: seed::tasks(now),
            analysts: seed::analysts(),
            municipalities: seed::municipalities(),
        }
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn analysts(&self) -> &[AnalystPerformance] {
        &self.analysts
    }

    #[must_use]
    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    /// Projects of the identity's municipality. Platform operators see all.
    #[must_use]
    pub fn projects_for(&self, identity: &Identity) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|p| {
                identity
                    .organization()
                    .is_none_or(|organization| *organization == p.organization)
            })
            .cloned()
            .collect()
    }

    /// Calendar tasks `identity` sees: analysts their own, everyone else all.
    #[must_use]
    pub fn tasks_for(&self, identity: &Identity) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| identity.role() != Role::Analyst || t.owner == identity.id())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use urbanplan_core::{Email, IdentityId, OrganizationId};

    use super::*;
    use crate::services::auth::demo_identity;

    #[test]
    fn test_projects_scoped_to_organization() {
        let now = Utc::now();
        let catalog = Catalog::seed(now);

        let analyst = demo_identity(Role::Analyst, now).unwrap();
        assert_eq!(catalog.projects_for(&analyst).len(), 6);

        let elsewhere = Identity::issue(
            IdentityId::new(40),
            Email::parse("analista@joinville.gov").unwrap(),
            "Carla Souza",
            Role::Analyst,
            Some(OrganizationId::new("emp-2")),
            now,
        );
        assert!(catalog.projects_for(&elsewhere).is_empty());
        assert!(catalog.tasks_for(&elsewhere).is_empty());
    }

    #[test]
    fn test_administrator_sees_team_tasks() {
        let now = Utc::now();
        let catalog = Catalog::seed(now);
        let admin = demo_identity(Role::Administrator, now).unwrap();
        assert_eq!(catalog.tasks_for(&admin).len(), 4);
    }
}
