//! Role-specific dashboard summaries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use urbanplan_core::{Identity, MunicipalityStatus, ProjectStatus, Role, TaskStatus};

use super::Catalog;
use crate::models::{AnalystPerformance, Municipality, Project, Task};

/// Upcoming tasks shown on the analyst workbench.
pub const UPCOMING_TASK_LIMIT: usize = 5;

/// Data behind one dashboard variant. Tagged with the same names as
/// [`crate::views::DashboardKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardSummary {
    MunicipalityOverview {
        municipalities: Vec<Municipality>,
        active: usize,
        total_projects: u32,
        total_analysts: u32,
    },
    TeamOverview {
        analysts: Vec<AnalystPerformance>,
        total_projects: u32,
        total_approved: u32,
        /// Whole percent across the team.
        approval_rate: u32,
    },
    AnalystWorkbench {
        open_projects: Vec<Project>,
        pending: usize,
        in_review: usize,
        upcoming_tasks: Vec<Task>,
    },
}

impl DashboardSummary {
    /// Build the summary `identity` sees at `now`.
    #[must_use]
    pub fn for_identity(catalog: &Catalog, identity: &Identity, now: DateTime<Utc>) -> Self {
        match identity.role() {
            Role::PlatformOperator => Self::municipality_overview(catalog.municipalities()),
            Role::Administrator => Self::team_overview(catalog.analysts()),
            Role::Analyst => Self::analyst_workbench(catalog, identity, now),
        }
    }

    fn municipality_overview(municipalities: &[Municipality]) -> Self {
        Self::MunicipalityOverview {
            active: municipalities
                .iter()
                .filter(|m| m.status == MunicipalityStatus::Active)
                .count(),
            total_projects: municipalities.iter().map(|m| m.projects).sum(),
            total_analysts: municipalities.iter().map(|m| m.analysts).sum(),
            municipalities: municipalities.to_vec(),
        }
    }

    fn team_overview(analysts: &[AnalystPerformance]) -> Self {
        let total_projects: u32 = analysts.iter().map(|a| a.projects).sum();
        let total_approved: u32 = analysts.iter().map(|a| a.approved).sum();
        let approval_rate = if total_projects == 0 {
            0
        } else {
            total_approved * 100 / total_projects
        };

        Self::TeamOverview {
            analysts: analysts.to_vec(),
            total_projects,
            total_approved,
            approval_rate,
        }
    }

    fn analyst_workbench(catalog: &Catalog, identity: &Identity, now: DateTime<Utc>) -> Self {
        let open_projects: Vec<Project> = catalog
            .projects()
            .iter()
            .filter(|p| p.status.is_open())
            .filter(|p| identity.organization() == Some(&p.organization))
            .cloned()
            .collect();

        let today = now.date_naive();
        let mut upcoming_tasks: Vec<Task> = catalog
            .tasks()
            .iter()
            .filter(|t| t.owner == identity.id())
            .filter(|t| t.status != TaskStatus::Done)
            .filter(|t| t.due.date_naive() >= today)
            .cloned()
            .collect();
        upcoming_tasks.sort_by(|a, b| a.due.cmp(&b.due).then(b.priority.cmp(&a.priority)));
        upcoming_tasks.truncate(UPCOMING_TASK_LIMIT);

        Self::AnalystWorkbench {
            pending: count(&open_projects, ProjectStatus::Pending),
            in_review: count(&open_projects, ProjectStatus::InReview),
            open_projects,
            upcoming_tasks,
        }
    }
}

fn count(projects: &[Project], status: ProjectStatus) -> usize {
    projects.iter().filter(|p| p.status == status).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::services::auth::demo_identity;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_analyst_sees_open_projects_and_tasks() {
        let catalog = Catalog::seed(now());
        let analyst = demo_identity(Role::Analyst, now()).unwrap();

        let DashboardSummary::AnalystWorkbench {
            open_projects,
            pending,
            in_review,
            upcoming_tasks,
        } = DashboardSummary::for_identity(&catalog, &analyst, now())
        else {
            panic!("expected analyst workbench");
        };

        assert_eq!(open_projects.len(), 2);
        assert_eq!(pending, 1);
        assert_eq!(in_review, 1);
        assert_eq!(upcoming_tasks.len(), 4);
        assert_eq!(upcoming_tasks[0].title, "Revisar projeto #2024-00145");
    }

    #[test]
    fn test_past_tasks_drop_off_the_workbench() {
        let catalog = Catalog::seed(now());
        let analyst = demo_identity(Role::Analyst, now()).unwrap();
        let later = now() + Duration::days(2);

        let DashboardSummary::AnalystWorkbench { upcoming_tasks, .. } =
            DashboardSummary::for_identity(&catalog, &analyst, later)
        else {
            panic!("expected analyst workbench");
        };
        assert_eq!(upcoming_tasks.len(), 2);
    }

    #[test]
    fn test_administrator_sees_team() {
        let catalog = Catalog::seed(now());
        let admin = demo_identity(Role::Administrator, now()).unwrap();

        let DashboardSummary::TeamOverview {
            analysts,
            total_projects,
            total_approved,
            approval_rate,
        } = DashboardSummary::for_identity(&catalog, &admin, now())
        else {
            panic!("expected team overview");
        };
        assert_eq!(analysts.len(), 4);
        assert_eq!(total_projects, 55);
        assert_eq!(total_approved, 45);
        assert_eq!(approval_rate, 81);
    }

    #[test]
    fn test_operator_sees_municipalities() {
        let catalog = Catalog::seed(now());
        let operator = demo_identity(Role::PlatformOperator, now()).unwrap();

        let summary = DashboardSummary::for_identity(&catalog, &operator, now());
        let DashboardSummary::MunicipalityOverview {
            municipalities,
            active,
            total_projects,
            total_analysts,
        } = &summary
        else {
            panic!("expected municipality overview");
        };
        assert_eq!(municipalities.len(), 5);
        assert_eq!(*active, 3);
        assert_eq!(*total_projects, 524);
        assert_eq!(*total_analysts, 14);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kind"], "municipality_overview");
    }
}
