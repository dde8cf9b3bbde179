//! Project search and status counts.

use serde::Serialize;

use urbanplan_core::ProjectStatus;

use crate::models::Project;

/// Filter for the project list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    /// Protocol substring, or case-insensitive address substring.
    pub search: Option<String>,
    /// `None` lists every status.
    pub status: Option<ProjectStatus>,
}

impl ProjectQuery {
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                project.protocol.contains(needle)
                    || project
                        .address
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
        };
        let matches_status = self.status.is_none_or(|status| project.status == status);
        matches_search && matches_status
    }

    /// Matching projects, in catalog order.
    #[must_use]
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Number of projects in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub label: &'static str,
    pub count: usize,
}

/// Counts for the status filter bar. Ignores the search text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub by_status: Vec<StatusCount>,
}

impl StatusCounts {
    #[must_use]
    pub fn of(projects: &[Project]) -> Self {
        let by_status = ProjectStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                label: status.label(),
                count: projects.iter().filter(|p| p.status == status).count(),
            })
            .collect();

        Self {
            all: projects.len(),
            by_status,
        }
    }

    #[must_use]
    pub fn count(&self, status: ProjectStatus) -> usize {
        self.by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalog::seed;

    fn projects() -> Vec<Project> {
        seed::projects(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_query_lists_everything() {
        let projects = projects();
        assert_eq!(ProjectQuery::default().apply(&projects).len(), projects.len());
    }

    #[test]
    fn test_search_by_protocol_and_address() {
        let projects = projects();
        let query = ProjectQuery {
            search: Some("00143".to_string()),
            status: None,
        };
        let found = query.apply(&projects);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].protocol, "2024-00143");

        let query = ProjectQuery {
            search: Some("BEIRA MAR".to_string()),
            status: None,
        };
        assert_eq!(query.apply(&projects)[0].protocol, "2024-00144");
    }

    #[test]
    fn test_filter_by_status_combines_with_search() {
        let projects = projects();
        let query = ProjectQuery {
            search: None,
            status: Some(ProjectStatus::Approved),
        };
        assert_eq!(query.apply(&projects).len(), 2);

        let query = ProjectQuery {
            search: Some("Rio Branco".to_string()),
            status: Some(ProjectStatus::Rejected),
        };
        assert!(query.apply(&projects).is_empty());
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts::of(&projects());
        assert_eq!(counts.all, 6);
        assert_eq!(counts.count(ProjectStatus::Approved), 2);
        assert_eq!(counts.count(ProjectStatus::Pending), 1);
        assert_eq!(counts.by_status.iter().map(|c| c.count).sum::<usize>(), 6);
    }
}
