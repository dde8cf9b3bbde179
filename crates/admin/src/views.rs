//! What each role sees on the dashboard.
//!
//! A pure mapping from role to a view descriptor; rendering is someone
//! else's job.

use serde::Serialize;

use urbanplan_core::Role;

use crate::navigation::Screen;

/// Which dashboard variant to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    /// Every municipality on the platform.
    MunicipalityOverview,
    /// The secretariat's analyst team.
    TeamOverview,
    /// The analyst's own queue and tasks.
    AnalystWorkbench,
}

/// Shortcut shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub screen: Screen,
    pub primary: bool,
}

impl QuickAction {
    const fn new(label: &'static str, screen: Screen) -> Self {
        Self {
            label,
            screen,
            primary: false,
        }
    }

    const fn primary(label: &'static str, screen: Screen) -> Self {
        Self {
            label,
            screen,
            primary: true,
        }
    }
}

/// View descriptor for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleView {
    pub role: Role,
    pub role_label: &'static str,
    pub dashboard: DashboardKind,
    pub heading: &'static str,
    pub quick_actions: Vec<QuickAction>,
}

impl RoleView {
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        let (dashboard, heading, quick_actions) = match role {
            Role::PlatformOperator => (
                DashboardKind::MunicipalityOverview,
                "Painel Master",
                vec![
                    QuickAction::primary("Prefeituras", Screen::Municipalities),
                    QuickAction::new("Relatórios", Screen::Reports),
                ],
            ),
            Role::Administrator => (
                DashboardKind::TeamOverview,
                "Dashboard do Secretário",
                vec![
                    QuickAction::primary("Analistas", Screen::Analysts),
                    QuickAction::new("Projetos", Screen::Projects),
                    QuickAction::new("Relatórios", Screen::Reports),
                ],
            ),
            Role::Analyst => (
                DashboardKind::AnalystWorkbench,
                "Resumo das suas atividades",
                vec![
                    QuickAction::primary("Nova Análise", Screen::NewAnalysis),
                    QuickAction::new("Agendar Tarefa", Screen::Calendar),
                    QuickAction::new("Histórico", Screen::Projects),
                    QuickAction::new("Pendências", Screen::Projects),
                ],
            ),
        };

        Self {
            role,
            role_label: role.label(),
            dashboard,
            heading,
            quick_actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationRegistry;

    #[test]
    fn test_dashboard_kind_per_role() {
        assert_eq!(
            RoleView::for_role(Role::PlatformOperator).dashboard,
            DashboardKind::MunicipalityOverview
        );
        assert_eq!(
            RoleView::for_role(Role::Administrator).dashboard,
            DashboardKind::TeamOverview
        );
        assert_eq!(
            RoleView::for_role(Role::Analyst).dashboard,
            DashboardKind::AnalystWorkbench
        );
        assert_eq!(RoleView::for_role(Role::Administrator).role_label, "Secretário");
    }

    #[test]
    fn test_analyst_has_new_analysis_as_primary_action() {
        let view = RoleView::for_role(Role::Analyst);
        let primary: Vec<_> = view.quick_actions.iter().filter(|a| a.primary).collect();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].screen, Screen::NewAnalysis);
    }

    #[test]
    fn test_quick_actions_only_point_at_accessible_screens() {
        let registry = NavigationRegistry::reference();
        for role in Role::ALL {
            for action in RoleView::for_role(role).quick_actions {
                assert!(
                    registry.permitted_roles(action.screen).contains(&role),
                    "{role} cannot open {}",
                    action.screen
                );
            }
        }
    }
}
