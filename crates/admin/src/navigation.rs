//! Screen registry and the access predicate.
//!
//! Routing is not owned here. Each screen declares which roles may open it,
//! and every route consults [`NavigationRegistry::authorize`] before doing
//! anything screen-specific.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use urbanplan_core::{Identity, Role};

/// A navigable screen of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Dashboard,
    Projects,
    NewAnalysis,
    Calendar,
    Analysts,
    Municipalities,
    Reports,
    Settings,
}

impl Screen {
    /// Every screen, in sidebar order.
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Projects,
        Self::NewAnalysis,
        Self::Calendar,
        Self::Analysts,
        Self::Municipalities,
        Self::Reports,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Projects => "projects",
            Self::NewAnalysis => "new_analysis",
            Self::Calendar => "calendar",
            Self::Analysts => "analysts",
            Self::Municipalities => "municipalities",
            Self::Reports => "reports",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == tag)
            .ok_or_else(|| format!("unknown screen: {s}"))
    }
}

/// A screen with its route and permitted roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenDescriptor {
    pub screen: Screen,
    pub path: &'static str,
    pub title: &'static str,
    pub roles: Vec<Role>,
}

impl ScreenDescriptor {
    #[must_use]
    pub fn new(screen: Screen, path: &'static str, title: &'static str, roles: &[Role]) -> Self {
        Self {
            screen,
            path,
            title,
            roles: roles.to_vec(),
        }
    }

    #[must_use]
    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Registry configuration problems.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// No role may open the screen.
    #[error("screen '{screen}' has no permitted roles and can never be opened")]
    Unreachable { screen: Screen },
}

/// Attempt to open a screen outside the caller's permitted set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("access to '{screen}' denied")]
pub struct UnauthorizedAccess {
    pub screen: Screen,
    /// `None` when nobody is signed in.
    pub role: Option<Role>,
}

/// Ordered set of screen descriptors.
#[derive(Debug, Clone)]
pub struct NavigationRegistry {
    screens: Vec<ScreenDescriptor>,
}

impl Default for NavigationRegistry {
    fn default() -> Self {
        Self::reference()
    }
}

impl NavigationRegistry {
    #[must_use]
    pub const fn new(screens: Vec<ScreenDescriptor>) -> Self {
        Self { screens }
    }

    /// The dashboard's sidebar.
    #[must_use]
    pub fn reference() -> Self {
        use Role::{Administrator, Analyst, PlatformOperator};

        Self::new(vec![
            ScreenDescriptor::new(
                Screen::Dashboard,
                "/dashboard",
                "Dashboard",
                &[PlatformOperator, Administrator, Analyst],
            ),
            ScreenDescriptor::new(Screen::Projects, "/projetos", "Projetos", &[Administrator, Analyst]),
            ScreenDescriptor::new(Screen::NewAnalysis, "/analise/nova", "Nova Análise", &[Analyst]),
            ScreenDescriptor::new(
                Screen::Calendar,
                "/calendario",
                "Calendário",
                &[Administrator, Analyst],
            ),
            ScreenDescriptor::new(Screen::Analysts, "/analistas", "Analistas", &[Administrator]),
            ScreenDescriptor::new(
                Screen::Municipalities,
                "/prefeituras",
                "Prefeituras",
                &[PlatformOperator],
            ),
            ScreenDescriptor::new(
                Screen::Reports,
                "/relatorios",
                "Relatórios",
                &[PlatformOperator, Administrator],
            ),
            ScreenDescriptor::new(
                Screen::Settings,
                "/configuracoes",
                "Configurações",
                &[PlatformOperator, Administrator, Analyst],
            ),
        ])
    }

    /// Report every screen no role can open.
    ///
    /// # Errors
    ///
    /// One `NavigationError::Unreachable` per offending screen.
    pub fn validate(&self) -> Result<(), Vec<NavigationError>> {
        let errors: Vec<_> = self
            .screens
            .iter()
            .filter(|descriptor| descriptor.roles.is_empty())
            .map(|descriptor| NavigationError::Unreachable {
                screen: descriptor.screen,
            })
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    #[must_use]
    pub fn descriptor(&self, screen: Screen) -> Option<&ScreenDescriptor> {
        self.screens.iter().find(|d| d.screen == screen)
    }

    /// Roles allowed on `screen`; empty for unregistered screens.
    #[must_use]
    pub fn permitted_roles(&self, screen: Screen) -> &[Role] {
        self.descriptor(screen).map_or(&[], |d| d.roles.as_slice())
    }

    /// Whether `identity` may open `screen`. Nobody signed in means no.
    #[must_use]
    pub fn can_access(&self, screen: Screen, identity: Option<&Identity>) -> bool {
        identity.is_some_and(|identity| self.permitted_roles(screen).contains(&identity.role()))
    }

    /// Screens shown in the sidebar for `role`.
    #[must_use]
    pub fn visible_screens(&self, role: Role) -> Vec<&ScreenDescriptor> {
        self.screens.iter().filter(|d| d.permits(role)).collect()
    }

    /// Screen owning a request path, matching the route or anything below it.
    #[must_use]
    pub fn screen_for_path(&self, path: &str) -> Option<Screen> {
        let path = path.trim_end_matches('/');
        self.screens
            .iter()
            .find(|d| {
                path == d.path
                    || path
                        .strip_prefix(d.path)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .map(|d| d.screen)
    }

    /// Like [`Self::can_access`], with the refusal as an error.
    ///
    /// # Errors
    ///
    /// `UnauthorizedAccess` when the identity may not open the screen.
    pub fn authorize(
        &self,
        screen: Screen,
        identity: Option<&Identity>,
    ) -> Result<(), UnauthorizedAccess> {
        if self.can_access(screen, identity) {
            Ok(())
        } else {
            Err(UnauthorizedAccess {
                screen,
                role: identity.map(Identity::role),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use urbanplan_core::{Email, IdentityId};

    use super::*;

    fn identity(role: Role) -> Identity {
        Identity::issue(
            IdentityId::new(9),
            Email::parse("someone@florianopolis.gov").unwrap(),
            "Someone",
            role,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_can_access_matches_permitted_roles() {
        let registry = NavigationRegistry::reference();
        for screen in Screen::ALL {
            assert!(!registry.can_access(screen, None), "{screen} open to anonymous");
            for role in Role::ALL {
                assert_eq!(
                    registry.can_access(screen, Some(&identity(role))),
                    registry.permitted_roles(screen).contains(&role),
                    "{screen} / {role}"
                );
            }
        }
    }

    #[test]
    fn test_reference_registry_is_valid() {
        assert!(NavigationRegistry::reference().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_unreachable_screen() {
        let registry = NavigationRegistry::new(vec![
            ScreenDescriptor::new(Screen::Dashboard, "/dashboard", "Dashboard", &[Role::Analyst]),
            ScreenDescriptor::new(Screen::Reports, "/relatorios", "Relatórios", &[]),
            ScreenDescriptor::new(Screen::Analysts, "/analistas", "Analistas", &[]),
        ]);
        assert_eq!(
            registry.validate().unwrap_err(),
            vec![
                NavigationError::Unreachable {
                    screen: Screen::Reports
                },
                NavigationError::Unreachable {
                    screen: Screen::Analysts
                },
            ]
        );
    }

    #[test]
    fn test_visible_screens_per_role() {
        let registry = NavigationRegistry::reference();
        let analyst: Vec<_> = registry
            .visible_screens(Role::Analyst)
            .iter()
            .map(|d| d.screen)
            .collect();
        assert_eq!(
            analyst,
            vec![
                Screen::Dashboard,
                Screen::Projects,
                Screen::NewAnalysis,
                Screen::Calendar,
                Screen::Settings
            ]
        );

        let operator: Vec<_> = registry
            .visible_screens(Role::PlatformOperator)
            .iter()
            .map(|d| d.screen)
            .collect();
        assert!(operator.contains(&Screen::Municipalities));
        assert!(!operator.contains(&Screen::Projects));
    }

    #[test]
    fn test_screen_for_path() {
        let registry = NavigationRegistry::reference();
        assert_eq!(registry.screen_for_path("/projetos"), Some(Screen::Projects));
        assert_eq!(registry.screen_for_path("/projetos/"), Some(Screen::Projects));
        assert_eq!(registry.screen_for_path("/projetos/42"), Some(Screen::Projects));
        assert_eq!(registry.screen_for_path("/analise/nova"), Some(Screen::NewAnalysis));
        assert_eq!(registry.screen_for_path("/projetosx"), None);
        assert_eq!(registry.screen_for_path("/"), None);
    }

    #[test]
    fn test_authorize_reports_role() {
        let registry = NavigationRegistry::reference();
        let err = registry
            .authorize(Screen::Municipalities, Some(&identity(Role::Analyst)))
            .unwrap_err();
        assert_eq!(err.role, Some(Role::Analyst));
        assert!(registry.authorize(Screen::Dashboard, None).is_err());
        assert!(
            registry
                .authorize(Screen::Analysts, Some(&identity(Role::Administrator)))
                .is_ok()
        );
    }

    #[test]
    fn test_screen_from_str() {
        assert_eq!("new-analysis".parse::<Screen>().unwrap(), Screen::NewAnalysis);
        assert!("admin".parse::<Screen>().is_err());
    }
}
