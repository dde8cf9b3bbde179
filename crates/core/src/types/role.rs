//! Platform roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a role tag is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected platform_operator, administrator or analyst)")]
pub struct RoleParseError(pub String);

/// Coarse permission tag carried by every identity.
///
/// Roles are plain tags, not a hierarchy: a platform operator is not
/// implicitly an administrator. Screens list the exact roles they admit.
///
/// The legacy tags `master`, `admin` and `user` are accepted when reading
/// persisted state and CLI input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Runs the platform across municipalities.
    #[serde(alias = "master")]
    PlatformOperator,
    /// Municipal secretary managing a team of analysts.
    #[serde(alias = "admin")]
    Administrator,
    /// Reviews project submissions.
    #[serde(alias = "user")]
    Analyst,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 3] = [Self::PlatformOperator, Self::Administrator, Self::Analyst];

    /// Stable machine tag, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlatformOperator => "platform_operator",
            Self::Administrator => "administrator",
            Self::Analyst => "analyst",
        }
    }

    /// Human-facing label shown next to the user's name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlatformOperator => "Master",
            Self::Administrator => "Secretário",
            Self::Analyst => "Analista",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "platform_operator" | "master" => Ok(Self::PlatformOperator),
            "administrator" | "admin" => Ok(Self::Administrator),
            "analyst" | "user" => Ok(Self::Analyst),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde_tag() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_legacy_tags_deserialize() {
        let role: Role = serde_json::from_str("\"master\"").unwrap();
        assert_eq!(role, Role::PlatformOperator);
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Administrator);
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::Analyst);
    }

    #[test]
    fn test_from_str_accepts_dashes_and_case() {
        assert_eq!("Platform-Operator".parse::<Role>().unwrap(), Role::PlatformOperator);
        assert_eq!("ANALYST".parse::<Role>().unwrap(), Role::Analyst);
        assert!("viewer".parse::<Role>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Role::PlatformOperator.label(), "Master");
        assert_eq!(Role::Administrator.label(), "Secretário");
        assert_eq!(Role::Analyst.label(), "Analista");
    }
}
