//! Authenticated identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, IdentityId, OrganizationId, Role};

/// The authenticated principal and its role.
///
/// An identity is immutable once issued: there are no setters. A login or
/// demo role switch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: IdentityId,
    email: Email,
    name: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization: Option<OrganizationId>,
    created_at: DateTime<Utc>,
}

impl Identity {
    /// Issue a new identity.
    #[must_use]
    pub fn issue(
        id: IdentityId,
        email: Email,
        name: impl Into<String>,
        role: Role,
        organization: Option<OrganizationId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name: name.into(),
            role,
            organization,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> IdentityId {
        self.id
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Municipality the identity works for. Platform operators have none.
    #[must_use]
    pub const fn organization(&self) -> Option<&OrganizationId> {
        self.organization.as_ref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// First character of the display name, uppercased, for avatars.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().and_then(|c| c.to_uppercase().next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn analyst() -> Identity {
        Identity::issue(
            IdentityId::new(3),
            Email::parse("analista@florianopolis.gov").unwrap(),
            "maria Santos",
            Role::Analyst,
            Some(OrganizationId::new("emp-1")),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(analyst()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["email"], "analista@florianopolis.gov");
        assert_eq!(json["role"], "analyst");
        assert_eq!(json["organization"], "emp-1");
    }

    #[test]
    fn test_organization_omitted_when_absent() {
        let operator = Identity::issue(
            IdentityId::new(1),
            Email::parse("master@urbanplan.gov").unwrap(),
            "Admin Master",
            Role::PlatformOperator,
            None,
            Utc::now(),
        );
        let json = serde_json::to_value(&operator).unwrap();
        assert!(json.get("organization").is_none());

        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, operator);
    }

    #[test]
    fn test_initial() {
        assert_eq!(analyst().initial(), Some('M'));
    }
}
