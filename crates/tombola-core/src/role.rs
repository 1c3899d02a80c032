//! User roles and the role hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Role assigned to a user within a tenant.
///
/// Roles use their SCREAMING_SNAKE_CASE names on the wire and in the
/// database. `SuperAdmin` implies `Admin` for authorization checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform-level administrator.
    SuperAdmin,
    /// Tenant administrator.
    Admin,
    /// Can run draws and manage activity data.
    Operator,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Checks whether this role satisfies `required`, honoring the
    /// `SuperAdmin` → `Admin` implication.
    #[must_use]
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required || (required == Role::Admin && *self == Role::SuperAdmin)
    }

    /// The canonical wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Operator => "OPERATOR",
            Role::Viewer => "VIEWER",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "OPERATOR" => Ok(Role::Operator),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_str() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Operator, Role::Viewer] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_super_admin_satisfies_admin() {
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(!Role::Operator.satisfies(Role::Admin));
        assert!(!Role::Viewer.satisfies(Role::Admin));
    }

    #[test]
    fn test_exact_match_for_other_roles() {
        assert!(Role::Operator.satisfies(Role::Operator));
        assert!(!Role::SuperAdmin.satisfies(Role::Operator));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("MANAGER".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }
}
