//! Status enums for tenants, users, activities, and prizes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! define_status {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
            utoipa::ToSchema,
        )]
        #[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The canonical wire name of the status.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", stringify!($name), ": {}"), other
                    )),
                }
            }
        }
    };
}

define_status!(
    /// Lifecycle status of a tenant.
    ///
    /// Tenants are never physically deleted; `Suspended` is the soft-disable
    /// state.
    TenantStatus {
        /// Tenant may authenticate and operate.
        Active => "ACTIVE",
        /// Tenant is blocked from logging in and issuing statements.
        Suspended => "SUSPENDED",
    }
);

define_status!(
    /// Lifecycle status of a user account.
    UserStatus {
        Active => "ACTIVE",
        Disabled => "DISABLED",
    }
);

define_status!(
    /// Lifecycle status of a lottery activity.
    ActivityStatus {
        Draft => "DRAFT",
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Archived => "ARCHIVED",
    }
);

define_status!(
    /// Draw progress of a prize.
    PrizeStatus {
        Pending => "PENDING",
        Drawing => "DRAWING",
        Completed => "COMPLETED",
    }
);

impl TenantStatus {
    /// Whether the tenant may authenticate and issue statements.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, TenantStatus::Active)
    }
}

impl UserStatus {
    /// Whether the account may log in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_status_roundtrip() {
        assert_eq!("ACTIVE".parse::<TenantStatus>().unwrap(), TenantStatus::Active);
        assert_eq!(
            "SUSPENDED".parse::<TenantStatus>().unwrap(),
            TenantStatus::Suspended
        );
        assert!("DELETED".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn test_activity_status_wire_names() {
        assert_eq!(ActivityStatus::Draft.as_str(), "DRAFT");
        assert_eq!(ActivityStatus::Archived.to_string(), "ARCHIVED");
    }

    #[test]
    fn test_is_active_helpers() {
        assert!(TenantStatus::Active.is_active());
        assert!(!TenantStatus::Suspended.is_active());
        assert!(UserStatus::Active.is_active());
        assert!(!UserStatus::Disabled.is_active());
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&PrizeStatus::Drawing).unwrap();
        assert_eq!(json, "\"DRAWING\"");
    }
}
