//! Strongly Typed Identifiers
//!
//! Type-safe identifier types for tombola. Using the newtype pattern, these
//! types prevent accidental misuse of different ID kinds at compile time.
//!
//! Identifiers are opaque strings rather than raw UUIDs: the tenant registry
//! keys tenants by dashless UUID text, and schema names are derived from the
//! identifier text, so the string form is the canonical one.
//!
//! # Example
//!
//! ```
//! use tombola_core::{TenantId, UserId};
//!
//! let tenant = TenantId::generate();
//! let user = UserId::generate();
//!
//! // Type safety: cannot pass UserId where TenantId is expected
//! fn requires_tenant(id: &TenantId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_tenant(&tenant);
//! // requires_tenant(&user); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Maximum accepted length for an identifier's textual form.
const MAX_ID_LEN: usize = 64;

/// Error type for ID parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// What was wrong with the input
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type backed by an opaque string.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a new random ID (dashless UUID v4 text).
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Wraps an existing identifier value after validating it.
            ///
            /// # Errors
            ///
            /// Returns `ParseIdError` if the value is empty, longer than 64
            /// characters, or contains whitespace/control characters.
            pub fn new(value: impl Into<String>) -> Result<Self, ParseIdError> {
                let value = value.into();
                validate_id(stringify!($name), &value)?;
                Ok(Self(value))
            }

            /// Returns the identifier's textual form.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

fn validate_id(id_type: &'static str, value: &str) -> Result<(), ParseIdError> {
    if value.is_empty() {
        return Err(ParseIdError {
            id_type,
            message: "identifier must not be empty".to_string(),
        });
    }
    if value.len() > MAX_ID_LEN {
        return Err(ParseIdError {
            id_type,
            message: format!("identifier exceeds {MAX_ID_LEN} characters"),
        });
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ParseIdError {
            id_type,
            message: "identifier must not contain whitespace or control characters".to_string(),
        });
    }
    Ok(())
}

define_id!(
    /// Strongly typed identifier for tenants.
    ///
    /// Identifies an isolated customer organization whose data lives in its
    /// own database schema.
    ///
    /// # Example
    ///
    /// ```
    /// use tombola_core::TenantId;
    ///
    /// let generated = TenantId::generate();
    /// let parsed: TenantId = "t1".parse().unwrap();
    /// assert_eq!(parsed.as_str(), "t1");
    /// ```
    TenantId
);

define_id!(
    /// Strongly typed identifier for users within a tenant.
    UserId
);

define_id!(
    /// Strongly typed identifier for lottery activities.
    ActivityId
);

define_id!(
    /// Strongly typed identifier for prizes.
    PrizeId
);

define_id!(
    /// Strongly typed identifier for participants.
    ParticipantId
);

define_id!(
    /// Strongly typed identifier for winner records.
    RecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod tenant_id_tests {
        use super::*;

        #[test]
        fn test_generate_creates_dashless_uuid() {
            let id = TenantId::generate();
            assert_eq!(id.as_str().len(), 32);
            assert!(!id.as_str().contains('-'));
        }

        #[test]
        fn test_generated_ids_are_unique() {
            let id1 = TenantId::generate();
            let id2 = TenantId::generate();
            assert_ne!(id1, id2);
        }

        #[test]
        fn test_new_preserves_value() {
            let id = TenantId::new("t1").unwrap();
            assert_eq!(id.as_str(), "t1");
            assert_eq!(id.to_string(), "t1");
        }

        #[test]
        fn test_accepts_hyphenated_uuid_text() {
            let id = TenantId::new("550e8400-e29b-41d4-a716-446655440000").unwrap();
            assert_eq!(id.as_str().len(), 36);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_empty_rejected() {
            let result: Result<UserId, _> = "".parse();
            let err = result.unwrap_err();
            assert_eq!(err.id_type, "UserId");
            assert!(err.message.contains("empty"));
        }

        #[test]
        fn test_whitespace_rejected() {
            let result: Result<TenantId, _> = "ten ant".parse();
            assert!(result.is_err());
        }

        #[test]
        fn test_overlong_rejected() {
            let long = "a".repeat(65);
            let result = ActivityId::new(long);
            assert!(result.is_err());
        }

        #[test]
        fn test_error_display_names_type() {
            let result: Result<PrizeId, _> = "".parse();
            let display = result.unwrap_err().to_string();
            assert!(display.contains("PrizeId"));
            assert!(display.contains("Failed to parse"));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_serializes_as_plain_string() {
            let id = TenantId::new("t1").unwrap();
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"t1\"");
        }

        #[test]
        fn test_roundtrip() {
            let original = UserId::generate();
            let json = serde_json::to_string(&original).unwrap();
            let back: UserId = serde_json::from_str(&json).unwrap();
            assert_eq!(original, back);
        }
    }

    mod hash_eq_tests {
        use super::*;
        use std::collections::HashMap;

        #[test]
        fn test_usable_as_map_key() {
            let mut map: HashMap<TenantId, String> = HashMap::new();
            let id1 = TenantId::new("t1").unwrap();
            let id2 = TenantId::new("t2").unwrap();

            map.insert(id1.clone(), "tenant one".to_string());
            map.insert(id2.clone(), "tenant two".to_string());

            assert_eq!(map.get(&id1), Some(&"tenant one".to_string()));
            assert_eq!(map.get(&id2), Some(&"tenant two".to_string()));
        }

        #[test]
        fn test_same_value_is_equal() {
            let id1 = TenantId::new("t1").unwrap();
            let id2 = TenantId::new("t1").unwrap();
            assert_eq!(id1, id2);
        }
    }
}
