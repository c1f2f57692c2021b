//! Caller roles carried in identity claims.

use serde::{Deserialize, Serialize};

/// Role of an authenticated caller.
///
/// Read from the `metadata.role` claim of the session token. Anything other
/// than `admin` is treated as an ordinary member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May open the `/admin` pages.
    Admin,
    #[default]
    Member,
}

impl Role {
    /// Map a raw claim value to a role. Unknown values become [`Role::Member`].
    #[must_use]
    pub fn from_claim(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Self::Admin,
            _ => Self::Member,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_admin_claim_grants_admin() {
        assert_eq!(Role::from_claim(Some("admin")), Role::Admin);
        assert_eq!(Role::from_claim(Some("Admin")), Role::Member);
        assert_eq!(Role::from_claim(Some("editor")), Role::Member);
        assert_eq!(Role::from_claim(None), Role::Member);
    }
}
