//! User identity as seen by the restaurant domain.
//!
//! Credentials and token issuance live elsewhere. The domain only reads the
//! caller's id, email and roles, and mutates role membership and a couple of
//! profile fields.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Well-known role names seeded with the identity schema.
pub mod roles {
    /// Administrators manage role membership.
    pub const ADMIN: &str = "Admin";
    /// Restaurant owners.
    pub const OWNER: &str = "Owner";
    /// Regular signed-in users.
    pub const USER: &str = "User";
}

/// Role name as stored by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Wrap a role name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The administrative role.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(roles::ADMIN)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated caller for the current request.
///
/// Built once per request from the transport principal and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub roles: BTreeSet<RoleName>,
}

impl CurrentUser {
    /// Construct a caller from its claims.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = RoleName>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether the caller holds `role`.
    #[must_use]
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held.as_ref() == role)
    }
}

/// User record held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub id: UserId,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub roles: BTreeSet<RoleName>,
}

/// Sparse profile update applied to the calling user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetailsUpdate {
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
}

impl UserDetailsUpdate {
    /// Apply supplied fields to a stored record.
    pub fn apply_to(&self, user: &mut IdentityUser) {
        if let Some(birth_date) = self.birth_date {
            user.birth_date = Some(birth_date);
        }
        if let Some(nationality) = &self.nationality {
            user.nationality = Some(nationality.clone());
        }
    }
}
