//! Port for the identity and role store.

use async_trait::async_trait;

use crate::domain::{IdentityUser, RoleName, UserDetailsUpdate, UserId};

use super::{UpdateOutcome, define_port_error};

define_port_error! {
    /// Errors raised by identity store adapters.
    pub enum IdentityStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "identity store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "identity store query failed: {message}",
        /// The role is not part of the catalogue.
        RoleNotFound { role: String } =>
            "role {role} does not exist",
        /// The user already holds the role.
        AlreadyInRole { role: String } =>
            "user is already in role {role}",
        /// The user does not hold the role.
        NotInRole { role: String } =>
            "user is not in role {role}",
    }
}

/// Identity collaborator used by role and profile requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look a user up by email, ignoring case.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityUser>, IdentityStoreError>;

    /// Look a user up by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityUser>, IdentityStoreError>;

    /// Grant `role` to the user.
    async fn add_to_role(&self, id: &UserId, role: &RoleName) -> Result<(), IdentityStoreError>;

    /// Revoke `role` from the user.
    async fn remove_from_role(
        &self,
        id: &UserId,
        role: &RoleName,
    ) -> Result<(), IdentityStoreError>;

    /// Overwrite the supplied profile fields.
    async fn update_details(
        &self,
        id: &UserId,
        details: &UserDetailsUpdate,
    ) -> Result<UpdateOutcome, IdentityStoreError>;
}
