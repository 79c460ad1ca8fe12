//! Identity use cases: role administration and the caller's own profile.
//!
//! Role routes are admin-gated by the inbound adapter before dispatch, so the
//! handlers here only resolve the target user by email. Profile updates act
//! on whoever [`UserContext`] reports as the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use super::dispatch::{DispatcherBuilder, Request, RequestContext, RequestHandler};
use super::ports::{IdentityStore, IdentityStoreError, UpdateOutcome};
use super::validation::{ValidationErrors, Validator, rules};
use super::{Error, IdentityUser, RoleName, UserContext, UserDetailsUpdate};

const NATIONALITY_MIN: usize = 2;
const NATIONALITY_MAX: usize = 50;

/// Grant a role to the user registered under `user_email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRole {
    pub user_email: String,
    pub role_name: String,
}

impl Request for AssignRole {
    type Response = ();
    const NAME: &'static str = "AssignRole";
}

/// Revoke a role from the user registered under `user_email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnassignRole {
    pub user_email: String,
    pub role_name: String,
}

impl Request for UnassignRole {
    type Response = ();
    const NAME: &'static str = "UnassignRole";
}

/// Update the calling user's profile. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCurrentUserDetails {
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
}

impl Request for UpdateCurrentUserDetails {
    type Response = ();
    const NAME: &'static str = "UpdateCurrentUserDetails";
}

fn validate_role_target(user_email: &str, role_name: &str, errors: &mut ValidationErrors) {
    rules::check(
        errors,
        "userEmail",
        [rules::not_empty(user_email), rules::email(user_email)],
    );
    rules::check(errors, "roleName", [rules::not_empty(role_name)]);
}

/// Field rules for [`AssignRole`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AssignRoleValidator;

impl Validator<AssignRole> for AssignRoleValidator {
    fn validate(&self, request: &AssignRole, errors: &mut ValidationErrors) {
        validate_role_target(&request.user_email, &request.role_name, errors);
    }
}

/// Field rules for [`UnassignRole`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnassignRoleValidator;

impl Validator<UnassignRole> for UnassignRoleValidator {
    fn validate(&self, request: &UnassignRole, errors: &mut ValidationErrors) {
        validate_role_target(&request.user_email, &request.role_name, errors);
    }
}

/// Field rules for [`UpdateCurrentUserDetails`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateCurrentUserDetailsValidator;

impl Validator<UpdateCurrentUserDetails> for UpdateCurrentUserDetailsValidator {
    fn validate(&self, request: &UpdateCurrentUserDetails, errors: &mut ValidationErrors) {
        if let Some(nationality) = &request.nationality {
            rules::check(
                errors,
                "nationality",
                [rules::length(nationality, NATIONALITY_MIN, NATIONALITY_MAX)],
            );
        }
    }
}

fn map_identity_error(error: IdentityStoreError) -> Error {
    match error {
        IdentityStoreError::Connection { message } => {
            warn!(%message, "identity store unavailable");
            Error::service_unavailable("identity store unavailable")
        }
        IdentityStoreError::Query { message } => {
            Error::internal(format!("identity store error: {message}"))
        }
        role_error @ (IdentityStoreError::RoleNotFound { .. }
        | IdentityStoreError::AlreadyInRole { .. }
        | IdentityStoreError::NotInRole { .. }) => Error::invalid_request(role_error.to_string()),
    }
}

/// Handles identity requests against the identity store.
#[derive(Clone)]
pub struct IdentityHandlers {
    store: Arc<dyn IdentityStore>,
    user_context: Arc<dyn UserContext>,
}

impl IdentityHandlers {
    /// Create handlers backed by `store`, resolving callers via `user_context`.
    pub fn new(store: Arc<dyn IdentityStore>, user_context: Arc<dyn UserContext>) -> Self {
        Self {
            store,
            user_context,
        }
    }

    /// Register handlers and validators for the identity requests.
    #[must_use]
    pub fn register(self, builder: DispatcherBuilder) -> DispatcherBuilder {
        builder
            .handler::<AssignRole, _>(self.clone())
            .validator::<AssignRole, _>(AssignRoleValidator)
            .handler::<UnassignRole, _>(self.clone())
            .validator::<UnassignRole, _>(UnassignRoleValidator)
            .handler::<UpdateCurrentUserDetails, _>(self)
            .validator::<UpdateCurrentUserDetails, _>(UpdateCurrentUserDetailsValidator)
            .expect::<AssignRole>()
            .expect::<UnassignRole>()
            .expect::<UpdateCurrentUserDetails>()
    }

    async fn user_by_email(&self, email: &str) -> Result<IdentityUser, Error> {
        self.store
            .find_by_email(email)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found(format!("user {email} not found")))
    }
}

#[async_trait]
impl RequestHandler<AssignRole> for IdentityHandlers {
    async fn handle(&self, request: AssignRole, _ctx: &RequestContext) -> Result<(), Error> {
        info!(role = %request.role_name, "assigning role");
        let user = self.user_by_email(&request.user_email).await?;
        self.store
            .add_to_role(&user.id, &RoleName::new(request.role_name))
            .await
            .map_err(map_identity_error)
    }
}

#[async_trait]
impl RequestHandler<UnassignRole> for IdentityHandlers {
    async fn handle(&self, request: UnassignRole, _ctx: &RequestContext) -> Result<(), Error> {
        info!(role = %request.role_name, "removing role");
        let user = self.user_by_email(&request.user_email).await?;
        self.store
            .remove_from_role(&user.id, &RoleName::new(request.role_name))
            .await
            .map_err(map_identity_error)
    }
}

#[async_trait]
impl RequestHandler<UpdateCurrentUserDetails> for IdentityHandlers {
    async fn handle(
        &self,
        request: UpdateCurrentUserDetails,
        _ctx: &RequestContext,
    ) -> Result<(), Error> {
        let caller = self.user_context.current()?.into_user()?;
        info!(user_id = %caller.id, "updating user details");
        let update = UserDetailsUpdate {
            birth_date: request.birth_date,
            nationality: request.nationality,
        };
        match self
            .store
            .update_details(&caller.id, &update)
            .await
            .map_err(map_identity_error)?
        {
            UpdateOutcome::Updated => Ok(()),
            UpdateOutcome::NotFound => {
                warn!(user_id = %caller.id, "authenticated user missing from store");
                Err(Error::not_found(format!("user {} not found", caller.id)))
            }
        }
    }
}

#[cfg(test)]
mod tests;
