//! Resolution of the calling user from the ambient request principal.
//!
//! Inbound adapters establish a [`Principal`] for each request with
//! [`Principal::scope`]. Handlers read it back through the [`UserContext`]
//! port, so they never accept a caller-supplied user id for "my account"
//! operations.
//!
//! The principal lives in task-local storage and, like [`super::TraceId`],
//! is not inherited by spawned tasks.

use std::future::Future;

use tokio::task_local;

use super::{CurrentUser, Error};

task_local! {
    static PRINCIPAL: Principal;
}

/// Identity attached to the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A request scope exists but carries no authenticated identity.
    Anonymous,
    /// The caller presented valid claims.
    Authenticated(CurrentUser),
}

impl Principal {
    /// Run `fut` with this principal in scope.
    pub async fn scope<Fut>(self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        PRINCIPAL.scope(self, fut).await
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Return the authenticated user or an `unauthorized` error.
    pub fn into_user(self) -> Result<CurrentUser, Error> {
        match self {
            Self::Anonymous => Err(Error::unauthorized("login required")),
            Self::Authenticated(user) => Ok(user),
        }
    }
}

/// Errors raised while resolving the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserContextError {
    /// The resolver ran outside any request scope. This is a wiring bug.
    #[error("user context requested outside of a request scope")]
    NoRequestScope,
}

impl From<UserContextError> for Error {
    fn from(value: UserContextError) -> Self {
        Error::internal(value.to_string())
    }
}

/// Port resolving the caller of the current request.
#[cfg_attr(test, mockall::automock)]
pub trait UserContext: Send + Sync {
    /// Principal for the current request.
    fn current(&self) -> Result<Principal, UserContextError>;
}

/// Reads the principal established by [`Principal::scope`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbientUserContext;

impl UserContext for AmbientUserContext {
    fn current(&self) -> Result<Principal, UserContextError> {
        PRINCIPAL
            .try_with(Clone::clone)
            .map_err(|_| UserContextError::NoRequestScope)
    }
}
