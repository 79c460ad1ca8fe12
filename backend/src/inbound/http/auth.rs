//! Authorisation helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! role checks on the session claims here.

use crate::domain::{CurrentUser, Error};
use crate::inbound::http::session::SessionContext;

use super::ApiResult;

/// Return `403 Forbidden` unless `user` holds `role`.
pub fn ensure_role(user: &CurrentUser, role: &str) -> ApiResult<()> {
    if user.is_in_role(role) {
        Ok(())
    } else {
        Err(Error::forbidden(format!("{role} role required")))
    }
}

/// Require a signed-in caller holding `role`.
///
/// Anonymous callers get `401 Unauthorized`; signed-in callers without the
/// role get `403 Forbidden`.
pub fn require_role(session: &SessionContext, role: &str) -> ApiResult<CurrentUser> {
    let user = session.require_user()?;
    ensure_role(&user, role)?;
    Ok(user)
}
