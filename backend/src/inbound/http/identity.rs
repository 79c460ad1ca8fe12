//! Identity HTTP handlers: role administration and the caller's profile.
//!
//! ```text
//! PATCH  /api/identity/users     {"birthDate":"1990-05-17","nationality":"Polish"}
//! POST   /api/identity/userrole  {"userEmail":"owner@example.com","roleName":"Owner"}
//! DELETE /api/identity/userrole  {"userEmail":"owner@example.com","roleName":"Owner"}
//! ```

use actix_web::{HttpResponse, delete, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AssignRole, RequestContext, UnassignRole, UpdateCurrentUserDetails, roles};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_role;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_date};

const BIRTH_DATE: FieldName = FieldName::new("birthDate");

/// Request body naming a user and a role.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleBody {
    #[schema(example = "owner@example.com")]
    pub user_email: String,
    #[schema(example = "Owner")]
    pub role_name: String,
}

/// Sparse profile update for the signed-in user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsBody {
    /// Calendar date formatted as `YYYY-MM-DD`.
    #[schema(example = "1990-05-17")]
    pub birth_date: Option<String>,
    pub nationality: Option<String>,
}

/// Update the signed-in user's birth date and nationality.
#[utoipa::path(
    patch,
    path = "/api/identity/users",
    request_body = UserDetailsBody,
    responses(
        (status = 204, description = "Profile updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema)
    ),
    tags = ["identity"],
    operation_id = "updateCurrentUserDetails"
)]
#[patch("/identity/users")]
pub async fn update_user_details(
    state: web::Data<HttpState>,
    payload: web::Json<UserDetailsBody>,
) -> ApiResult<HttpResponse> {
    let UserDetailsBody {
        birth_date,
        nationality,
    } = payload.into_inner();
    let request = UpdateCurrentUserDetails {
        birth_date: parse_optional_date(birth_date, BIRTH_DATE)?,
        nationality,
    };
    state
        .dispatcher
        .send(request, &RequestContext::new())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Grant a role to a user. Administrators only.
#[utoipa::path(
    post,
    path = "/api/identity/userrole",
    request_body = UserRoleBody,
    responses(
        (status = 204, description = "Role assigned"),
        (status = 400, description = "Invalid request or role state", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["identity"],
    operation_id = "assignUserRole"
)]
#[post("/identity/userrole")]
pub async fn assign_user_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserRoleBody>,
) -> ApiResult<HttpResponse> {
    require_role(&session, roles::ADMIN)?;
    let UserRoleBody {
        user_email,
        role_name,
    } = payload.into_inner();
    state
        .dispatcher
        .send(
            AssignRole {
                user_email,
                role_name,
            },
            &RequestContext::new(),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Revoke a role from a user. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/identity/userrole",
    request_body = UserRoleBody,
    responses(
        (status = 204, description = "Role unassigned"),
        (status = 400, description = "Invalid request or role state", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["identity"],
    operation_id = "unassignUserRole"
)]
#[delete("/identity/userrole")]
pub async fn unassign_user_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserRoleBody>,
) -> ApiResult<HttpResponse> {
    require_role(&session, roles::ADMIN)?;
    let UserRoleBody {
        user_email,
        role_name,
    } = payload.into_inner();
    state
        .dispatcher
        .send(
            UnassignRole {
                user_email,
                role_name,
            },
            &RequestContext::new(),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
