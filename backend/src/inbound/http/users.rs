//! Session and user administration handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! POST /api/v1/logout
//! GET /api/v1/me
//! POST /api/v1/users
//! PATCH /api/v1/users/{user_id} {"active":false}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, OfficeId, Role, RoleError, User, UserDraft,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

/// Login request body for `POST /api/v1/login`.
///
/// Example JSON:
/// `{"username":"admin","password":"password"}`
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))
        ),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.authentication.authenticate(&credentials).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let caller = state.caller(&session).await?;
    let user = state.corridor.current_user(&caller).await?;
    Ok(web::Json(user))
}

/// Request body for `POST /api/v1/users`.
///
/// `role` is `central` or `division`; division users need an `officeId`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    #[schema(example = "division")]
    pub role: String,
    pub office_id: Option<OfficeId>,
    pub password: String,
}

fn map_role_error(err: RoleError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": "role",
        "code": "invalid_role",
    }))
}

impl TryFrom<CreateUserRequest> for UserDraft {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let role = Role::from_parts(value.role.trim(), value.office_id).map_err(map_role_error)?;
        Self::new(
            &value.username,
            &value.full_name,
            value.email.as_deref(),
            role,
            &value.password,
        )
        .map_err(Error::from)
    }
}

/// Create a user; central administrators only.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown office", body = Error),
        (status = 409, description = "Username taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state.corridor.create_user(&caller, draft).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Request body for `PATCH /api/v1/users/{user_id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub active: Option<bool>,
}

/// Activate or deactivate a user; central administrators only.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    request_body = UpdateUserRequest,
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let user_id: UserId = parse_id(&path, FieldName::new("userId"))?;
    let active = payload
        .active
        .ok_or_else(|| missing_field_error(FieldName::new("active")))?;
    let caller = state.caller(&session).await?;
    let user = state
        .corridor
        .set_user_active(&caller, user_id, active)
        .await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests;
