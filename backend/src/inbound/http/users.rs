//! User account handlers under `/api/user`.
//!
//! ```text
//! POST   /api/user/register   {"name","email","password","role"?,"phone"?,"city"?}
//! POST   /api/user/login      {"email","password"}
//! POST   /api/user/logout
//! GET    /api/user
//! PUT    /api/user            {"newName"?,"newPassword"?,"phone"?,"city"?}
//! GET    /api/user/profile
//! GET    /api/user/details/{id}
//! PUT    /api/user/bookings   {"bookingId"}
//! DELETE /api/user/bookings   {"bookingId"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    AuthValidationError, Error, EventId, LoginCredentials, ProfileUpdate, PublicProfile,
    Registration, Role, SessionIdentity, UserId, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, ValidationCode, field_error, parse_id, parse_label};

/// Registration body. `role` defaults to `client`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[schema(example = "vendor")]
    pub role: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// Login body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sparse self-update. Absent or blank fields are left untouched.
///
/// `name` and `password` are the older spellings of `newName` and
/// `newPassword`; when both spellings are sent the `new*` field wins.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub new_name: Option<String>,
    pub name: Option<String>,
    pub new_password: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// Booking reference body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRefRequest {
    #[schema(value_type = String, format = Uuid)]
    pub booking_id: String,
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    let field = match &err {
        AuthValidationError::EmptyPassword => "password",
        AuthValidationError::User(
            UserValidationError::EmptyName | UserValidationError::NameTooLong { .. },
        ) => "name",
        AuthValidationError::User(_) => "email",
    };
    field_error(FieldName::new(field), ValidationCode::InvalidValue, err)
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.trim().is_empty())
}

impl UpdateUserRequest {
    fn display_name(&self) -> Option<&str> {
        blank_to_none(self.new_name.as_deref()).or_else(|| blank_to_none(self.name.as_deref()))
    }

    fn replacement_password(&self) -> Option<&str> {
        blank_to_none(self.new_password.as_deref())
            .or_else(|| blank_to_none(self.password.as_deref()))
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = PublicProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 422, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/user/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let role: Option<Role> = parse_label(body.role.as_deref(), FieldName::new("role"))?;
    let registration = Registration::try_new(
        &body.name,
        &body.email,
        &body.password,
        role,
        body.phone,
        body.city,
    )
    .map_err(map_auth_validation_error)?;
    let profile = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Authenticate and issue the session cookie.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = PublicProfile,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "User does not exist", body = Error),
        (status = 422, description = "Wrong password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<PublicProfile>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_auth_validation_error)?;
    let profile = state.login.authenticate(&credentials).await?;
    let identity = SessionIdentity::issue(&profile, state.clock.utc());
    session.persist_identity(&identity)?;
    info!(user_id = %profile.id, "user logged in");
    Ok(web::Json(profile))
}

/// Clear the session cookie. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/user/logout",
    responses((status = 200, description = "Logged out", body = bool)),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/user/logout")]
pub async fn logout(session: SessionContext) -> web::Json<bool> {
    session.purge();
    web::Json(true)
}

/// Fetch the caller's stored profile.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = PublicProfile),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PublicProfile>> {
    let identity = session.require_identity(state.clock.utc())?;
    let profile = state.profiles.profile(&identity.user_id).await?;
    Ok(web::Json(profile))
}

/// Return the identity held in the session without touching storage.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Session identity", body = SessionIdentity),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "sessionProfile"
)]
#[get("/user/profile")]
pub async fn session_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionIdentity>> {
    session.require_identity(state.clock.utc()).map(web::Json)
}

/// Sparse-patch the caller's profile.
#[utoipa::path(
    put,
    path = "/api/user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = PublicProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/user")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<PublicProfile>> {
    let identity = session.require_identity(state.clock.utc())?;
    let body = payload.into_inner();
    let update = ProfileUpdate::try_new(
        body.display_name(),
        body.replacement_password(),
        body.phone.clone(),
        body.city.clone(),
    )
    .map_err(map_auth_validation_error)?;
    let profile = state
        .accounts
        .update_profile(&identity.user_id, update)
        .await?;
    Ok(web::Json(profile))
}

/// Public profile of any user.
#[utoipa::path(
    get,
    path = "/api/user/details/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "userDetails",
    security([])
)]
#[get("/user/details/{id}")]
pub async fn user_details(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfile>> {
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    let profile = state.profiles.profile(&id).await?;
    Ok(web::Json(profile))
}

fn booking_ref(body: &BookingRefRequest) -> Result<EventId, Error> {
    parse_id(&body.booking_id, FieldName::new("bookingId"))
}

/// Append an event reference to the caller's bookings.
#[utoipa::path(
    put,
    path = "/api/user/bookings",
    request_body = BookingRefRequest,
    responses(
        (status = 200, description = "Updated user", body = PublicProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "addBooking"
)]
#[put("/user/bookings")]
pub async fn add_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookingRefRequest>,
) -> ApiResult<web::Json<PublicProfile>> {
    let identity = session.require_identity(state.clock.utc())?;
    let event_id = booking_ref(&payload)?;
    let profile = state
        .accounts
        .add_booking(&identity.user_id, &event_id)
        .await?;
    Ok(web::Json(profile))
}

/// Remove an event reference from the caller's bookings.
#[utoipa::path(
    delete,
    path = "/api/user/bookings",
    request_body = BookingRefRequest,
    responses(
        (status = 200, description = "Updated user", body = PublicProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeBooking"
)]
#[delete("/user/bookings")]
pub async fn remove_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookingRefRequest>,
) -> ApiResult<web::Json<PublicProfile>> {
    let identity = session.require_identity(state.clock.utc())?;
    let event_id = booking_ref(&payload)?;
    let profile = state
        .accounts
        .remove_booking(&identity.user_id, &event_id)
        .await?;
    Ok(web::Json(profile))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
