//! Sign-up, login, password reset, session and staff account endpoints.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use portal_auth::credentials::Account;
use portal_auth::gate::index_redirect;
use portal_auth::service::{
    LoginRequest, PasswordResetRequest, SignupRequest, StaffCreatedAccount, StaffUserRequest,
};
use portal_auth::{default_app_path, SessionSnapshot, SessionUser};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct VerifyOtpReq {
    #[serde(default)]
    pub otp: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetRequestReq {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginRes {
    pub user: SessionUser,
    /// Landing page for the user's role.
    pub redirect: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionRes {
    pub session: SessionSnapshot,
    /// Where `/app` leads for this session.
    pub home: String,
}

#[derive(Deserialize, IntoParams)]
pub struct RouteQuery {
    /// Portal page path, e.g. `/app/patients`.
    pub path: String,
}

#[derive(Serialize, ToSchema)]
pub struct RouteRes {
    pub path: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

fn message(text: &str) -> Json<MessageRes> {
    Json(MessageRes {
        message: text.to_owned(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Patient account created", body = Account),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Self-service patient registration. Does not sign in.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = state.auth.lock().await.signup(req)?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Code mailed; session waits for it", body = SessionSnapshot),
        (status = 401, description = "Wrong credentials or role", body = ErrorBody),
        (status = 502, description = "OTP service failed", body = ErrorBody)
    )
)]
/// First login step: check the password and have a code mailed.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let mut auth = state.auth.lock().await;
    auth.request_otp(req).await?;
    Ok(Json(auth.snapshot()))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = VerifyOtpReq,
    responses(
        (status = 200, description = "Signed in", body = LoginRes),
        (status = 400, description = "Code too short", body = ErrorBody),
        (status = 401, description = "No pending login, or it expired", body = ErrorBody),
        (status = 502, description = "Code rejected by the OTP service", body = ErrorBody)
    )
)]
/// Second login step: confirm the mailed code.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpReq>,
) -> ApiResult<Json<LoginRes>> {
    let user = state.auth.lock().await.verify_otp(&req.otp).await?;
    let redirect = default_app_path(user.role).to_owned();
    Ok(Json(LoginRes { user, redirect }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Signed out", body = SessionSnapshot))
)]
pub async fn logout(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut auth = state.auth.lock().await;
    auth.logout();
    Json(auth.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    request_body = ResetRequestReq,
    responses(
        (status = 200, description = "Reset code mailed", body = MessageRes),
        (status = 400, description = "Missing email", body = ErrorBody),
        (status = 502, description = "OTP service failed", body = ErrorBody)
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequestReq>,
) -> ApiResult<Json<MessageRes>> {
    state
        .auth
        .lock()
        .await
        .request_password_reset(&req.email)
        .await?;
    Ok(message("Reset code sent. Check your email."))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageRes),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody),
        (status = 502, description = "Code rejected by the OTP service", body = ErrorBody)
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<MessageRes>> {
    state.auth.lock().await.reset_password(req).await?;
    Ok(message("Password updated. Please sign in."))
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionRes))
)]
pub async fn session(State(state): State<AppState>) -> Json<SessionRes> {
    let auth = state.auth.lock().await;
    let session = auth.snapshot();
    Json(SessionRes {
        home: index_redirect(session.role).to_owned(),
        session,
    })
}

#[utoipa::path(
    get,
    path = "/api/session/route",
    params(RouteQuery),
    responses((status = 200, description = "Whether the session may open a portal page", body = RouteRes))
)]
/// Runs the portal page table against the current session.
pub async fn check_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Json<RouteRes> {
    let role = state.auth.lock().await.session().role();
    let decision = state.app_routes.check(&query.path, role);
    Json(RouteRes {
        allowed: decision.location().is_none(),
        redirect: decision.location().map(str::to_owned),
        path: query.path,
    })
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = StaffUserRequest,
    responses(
        (status = 201, description = "Account created", body = StaffCreatedAccount),
        (status = 403, description = "Caller may not create this account", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Staff registration of an account on someone else's behalf.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<StaffUserRequest>,
) -> ApiResult<(StatusCode, Json<StaffCreatedAccount>)> {
    let mut auth = state.auth.lock().await;
    let caller = auth
        .current_user()
        .map(|u| u.role)
        .ok_or_else(ApiError::unauthenticated)?;
    let created = auth.create_user_by_staff(caller, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}
