//! Login and password reset handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use auth_service_lib::service::LoginResponse;
use common::AppResult;

use crate::extractors::ValidatedJson;
use crate::handlers::user_handler::MessageResponse;
use crate::state::AppState;

/// Login request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Reset code request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
}

/// Issued reset code, returned to the client which keeps a copy
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[schema(example = "4821")]
    pub reset_code: String,
}

/// New password plus the code it is authorised by
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    pub reset_code: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "newPassword is required"))]
    pub new_password: String,
}

/// Pending code to discard
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanResetCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    pub reset_code: String,
}

/// Login token as documented for clients
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub usuario: domain::UserResponse,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", put(reset_password))
        .route("/clean-resetCode", put(clean_reset_code))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/usuarios/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;
    Ok(Json(response))
}

/// Issue a reset code for an email
#[utoipa::path(
    post,
    path = "/usuarios/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code issued", body = ForgotPasswordResponse),
        (status = 404, description = "Email not found")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<ForgotPasswordResponse>> {
    let code = state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(ForgotPasswordResponse {
        message: "Reset code generated".to_string(),
        reset_code: code.into_string(),
    }))
}

/// Set a new password using a reset code
#[utoipa::path(
    put,
    path = "/usuarios/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password missing"),
        (status = 401, description = "Invalid reset code"),
        (status = 404, description = "Email not found")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .reset_password(&payload.email, &payload.reset_code, payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Discard a pending reset code
#[utoipa::path(
    put,
    path = "/usuarios/clean-resetCode",
    tag = "Authentication",
    request_body = CleanResetCodeRequest,
    responses(
        (status = 200, description = "Reset code cleared", body = MessageResponse),
        (status = 401, description = "Invalid reset code"),
        (status = 404, description = "Email not found")
    )
)]
pub async fn clean_reset_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CleanResetCodeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let cleared = state
        .auth_service
        .clean_reset_code(&payload.email, &payload.reset_code)
        .await?;

    let message = if cleared {
        "Reset code cleared"
    } else {
        "No pending reset code"
    };
    Ok(Json(MessageResponse::new(message)))
}
