/// /auth/* endpoints
use crate::{
    account::{
        LoginRequest, LoginResponse, ResetPasswordRequest, ResetTokenResponse, SendOtpRequest,
        SignupRequest, UserView, VerifyOtpRequest,
    },
    api::{middleware, success, message_only, ApiResponse},
    auth::AuthContext,
    context::AppContext,
    error::{AuthError, AuthResult},
    validation,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/send/otp", post(send_otp))
        .route("/auth/verify/otp", patch(verify_otp))
        .route("/auth/forgot/password/send/otp", post(forgot_password_send_otp))
        .route("/auth/forgot/password/verify/otp", patch(forgot_password_verify_otp))
        .route("/auth/reset/password", patch(reset_password))
        .route("/auth/profile", get(profile))
}

fn invalid_body(_: JsonRejection) -> AuthError {
    AuthError::Validation("Invalid request body!".to_string())
}

/// Register a new account
async fn signup(
    State(ctx): State<AppContext>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<ApiResponse<UserView>>)> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    let user = ctx.account_manager.signup(request).await?;
    Ok((
        StatusCode::CREATED,
        success("User registered successfully.", user),
    ))
}

/// Authenticate and mint an access token
async fn login(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<LoginResponse>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    let client = middleware::client_meta(&headers);
    let response = ctx.account_manager.login(request, client).await?;
    Ok(success("Login successful.", response))
}

/// Send verification codes to the supplied channels
async fn send_otp(
    State(ctx): State<AppContext>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    ctx.account_manager.send_otp(request).await?;
    Ok(message_only("OTP sent successfully."))
}

/// Verify a channel with a previously issued code
async fn verify_otp(
    State(ctx): State<AppContext>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    ctx.account_manager.verify_otp(request).await?;
    Ok(message_only("OTP verified successfully!"))
}

/// Send password-reset codes to the supplied channels
async fn forgot_password_send_otp(
    State(ctx): State<AppContext>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    ctx.account_manager.forgot_password_send_otp(request).await?;
    Ok(message_only("OTP sent successfully."))
}

/// Trade a password-reset code for a short-lived reset token
async fn forgot_password_verify_otp(
    State(ctx): State<AppContext>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<ResetTokenResponse>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    let reset = ctx.account_manager.forgot_password_verify_otp(request).await?;
    Ok(success("Now You can reset your password.", reset))
}

/// Replace the password for the bearer of a valid token
async fn reset_password(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> AuthResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    validation::check(&request)?;

    tracing::info!("Password reset requested by {}", auth.claims.name);
    ctx.account_manager.reset_password(auth.user_id, request).await?;
    Ok(message_only("Password reset successfully."))
}

/// Sanitized view of the authenticated user
async fn profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> AuthResult<Json<ApiResponse<UserView>>> {
    let user = ctx.account_manager.profile(auth.user_id).await?;
    Ok(success("User profile", user))
}
