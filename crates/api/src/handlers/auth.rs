//! Handlers for `/auth` (login, logout, current user).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::error::CoreError;
use storefront_db::models::admin_user::AdminUserResponse;

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_or_dummy;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One message for unknown email and wrong password alike.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AdminUserResponse,
    /// Session lifetime in seconds.
    pub expires_in: i64,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

/// POST /api/v1/auth/login
///
/// Verify email + password and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let email = input.email.trim().to_lowercase();
    let user = state.users.find_user_by_email(&email).await?;

    // Unknown emails pay for a verification too, so timing does not reveal
    // which addresses have accounts.
    let password_valid =
        verify_or_dummy(&input.password, user.as_ref().map(|u| u.password_hash.as_str()))
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    let user = match user {
        Some(user) if password_valid => user,
        Some(user) => {
            tracing::info!(user_id = user.id, "Rejected login attempt");
            return Err(invalid_credentials());
        }
        None => return Err(invalid_credentials()),
    };

    let jwt = &state.config.jwt;
    let token = generate_token(user.id, &user.email, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let cookie = state.config.cookie.session(&token, jwt.expiry_secs());

    tracing::info!(user_id = user.id, "Admin signed in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: AuthResponse {
                user: AdminUserResponse::from(&user),
                expires_in: jwt.expiry_secs(),
            },
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Clear the session cookie. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, state.config.cookie.cleared())],
    )
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AdminUserResponse>>> {
    let user = state
        .users
        .find_user(auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(DataResponse {
        data: AdminUserResponse::from(&user),
    }))
}
