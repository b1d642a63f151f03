//! Login route.
//!
//! The issued bearer token is the only session state; `/me` (in `users`)
//! reads the caller back from it.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::routes::users::{UserResponse, user_response};
use leavedesk_core::auth::verify_password;
use leavedesk_db::UserRepository;
use leavedesk_shared::auth::LoginRequest;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// The authenticated user.
    pub user: UserResponse,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid email or password")
}

/// POST `/login` - Authenticate and return a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_access_token(user.id, user.role.into())?;

    info!(user_id = %user.id, "User logged in successfully");
    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt_service.access_token_expires_in(),
        user: user_response(user),
    }))
}
