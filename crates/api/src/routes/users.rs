//! User management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::hydra::{Collection, Item, iri};
use crate::{AppState, middleware::AuthUser};
use leavedesk_core::auth::{hash_password, validate_password_strength};
use leavedesk_db::UserRepository;
use leavedesk_db::entities::users;
use leavedesk_db::repositories::{CreateUserInput, UpdateUserInput};
use leavedesk_shared::Role;
use leavedesk_shared::types::PageRequest;

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email.
    pub email: String,
    /// Plain password, hashed before storage.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role, employee when omitted.
    pub role: Option<Role>,
    /// Hire date; opens a prorated balance for the hire year.
    pub hire_date: Option<NaiveDate>,
}

/// Request body for updating a user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email.
    pub email: Option<String>,
    /// New plain password.
    pub password: Option<String>,
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New hire date.
    pub hire_date: Option<NaiveDate>,
}

/// User fields as served.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role.
    pub role: Role,
    /// Hire date.
    pub hire_date: Option<NaiveDate>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

/// A user resource.
pub type UserResponse = Item<UserBody>;

/// Builds the served resource for a stored user.
pub fn user_response(user: users::Model) -> UserResponse {
    Item::new(
        "User",
        "users",
        user.id,
        UserBody {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.into(),
            hire_date: user.hire_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        },
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedUserBody {
    #[serde(flatten)]
    user: UserResponse,
    /// IRI of the balance opened for the hire year.
    initial_balance: Option<String>,
}

fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::validation(format!("invalid email address: {email}"))),
    }
}

fn hash_new_password(password: &str) -> ApiResult<String> {
    validate_password_strength(password)?;
    Ok(hash_password(password)?)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/me` - The authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
    Ok(Json(user_response(user)))
}

/// GET `/users` - All users for admins, only the caller otherwise.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Collection<UserResponse>>> {
    let repo = UserRepository::new((*state.db).clone());

    if !auth.is_admin() {
        let own: Vec<_> = repo
            .find_by_id(auth.user_id())
            .await?
            .into_iter()
            .map(user_response)
            .collect();
        let total = own.len() as u64;
        return Ok(Json(Collection::new("User", "users", own, total)));
    }

    let (users, total) = repo.list(page).await?;
    let members = users.into_iter().map(user_response).collect();
    Ok(Json(Collection::new("User", "users", members, total)))
}

/// GET `/users/{id}` - One user, for admins or the user themself.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    auth.require_self_or_admin(id)?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(user_response(user)))
}

/// POST `/users` - Create a user (admin).
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreatedUserBody>)> {
    auth.require_admin()?;
    validate_email(&payload.email)?;
    let password_hash = hash_new_password(&payload.password)?;

    let created = UserRepository::new((*state.db).clone())
        .create(
            CreateUserInput {
                email: payload.email,
                password_hash,
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                role: payload.role.unwrap_or(Role::Employee),
                hire_date: payload.hire_date,
            },
            state.policy,
        )
        .await?;

    info!(user_id = %created.user.id, created_by = %auth.user_id(), "user created via API");
    let initial_balance = created
        .balance
        .as_ref()
        .map(|balance| iri("leave_balances", balance.id));

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserBody {
            user: user_response(created.user),
            initial_balance,
        }),
    ))
}

/// PUT `/users/{id}` - Update a user (admin).
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth.require_admin()?;
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    let password_hash = payload
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()?;

    let user = UserRepository::new((*state.db).clone())
        .update(
            id,
            UpdateUserInput {
                email: payload.email,
                password_hash,
                first_name: payload.first_name,
                last_name: payload.last_name,
                role: payload.role,
                hire_date: payload.hire_date,
            },
        )
        .await?;
    Ok(Json(user_response(user)))
}

/// DELETE `/users/{id}` - Delete a user and everything they own (admin).
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    if id == auth.user_id() {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    UserRepository::new((*state.db).clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
