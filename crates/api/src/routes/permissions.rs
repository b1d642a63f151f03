//! Permission (short absence) routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::hydra::{Collection, Item, iri, user_ref};
use crate::routes::leaves::StatusRequest;
use crate::{AppState, middleware::AuthUser};
use leavedesk_core::leave::LeaveStatus;
use leavedesk_core::permission::duration_minutes;
use leavedesk_db::PermissionRepository;
use leavedesk_db::entities::permissions;
use leavedesk_db::repositories::{CreatePermissionInput, PermissionFilter, UpdatePermissionInput};
use leavedesk_shared::types::PageRequest;

/// Creates the permission routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(list_permissions).post(create_permission))
        .route(
            "/permissions/{id}",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
        .route("/permissions/{id}/status", put(update_status))
}

/// Query filters for listing permissions.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionQuery {
    /// Status filter.
    pub status: Option<LeaveStatus>,
    /// User IRI or ID (admins only).
    pub user: Option<String>,
}

/// Request body for filing a permission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    /// Owner IRI; admins only, defaults to the caller.
    pub user: Option<String>,
    /// Day of the absence.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time.
    pub end_time: NaiveTime,
    /// Reason.
    pub reason: Option<String>,
}

/// Request body for editing a pending permission.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    /// New day.
    pub date: Option<NaiveDate>,
    /// New start time.
    pub start_time: Option<NaiveTime>,
    /// New end time.
    pub end_time: Option<NaiveTime>,
    /// New reason.
    pub reason: Option<String>,
}

/// Permission fields as served.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionBody {
    /// Permission ID.
    pub id: Uuid,
    /// Owner IRI.
    pub user: String,
    /// Day of the absence.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time.
    pub end_time: NaiveTime,
    /// Length of the absence.
    pub duration_minutes: i64,
    /// Reason.
    pub reason: Option<String>,
    /// Workflow status.
    pub status: LeaveStatus,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
}

/// A permission resource.
pub type PermissionResponse = Item<PermissionBody>;

fn permission_response(permission: permissions::Model) -> PermissionResponse {
    Item::new(
        "Permission",
        "permissions",
        permission.id,
        PermissionBody {
            id: permission.id,
            user: iri("users", permission.user_id),
            date: permission.date,
            start_time: permission.start_time,
            end_time: permission.end_time,
            duration_minutes: duration_minutes(permission.start_time, permission.end_time),
            reason: permission.reason,
            status: permission.status.into(),
            created_at: permission.created_at,
        },
    )
}

async fn load_permission(
    repo: &PermissionRepository,
    id: Uuid,
) -> ApiResult<permissions::Model> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("permission", id))
}

/// GET `/permissions` - Permissions visible to the caller.
async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<PermissionQuery>,
) -> ApiResult<Json<Collection<PermissionResponse>>> {
    let requested = query.user.as_deref().map(user_ref).transpose()?;
    let filter = PermissionFilter {
        user_id: auth.scope(requested),
        status: query.status,
    };

    let (items, total) = PermissionRepository::new((*state.db).clone())
        .list(filter, page)
        .await?;
    let members = items.into_iter().map(permission_response).collect();
    Ok(Json(Collection::new(
        "Permission",
        "permissions",
        members,
        total,
    )))
}

/// GET `/permissions/{id}`
async fn get_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = load_permission(&PermissionRepository::new((*state.db).clone()), id).await?;
    auth.require_self_or_admin(permission.user_id)?;
    Ok(Json(permission_response(permission)))
}

/// POST `/permissions`
async fn create_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let user_id = match payload.user.as_deref().map(user_ref).transpose()? {
        Some(user_id) => {
            auth.require_self_or_admin(user_id)?;
            user_id
        }
        None => auth.user_id(),
    };

    let permission = PermissionRepository::new((*state.db).clone())
        .create(CreatePermissionInput {
            user_id,
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            reason: payload.reason,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(permission_response(permission))))
}

/// PUT `/permissions/{id}` - Edit a pending permission.
async fn update_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let repo = PermissionRepository::new((*state.db).clone());
    let permission = load_permission(&repo, id).await?;
    auth.require_self_or_admin(permission.user_id)?;

    let permission = repo
        .update(
            id,
            UpdatePermissionInput {
                date: payload.date,
                start_time: payload.start_time,
                end_time: payload.end_time,
                reason: payload.reason,
            },
        )
        .await?;
    Ok(Json(permission_response(permission)))
}

/// DELETE `/permissions/{id}`
async fn delete_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = PermissionRepository::new((*state.db).clone());
    let permission = load_permission(&repo, id).await?;
    auth.require_self_or_admin(permission.user_id)?;

    repo.delete(id, auth.is_admin()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/permissions/{id}/status` - Approve or reject (admin).
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    auth.require_admin()?;

    let permission = PermissionRepository::new((*state.db).clone())
        .update_status(id, payload.status)
        .await?;

    info!(permission_id = %id, decided_by = %auth.user_id(), "permission decided");
    Ok(Json(permission_response(permission)))
}
