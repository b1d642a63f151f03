//! Leave request routes, including status decisions and certificates.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::hydra::{Collection, Item, iri, user_ref};
use crate::{AppState, middleware::AuthUser};
use leavedesk_core::balance::Deduction;
use leavedesk_core::certificate::{CertificateService, content_type_for};
use leavedesk_core::leave::{LeaveStatus, LeaveType};
use leavedesk_db::LeaveRepository;
use leavedesk_db::entities::leaves;
use leavedesk_db::repositories::{CreateLeaveInput, LeaveFilter, UpdateLeaveInput};
use leavedesk_shared::AppError;
use leavedesk_shared::types::PageRequest;

/// Upper bound on a certificate upload request; the storage size limit is
/// checked separately.
const CERTIFICATE_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Creates the leave routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaves", get(list_leaves).post(create_leave))
        .route(
            "/leaves/{id}",
            get(get_leave).put(update_leave).delete(delete_leave),
        )
        .route("/leaves/{id}/status", put(update_status))
        .route(
            "/leaves/{id}/certificate",
            get(download_certificate)
                .post(upload_certificate)
                .layer(DefaultBodyLimit::max(CERTIFICATE_BODY_LIMIT)),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query filters for listing leaves.
#[derive(Debug, Default, Deserialize)]
pub struct LeaveQuery {
    /// Status filter.
    pub status: Option<LeaveStatus>,
    /// Type filter.
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    /// User IRI or ID (admins only).
    pub user: Option<String>,
}

/// Request body for filing a leave.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    /// Owner IRI; admins only, defaults to the caller.
    pub user: Option<String>,
    /// Kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Reason.
    pub reason: Option<String>,
}

/// Request body for editing a pending leave.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveRequest {
    /// New kind of leave.
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New last day.
    pub end_date: Option<NaiveDate>,
    /// New reason.
    pub reason: Option<String>,
}

/// Request body for a status decision.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status.
    pub status: LeaveStatus,
}

/// Leave fields as served.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBody {
    /// Leave ID.
    pub id: Uuid,
    /// Owner IRI.
    pub user: String,
    /// Kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Reason.
    pub reason: Option<String>,
    /// Workflow status.
    pub status: LeaveStatus,
    /// Original certificate file name.
    pub certificate_name: Option<String>,
    /// Download IRI when a certificate is stored.
    pub certificate: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

/// A leave resource.
pub type LeaveResponse = Item<LeaveBody>;

fn leave_response(leave: leaves::Model) -> LeaveResponse {
    let certificate = leave
        .certificate_key
        .as_ref()
        .map(|_| format!("{}/certificate", iri("leaves", leave.id)));

    Item::new(
        "Leave",
        "leaves",
        leave.id,
        LeaveBody {
            id: leave.id,
            user: iri("users", leave.user_id),
            leave_type: leave.leave_type.into(),
            start_date: leave.start_date,
            end_date: leave.end_date,
            reason: leave.reason,
            status: leave.status.into(),
            certificate_name: leave.certificate_name,
            certificate,
            created_at: leave.created_at,
            updated_at: leave.updated_at,
        },
    )
}

/// Response to a status decision.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// The decided leave.
    #[serde(flatten)]
    pub leave: LeaveResponse,
    /// Working days counted for an approval.
    pub working_days: i32,
    /// Days taken from the balance, if any.
    pub deduction: Option<Deduction>,
}

fn repository(state: &AppState) -> LeaveRepository {
    LeaveRepository::new((*state.db).clone(), state.policy)
}

async fn load_leave(repo: &LeaveRepository, id: Uuid) -> ApiResult<leaves::Model> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("leave", id))
}

fn certificates(state: &AppState) -> ApiResult<CertificateService> {
    state
        .storage
        .as_ref()
        .map(|storage| CertificateService::new(Arc::clone(storage)))
        .ok_or_else(|| {
            ApiError(AppError::Storage(
                "certificate storage is not configured".to_string(),
            ))
        })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/leaves` - Leaves visible to the caller.
async fn list_leaves(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<LeaveQuery>,
) -> ApiResult<Json<Collection<LeaveResponse>>> {
    let requested = query.user.as_deref().map(user_ref).transpose()?;
    let filter = LeaveFilter {
        user_id: auth.scope(requested),
        status: query.status,
        leave_type: query.leave_type,
    };

    let (leaves, total) = repository(&state).list(filter, page).await?;
    let members = leaves.into_iter().map(leave_response).collect();
    Ok(Json(Collection::new("Leave", "leaves", members, total)))
}

/// GET `/leaves/{id}` - One leave, for its owner or an admin.
async fn get_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveResponse>> {
    let leave = load_leave(&repository(&state), id).await?;
    auth.require_self_or_admin(leave.user_id)?;
    Ok(Json(leave_response(leave)))
}

/// POST `/leaves` - File a pending leave.
async fn create_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateLeaveRequest>,
) -> ApiResult<(StatusCode, Json<LeaveResponse>)> {
    let user_id = match payload.user.as_deref().map(user_ref).transpose()? {
        Some(user_id) => {
            auth.require_self_or_admin(user_id)?;
            user_id
        }
        None => auth.user_id(),
    };

    let leave = repository(&state)
        .create(CreateLeaveInput {
            user_id,
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(leave_response(leave))))
}

/// PUT `/leaves/{id}` - Edit a pending leave.
async fn update_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeaveRequest>,
) -> ApiResult<Json<LeaveResponse>> {
    let repo = repository(&state);
    let leave = load_leave(&repo, id).await?;
    auth.require_self_or_admin(leave.user_id)?;

    let leave = repo
        .update(
            id,
            UpdateLeaveInput {
                leave_type: payload.leave_type,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
            },
        )
        .await?;
    Ok(Json(leave_response(leave)))
}

/// DELETE `/leaves/{id}` - Employees may withdraw pending leaves; admins may
/// delete any leave.
async fn delete_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = repository(&state);
    let leave = load_leave(&repo, id).await?;
    auth.require_self_or_admin(leave.user_id)?;

    let deleted = repo.delete(id, auth.is_admin()).await?;

    if let Some(key) = deleted.certificate_key.as_deref()
        && let Ok(service) = certificates(&state)
        && let Err(e) = service.remove(key).await
    {
        warn!(leave_id = %id, error = %e, "failed to remove certificate of deleted leave");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/leaves/{id}/status` - Approve or reject (admin).
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<StatusResponse>> {
    auth.require_admin()?;

    let change = repository(&state)
        .update_status(id, payload.status)
        .await?;

    info!(leave_id = %id, decided_by = %auth.user_id(), status = %payload.status, "leave decided");
    Ok(Json(StatusResponse {
        leave: leave_response(change.leave),
        working_days: change.working_days,
        deduction: change.deduction,
    }))
}

/// POST `/leaves/{id}/certificate` - Attach a certificate (multipart field `file`).
async fn upload_certificate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<LeaveResponse>> {
    let service = certificates(&state)?;
    let repo = repository(&state);
    let leave = load_leave(&repo, id).await?;
    auth.require_self_or_admin(leave.user_id)?;

    let (filename, content_type, data) = read_file_field(&mut multipart).await?;

    let stored = service
        .upload(
            id,
            &filename,
            &content_type,
            data,
            leave.certificate_key.as_deref(),
        )
        .await?;

    match repo
        .set_certificate(id, Some(stored.name.clone()), Some(stored.key.clone()))
        .await
    {
        Ok(leave) => {
            service.commit(id, &stored).await;
            Ok(Json(leave_response(leave)))
        }
        Err(e) => {
            service.rollback(id, &stored).await;
            Err(e.into())
        }
    }
}

/// GET `/leaves/{id}/certificate` - Download the stored certificate.
async fn download_certificate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let service = certificates(&state)?;
    let leave = load_leave(&repository(&state), id).await?;
    auth.require_self_or_admin(leave.user_id)?;

    let download = service
        .download(
            id,
            leave.certificate_key.as_deref(),
            leave.certificate_name.as_deref(),
        )
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, download.content_disposition),
        ],
        download.data,
    ))
}

/// Reads the `file` field: original name, declared MIME type and bytes.
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<(String, String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::validation("the file field needs a file name"))?;
        let content_type = field
            .content_type()
            .map_or_else(|| content_type_for(&filename).to_string(), str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read upload: {e}")))?;

        return Ok((filename, content_type, data));
    }

    Err(ApiError::validation("missing multipart field `file`"))
}
