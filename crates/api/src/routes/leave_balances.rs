//! Leave balance routes.
//!
//! Creation, carry-over, manual deductions and updates are admin-only. A
//! `PUT` only changes `carriedOverToNextYear`; the new figure is pushed onto
//! the following year's record in the same transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::hydra::{Collection, Item, iri, user_ref};
use crate::{AppState, middleware::AuthUser};
use leavedesk_core::balance::{BalanceUpdate, Deduction, LeaveBalance};
use leavedesk_core::leave::LeaveType;
use leavedesk_db::LeaveBalanceRepository;
use leavedesk_db::repositories::BalanceFilter;
use leavedesk_shared::types::PageRequest;

/// Creates the leave balance routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leave_balances", get(list_balances).post(create_balance))
        .route("/leave_balances/carry_over", post(carry_over))
        .route("/leave_balances/deduct", post(deduct))
        .route(
            "/leave_balances/{id}",
            get(get_balance).put(update_balance),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query filters for listing balances.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// User IRI or ID.
    pub user: Option<String>,
    /// Calendar year.
    pub year: Option<i32>,
}

/// Request body for creating a balance.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBalanceRequest {
    /// User IRI or ID.
    pub user: String,
    /// Calendar year.
    pub year: i32,
    /// Months worked; creates a prorated balance when present.
    pub months_worked: Option<i32>,
}

/// Request body for a carry-over.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOverRequest {
    /// User IRI or ID.
    pub user: String,
    /// Year the days leave.
    pub from_year: i32,
    /// Days to carry.
    pub days: i32,
}

/// Request body for a manual deduction.
#[derive(Debug, Deserialize)]
pub struct DeductRequest {
    /// User IRI or ID.
    pub user: String,
    /// Calendar year.
    pub year: i32,
    /// Days to deduct.
    pub days: i32,
    /// Leave type deciding the pool.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
}

/// Balance fields as served.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceBody {
    /// Balance ID.
    pub id: Uuid,
    /// Owner IRI.
    pub user: String,
    /// Calendar year.
    pub year: i32,
    /// Paid days granted.
    pub initial_paid_leave: i32,
    /// Sick days granted.
    pub initial_sick_leave: i32,
    /// Paid days left.
    pub remaining_paid_leave: i32,
    /// Sick days left.
    pub remaining_sick_leave: i32,
    /// Days received from last year.
    pub carried_over_from_previous_year: i32,
    /// Days earmarked for next year.
    pub carried_over_to_next_year: i32,
}

/// A balance resource.
pub type BalanceResponse = Item<BalanceBody>;

fn balance_response(balance: LeaveBalance) -> BalanceResponse {
    Item::new(
        "LeaveBalance",
        "leave_balances",
        balance.id,
        BalanceBody {
            id: balance.id,
            user: iri("users", balance.user_id),
            year: balance.year,
            initial_paid_leave: balance.initial_paid_leave,
            initial_sick_leave: balance.initial_sick_leave,
            remaining_paid_leave: balance.remaining_paid_leave,
            remaining_sick_leave: balance.remaining_sick_leave,
            carried_over_from_previous_year: balance.carried_over_from_previous_year,
            carried_over_to_next_year: balance.carried_over_to_next_year,
        },
    )
}

/// Response to a carry-over.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOverResponse {
    /// Source year after the carry.
    pub from: BalanceResponse,
    /// Following year after receiving the days.
    pub to: BalanceResponse,
    /// Days already used in the following year that were given back.
    pub discarded_days: i32,
}

/// Response to a manual deduction.
#[derive(Debug, Serialize)]
pub struct DeductResponse {
    /// Balance after the deduction.
    pub balance: BalanceResponse,
    /// Where the days came from.
    pub deduction: Deduction,
}

/// Response to an update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceResponse {
    /// The updated balance.
    #[serde(flatten)]
    pub balance: BalanceResponse,
    /// The following year's balance when the carry-forward was propagated.
    pub next_year: Option<BalanceResponse>,
    /// Days already used in the following year that were given back.
    pub discarded_days: i32,
}

fn repository(state: &AppState) -> LeaveBalanceRepository {
    LeaveBalanceRepository::new((*state.db).clone(), state.policy)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/leave_balances?user=/api/users/{id}&year=2024`
async fn list_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<Collection<BalanceResponse>>> {
    let requested = query.user.as_deref().map(user_ref).transpose()?;
    let filter = BalanceFilter {
        user_id: auth.scope(requested),
        year: query.year,
    };

    let (balances, total) = repository(&state).list(filter, page).await?;
    let members = balances.into_iter().map(balance_response).collect();
    Ok(Json(Collection::new(
        "LeaveBalance",
        "leave_balances",
        members,
        total,
    )))
}

/// GET `/leave_balances/{id}`
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = repository(&state)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("leave balance", id))?;
    auth.require_self_or_admin(balance.user_id)?;
    Ok(Json(balance_response(balance)))
}

/// POST `/leave_balances` - Annual, or prorated with `monthsWorked` (admin).
async fn create_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBalanceRequest>,
) -> ApiResult<(StatusCode, Json<BalanceResponse>)> {
    auth.require_admin()?;
    let user_id = user_ref(&payload.user)?;
    let repo = repository(&state);

    let balance = match payload.months_worked {
        Some(months) => repo.create_prorated(user_id, payload.year, months).await?,
        None => repo.create_annual(user_id, payload.year).await?,
    };

    Ok((StatusCode::CREATED, Json(balance_response(balance))))
}

/// PUT `/leave_balances/{id}` - Only `carriedOverToNextYear` is applied (admin).
async fn update_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BalanceUpdate>,
) -> ApiResult<Json<UpdateBalanceResponse>> {
    auth.require_admin()?;

    let result = repository(&state).update(id, &payload).await?;
    Ok(Json(UpdateBalanceResponse {
        balance: balance_response(result.balance),
        next_year: result.next_year.map(balance_response),
        discarded_days: result.discarded_days,
    }))
}

/// POST `/leave_balances/carry_over` (admin)
async fn carry_over(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CarryOverRequest>,
) -> ApiResult<Json<CarryOverResponse>> {
    auth.require_admin()?;
    let user_id = user_ref(&payload.user)?;

    let result = repository(&state)
        .carry_over(user_id, payload.from_year, payload.days)
        .await?;
    Ok(Json(CarryOverResponse {
        from: balance_response(result.from),
        to: balance_response(result.to),
        discarded_days: result.discarded_days,
    }))
}

/// POST `/leave_balances/deduct` (admin)
async fn deduct(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<DeductRequest>,
) -> ApiResult<Json<DeductResponse>> {
    auth.require_admin()?;
    let user_id = user_ref(&payload.user)?;

    let (balance, deduction) = repository(&state)
        .deduct(user_id, payload.year, payload.days, payload.leave_type)
        .await?;
    Ok(Json(DeductResponse {
        balance: balance_response(balance),
        deduction,
    }))
}
