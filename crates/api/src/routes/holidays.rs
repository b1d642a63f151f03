//! Public holiday routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::hydra::{Collection, Item};
use crate::{AppState, middleware::AuthUser};
use leavedesk_db::HolidayRepository;
use leavedesk_db::entities::holidays;

/// Creates the holiday routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/holidays", get(list_holidays).post(create_holiday))
        .route("/holidays/{id}", delete(delete_holiday))
}

/// Query for listing holidays.
#[derive(Debug, Default, Deserialize)]
pub struct HolidayQuery {
    /// Only this calendar year.
    pub year: Option<i32>,
}

/// Request body for a new holiday.
#[derive(Debug, Deserialize)]
pub struct CreateHolidayRequest {
    /// Display name.
    pub name: String,
    /// The day off.
    pub date: NaiveDate,
}

/// Holiday fields as served.
#[derive(Debug, Serialize)]
pub struct HolidayBody {
    /// Holiday ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The day off.
    pub date: NaiveDate,
}

fn holiday_response(holiday: holidays::Model) -> Item<HolidayBody> {
    Item::new(
        "Holiday",
        "holidays",
        holiday.id,
        HolidayBody {
            id: holiday.id,
            name: holiday.name,
            date: holiday.date,
        },
    )
}

/// GET `/holidays` - Any authenticated user.
async fn list_holidays(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<HolidayQuery>,
) -> ApiResult<Json<Collection<Item<HolidayBody>>>> {
    let holidays = HolidayRepository::new((*state.db).clone())
        .list(query.year)
        .await?;
    let total = holidays.len() as u64;
    let members = holidays.into_iter().map(holiday_response).collect();
    Ok(Json(Collection::new("Holiday", "holidays", members, total)))
}

/// POST `/holidays` (admin)
async fn create_holiday(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateHolidayRequest>,
) -> ApiResult<(StatusCode, Json<Item<HolidayBody>>)> {
    auth.require_admin()?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("holiday name must not be empty"));
    }

    let holiday = HolidayRepository::new((*state.db).clone())
        .create(&payload.name, payload.date)
        .await?;

    info!(holiday_id = %holiday.id, date = %holiday.date, "holiday created");
    Ok((StatusCode::CREATED, Json(holiday_response(holiday))))
}

/// DELETE `/holidays/{id}` (admin)
async fn delete_holiday(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    HolidayRepository::new((*state.db).clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
