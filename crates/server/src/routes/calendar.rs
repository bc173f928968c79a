//! Calendar views over projected occurrences. Projection is recomputed per
//! request from a fresh schedule snapshot; nothing here is persisted.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use services::services::projector::{
    self, CalendarOccurrence,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Restrict to occurrences on this exact date.
    pub date: Option<NaiveDate>,
}

async fn project_for_user(
    state: &AppState,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<CalendarOccurrence>, ApiError> {
    let schedules = state.store.refresh_schedules(user_id).await?;
    Ok(projector::project_occurrences(
        &schedules,
        today,
        &state.projector,
    ))
}

pub async fn list_occurrences(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarOccurrence>>>, ApiError> {
    let today = Utc::now().date_naive();
    let occurrences = project_for_user(&state, user_id, today).await?;
    let result = match query.date {
        Some(date) => projector::occurrences_on(&occurrences, date),
        None => occurrences,
    };
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub async fn due_today(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarOccurrence>>>, ApiError> {
    let today = Utc::now().date_naive();
    let occurrences = project_for_user(&state, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(projector::due_today(
        &occurrences,
        today,
    ))))
}

pub async fn upcoming(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarOccurrence>>>, ApiError> {
    let today = Utc::now().date_naive();
    let occurrences = project_for_user(&state, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(projector::upcoming_week(
        &occurrences,
        today,
    ))))
}

pub async fn overdue(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarOccurrence>>>, ApiError> {
    let today = Utc::now().date_naive();
    let occurrences = project_for_user(&state, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(projector::overdue(
        &occurrences,
        today,
    ))))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/calendar",
        Router::new()
            .route("/", get(list_occurrences))
            .route("/due-today", get(due_today))
            .route("/upcoming", get(upcoming))
            .route("/overdue", get(overdue)),
    )
}
