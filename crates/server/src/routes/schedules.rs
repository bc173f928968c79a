//! Care-schedule CRUD and task completion.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use db::models::{
    care_schedule::{CareSchedule, CareScheduleWithPlant, CreateCareSchedule, UpdateCareSchedule},
    plant::Plant,
};
use serde::{Deserialize, Serialize};
use services::services::completion::{CompletionError, CompletionOutcome};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompleteTaskRequest {
    /// The projected occurrence date being satisfied. The new due date is
    /// one frequency step after this, not after the completion time.
    pub occurrence_date: NaiveDate,
}

/// Resolves the schedule and checks it belongs to one of `user_id`'s plants.
async fn find_owned_schedule(
    state: &AppState,
    user_id: Uuid,
    schedule_id: Uuid,
) -> Result<CareSchedule, ApiError> {
    let schedule = CareSchedule::find_by_id(&state.db.pool, schedule_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("schedule {schedule_id} not found")))?;
    Plant::find_by_id_for_user(&state.db.pool, schedule.plant_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("schedule {schedule_id} not found")))?;
    Ok(schedule)
}

pub async fn list_schedules(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CareScheduleWithPlant>>>, ApiError> {
    let schedules = state.store.refresh_schedules(user_id).await?;
    Ok(ResponseJson(ApiResponse::success(schedules)))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateCareSchedule>,
) -> Result<ResponseJson<ApiResponse<CareScheduleWithPlant>>, ApiError> {
    let schedule = state.completion.create_schedule(user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Path((user_id, schedule_id)): Path<(Uuid, Uuid)>,
    axum::Json(payload): axum::Json<UpdateCareSchedule>,
) -> Result<ResponseJson<ApiResponse<CareSchedule>>, ApiError> {
    if let Some(frequency) = payload.frequency_days
        && frequency < 1
    {
        return Err(ApiError::Validation(format!(
            "frequency must be at least one day, got {frequency}"
        )));
    }

    find_owned_schedule(&state, user_id, schedule_id).await?;
    let schedule = CareSchedule::update(&state.db.pool, schedule_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("schedule {schedule_id} not found")))?;
    state.store.update_schedule(user_id, schedule.clone());
    Ok(ResponseJson(ApiResponse::success(schedule)))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Path((user_id, schedule_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    find_owned_schedule(&state, user_id, schedule_id).await?;
    CareSchedule::delete(&state.db.pool, schedule_id).await?;
    state.store.remove_schedule(user_id, schedule_id);
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Marks one occurrence done. When the schedule is missing from the cache
/// (cold start, another session's write) the store is refreshed and the
/// completion retried once before giving up.
pub async fn complete_task(
    State(state): State<AppState>,
    Path((user_id, schedule_id)): Path<(Uuid, Uuid)>,
    axum::Json(payload): axum::Json<CompleteTaskRequest>,
) -> Result<ResponseJson<ApiResponse<CompletionOutcome>>, ApiError> {
    let outcome = match state
        .completion
        .complete_task(user_id, schedule_id, payload.occurrence_date)
        .await
    {
        Err(CompletionError::ScheduleNotFound(_)) => {
            state.store.refresh_schedules(user_id).await?;
            state
                .completion
                .complete_task(user_id, schedule_id, payload.occurrence_date)
                .await?
        }
        other => other?,
    };
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/schedules",
        Router::new()
            .route("/", get(list_schedules).post(create_schedule))
            .route("/{schedule_id}", put(update_schedule).delete(delete_schedule))
            .route("/{schedule_id}/complete", post(complete_task)),
    )
}
