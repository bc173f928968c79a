//! Care-history reads. Logs are written by completion only, never here.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::care_log::CareLogWithPlant;
use serde::Deserialize;
use services::services::store::DEFAULT_RECENT_LOGS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<i32>,
}

pub async fn list_recent_logs(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<LogsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<CareLogWithPlant>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LOGS).max(1);
    let logs = state.store.refresh_logs(user_id, limit).await?;
    Ok(ResponseJson(ApiResponse::success(logs)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{user_id}/logs", get(list_recent_logs))
}
