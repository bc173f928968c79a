//! Usage-snapshot intake. Best effort by contract: the client falls back to
//! a local download when this endpoint fails, so a failure here must never
//! take anything else down with it.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use services::services::usage::UsageSnapshot;
use tracing::warn;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub async fn log_usage(
    State(state): State<AppState>,
    axum::Json(snapshot): axum::Json<UsageSnapshot>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.usage.append(&snapshot).await.inspect_err(|e| {
        warn!("failed to persist usage snapshot: {e}");
    })?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/usage-log", post(log_usage))
}
