use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::Utc;
use services::services::dashboard::DashboardData;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DashboardData>>, ApiError> {
    let today = Utc::now().date_naive();
    let data = state.dashboard.load(user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(data)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{user_id}/dashboard", get(get_dashboard))
}
