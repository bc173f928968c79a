use axum::{Router, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::state::AppState;

pub mod calendar;
pub mod dashboard;
pub mod logs;
pub mod plants;
pub mod schedules;
pub mod usage;

async fn health() -> ResponseJson<ApiResponse<&'static str>> {
    ResponseJson(ApiResponse::success("OK"))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/health", get(health))
            .merge(plants::router())
            .merge(schedules::router())
            .merge(logs::router())
            .merge(calendar::router())
            .merge(dashboard::router())
            .merge(usage::router()),
    )
}
