//! Plant inventory CRUD. Writes hit the database first; the per-user cache
//! is updated only after the write is confirmed.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::plant::{CreatePlant, Plant, UpdatePlant};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

fn validate_health_score(score: Option<i32>) -> Result<(), ApiError> {
    if let Some(score) = score
        && !(0..=100).contains(&score)
    {
        return Err(ApiError::Validation(format!(
            "health score must be between 0 and 100, got {score}"
        )));
    }
    Ok(())
}

pub async fn list_plants(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Plant>>>, ApiError> {
    let plants = state.store.refresh_plants(user_id).await?;
    Ok(ResponseJson(ApiResponse::success(plants)))
}

pub async fn create_plant(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreatePlant>,
) -> Result<ResponseJson<ApiResponse<Plant>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("plant name must not be empty".to_string()));
    }
    validate_health_score(payload.health_score)?;

    let plant = Plant::create(&state.db.pool, user_id, &payload).await?;
    state.store.add_plant(user_id, plant.clone());
    Ok(ResponseJson(ApiResponse::success(plant)))
}

pub async fn update_plant(
    State(state): State<AppState>,
    Path((user_id, plant_id)): Path<(Uuid, Uuid)>,
    axum::Json(payload): axum::Json<UpdatePlant>,
) -> Result<ResponseJson<ApiResponse<Plant>>, ApiError> {
    validate_health_score(payload.health_score)?;

    let plant = Plant::update(&state.db.pool, plant_id, user_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("plant {plant_id} not found")))?;
    state.store.update_plant(user_id, plant.clone());
    Ok(ResponseJson(ApiResponse::success(plant)))
}

/// Deletes a plant; its schedules and logs cascade away with it.
pub async fn delete_plant(
    State(state): State<AppState>,
    Path((user_id, plant_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Plant::delete(&state.db.pool, plant_id, user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("plant {plant_id} not found")));
    }
    state.store.remove_plant(user_id, plant_id);
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/plants",
        Router::new()
            .route("/", get(list_plants).post(create_plant))
            .route("/{plant_id}", put(update_plant).delete(delete_plant)),
    )
}
