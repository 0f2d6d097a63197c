use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::controllers::trip_log_controller::TripLogController;
use crate::dto::api_response::ApiResponse;
use crate::dto::trip_log_dto::{CreateTripLogRequest, TripLogResponse, UpdateTripLogRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_log_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_logs).post(create_log))
        .route("/:id", get(get_log).put(update_log).delete(delete_log))
}

async fn create_log(
    State(state): State<AppState>,
    Json(request): Json<CreateTripLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TripLogResponse>>), AppError> {
    let controller = TripLogController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TripLogResponse>, AppError> {
    let controller = TripLogController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<TripLogResponse>>, AppError> {
    let controller = TripLogController::new(state.store.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTripLogRequest>,
) -> Result<Json<ApiResponse<TripLogResponse>>, AppError> {
    let controller = TripLogController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let controller = TripLogController::new(state.store.clone());
    controller.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
