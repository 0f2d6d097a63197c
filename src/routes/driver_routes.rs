use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverResponse, UpdateDriverRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::Role;
use crate::services::DriverRemoval;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/me", get(get_my_profile))
        .route(
            "/:id",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
}

fn controller(state: &AppState) -> DriverController {
    DriverController::new(state.store.clone(), state.provisioning.clone())
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).list().await?;
    Ok(Json(response))
}

async fn get_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<DriverResponse>, AppError> {
    let response = controller(&state).me(user.account_id).await?;
    Ok(Json(response))
}

async fn get_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<DriverResponse>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DriverResponse>>), AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DriverRemoval>>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}
