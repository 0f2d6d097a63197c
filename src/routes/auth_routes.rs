use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::controllers::auth_controller::AuthController;
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación (públicas)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.store.clone(), state.accounts.clone(), state.jwt.clone())
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = controller(&state).login(request).await?;
    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), AppError> {
    let response = controller(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
