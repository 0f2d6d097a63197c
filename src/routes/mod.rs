//! Router HTTP
//!
//! `/api/auth` y `/health` son públicas; el resto pasa por el middleware JWT
//! y cada handler comprueba los roles que necesita.

pub mod auth_routes;
pub mod driver_routes;
pub mod issue_routes;
pub mod trip_log_routes;
pub mod vehicle_routes;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_layer};
use crate::state::AppState;

/// Construye el router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/issues", issue_routes::create_issue_router())
        .nest("/logs", trip_log_routes::create_trip_log_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes::auth_routes())
        .merge(protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fleet_master",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
