use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};

use crate::controllers::issue_controller::IssueController;
use crate::dto::api_response::ApiResponse;
use crate::dto::issue_dto::{IssueResponse, ReportIssueRequest, UpdateIssueStatusRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::Role;
use crate::services::StatusChange;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_issue_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_issues).post(report_issue))
        .route("/:id/status", patch(update_issue_status))
}

fn controller(state: &AppState) -> IssueController {
    IssueController::new(state.issues.clone(), state.provisioning.clone())
}

async fn list_issues(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<IssueResponse>>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).list().await?;
    Ok(Json(response))
}

async fn report_issue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ReportIssueRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IssueResponse>>), AppError> {
    user.require(&[Role::Driver, Role::Admin])?;
    let response = controller(&state).report(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_issue_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateIssueStatusRequest>,
) -> Result<Json<ApiResponse<StatusChange>>, AppError> {
    user.require(&[Role::Admin])?;
    let response = controller(&state).update_status(id, request).await?;
    Ok(Json(response))
}
