use std::sync::Arc;

use validator::Validate;

use crate::database::{complete, FleetStore};
use crate::dto::api_response::ApiResponse;
use crate::dto::trip_log_dto::{CreateTripLogRequest, TripLogResponse, UpdateTripLogRequest};
use crate::utils::errors::{bad_request_error, not_found_error, AppError};

pub struct TripLogController {
    store: Arc<dyn FleetStore>,
}

impl TripLogController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateTripLogRequest,
    ) -> Result<ApiResponse<TripLogResponse>, AppError> {
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let result = uow.insert_log(request.into_new_log()).await;
        let log = complete(uow, result).await?;

        tracing::info!("📒 Registro {} creado: {} -> {}", log.id, log.route_from, log.route_to);
        Ok(ApiResponse::success_with_message(
            TripLogResponse::from(log),
            "Log created",
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<TripLogResponse, AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.find_log(id).await;
        let log = complete(uow, result)
            .await?
            .ok_or_else(|| not_found_error("Log", id))?;

        Ok(TripLogResponse::from(log))
    }

    pub async fn list(&self) -> Result<Vec<TripLogResponse>, AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_logs().await;
        let logs = complete(uow, result).await?;

        Ok(logs.into_iter().map(TripLogResponse::from).collect())
    }

    pub async fn update(
        &self,
        id: i32,
        request: UpdateTripLogRequest,
    ) -> Result<ApiResponse<TripLogResponse>, AppError> {
        if request.id.is_some_and(|body_id| body_id != id) {
            return Err(bad_request_error("Log id in the path and body do not match"));
        }
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let result = uow.update_log(&request.into_log(id)).await;
        let log = complete(uow, result).await?;

        Ok(ApiResponse::success_with_message(
            TripLogResponse::from(log),
            "Log updated",
        ))
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.delete_log(id).await;
        if !complete(uow, result).await? {
            return Err(not_found_error("Log", id));
        }
        Ok(())
    }
}
