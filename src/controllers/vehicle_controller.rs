use std::sync::Arc;

use validator::Validate;

use crate::database::{complete, FleetStore};
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::utils::errors::{bad_request_error, not_found_error, AppError};

pub struct VehicleController {
    store: Arc<dyn FleetStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let request = request.normalized();
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let result = uow.insert_vehicle(request.into_new_vehicle()).await;
        let vehicle = complete(uow, result).await?;

        tracing::info!("🚚 Vehículo {} creado ({})", vehicle.id, vehicle.license_plate);
        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle created",
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<VehicleResponse, AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.find_vehicle(id).await;
        let vehicle = complete(uow, result)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self) -> Result<Vec<VehicleResponse>, AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_vehicles().await;
        let vehicles = complete(uow, result).await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn update(
        &self,
        id: i32,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        if request.id.is_some_and(|body_id| body_id != id) {
            return Err(bad_request_error("Vehicle id in the path and body do not match"));
        }
        let request = request.normalized();
        request.validate()?;

        let mut uow = self.store.begin().await?;
        let result = match uow.lock_vehicle(id).await {
            Ok(Some(vehicle)) => uow.update_vehicle(&request.apply_to(vehicle)).await,
            Ok(None) => Err(not_found_error("Vehicle", id)),
            Err(e) => Err(e),
        };
        let vehicle = complete(uow, result).await?;

        tracing::info!("🚚 Vehículo {} actualizado (versión {})", vehicle.id, vehicle.version);
        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle updated",
        ))
    }

    /// Borra el vehículo con sus incidencias y registros; desasigna a sus conductores
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;
        let result = uow.delete_vehicle(id).await;
        if !complete(uow, result).await? {
            return Err(not_found_error("Vehicle", id));
        }

        tracing::info!("🚚 Vehículo {} eliminado", id);
        Ok(())
    }
}
