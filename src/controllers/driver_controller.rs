use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::database::{complete, FleetStore};
use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverResponse, UpdateDriverRequest};
use crate::models::Driver;
use crate::services::{DriverRemoval, ProvisioningService};
use crate::utils::errors::{bad_request_error, AppError};

pub struct DriverController {
    store: Arc<dyn FleetStore>,
    provisioning: ProvisioningService,
}

impl DriverController {
    pub fn new(store: Arc<dyn FleetStore>, provisioning: ProvisioningService) -> Self {
        Self {
            store,
            provisioning,
        }
    }

    /// Lista con el vehículo asignado de cada conductor
    pub async fn list(&self) -> Result<Vec<DriverResponse>, AppError> {
        let mut uow = self.store.begin().await?;
        let drivers = uow.list_drivers().await;
        let vehicles = uow.list_vehicles().await;
        let (drivers, vehicles) = complete(uow, drivers.and_then(|d| vehicles.map(|v| (d, v)))).await?;

        let vehicles: HashMap<i32, _> = vehicles.into_iter().map(|v| (v.id, v)).collect();
        let response = drivers
            .into_iter()
            .map(|driver| {
                let vehicle = driver
                    .assigned_vehicle_id
                    .and_then(|id| vehicles.get(&id).cloned());
                DriverResponse::with_vehicle(driver, vehicle)
            })
            .collect();

        Ok(response)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<DriverResponse, AppError> {
        let driver = self.provisioning.get_driver(id).await?;
        self.with_vehicle(driver).await
    }

    /// Perfil de conductor de la cuenta autenticada
    pub async fn me(&self, account_id: i32) -> Result<DriverResponse, AppError> {
        let driver = self
            .provisioning
            .driver_for_account(account_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(
                    "The logged-in account has no driver profile".to_string(),
                ),
                other => other,
            })?;
        self.with_vehicle(driver).await
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        request.validate()?;

        let (profile, credentials) = request.into_parts();
        let driver = self
            .provisioning
            .create_driver_with_account(profile, &credentials)
            .await?;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(driver),
            "Driver and login account created",
        ))
    }

    pub async fn update(
        &self,
        id: i32,
        request: UpdateDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        if request.id.is_some_and(|body_id| body_id != id) {
            return Err(bad_request_error("Driver id in the path and body do not match"));
        }
        request.validate()?;

        let current = self.provisioning.get_driver(id).await?;
        let driver = self.provisioning.update_driver(request.apply_to(current)).await?;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(driver),
            "Driver updated",
        ))
    }

    pub async fn delete(&self, id: i32) -> Result<ApiResponse<DriverRemoval>, AppError> {
        let removal = self.provisioning.delete_driver(id).await?;
        Ok(ApiResponse::success_with_message(
            removal,
            "Driver and login account deleted",
        ))
    }

    async fn with_vehicle(&self, driver: Driver) -> Result<DriverResponse, AppError> {
        let Some(vehicle_id) = driver.assigned_vehicle_id else {
            return Ok(DriverResponse::from(driver));
        };

        let mut uow = self.store.begin().await?;
        let result = uow.find_vehicle(vehicle_id).await;
        let vehicle = complete(uow, result).await?;

        Ok(DriverResponse::with_vehicle(driver, vehicle))
    }
}
