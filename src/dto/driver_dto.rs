use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::vehicle_dto::VehicleResponse;
use crate::models::{Driver, Vehicle};
use crate::services::{Credentials, DriverProfile};
use crate::utils::validation::{validate_license_number, validate_not_blank};

// Request para crear un conductor junto con su cuenta de acceso.
// `email` y `password` los valida el sistema de cuentas.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub last_name: String,
    #[validate(custom = "validate_license_number")]
    pub license_number: String,
    pub assigned_vehicle_id: Option<i32>,
    pub email: String,
    pub password: String,
}

impl CreateDriverRequest {
    pub fn into_parts(self) -> (DriverProfile, Credentials) {
        let profile = DriverProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            license_number: self.license_number,
            assigned_vehicle_id: self.assigned_vehicle_id,
        };
        (profile, Credentials::new(self.email.trim(), self.password))
    }
}

// Request para actualizar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    pub id: Option<i32>,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub last_name: String,
    #[validate(custom = "validate_license_number")]
    pub license_number: String,
    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub status: String,
    pub assigned_vehicle_id: Option<i32>,
    pub version: i32,
}

impl UpdateDriverRequest {
    pub fn apply_to(self, mut driver: Driver) -> Driver {
        driver.first_name = self.first_name.trim().to_string();
        driver.last_name = self.last_name.trim().to_string();
        driver.license_number = self.license_number;
        driver.status = self.status.trim().to_string();
        driver.assigned_vehicle_id = self.assigned_vehicle_id;
        driver.version = self.version;
        driver
    }
}

// Response de conductor
#[derive(Debug, Clone, Serialize)]
pub struct DriverResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub license_number: String,
    pub status: String,
    pub assigned_vehicle_id: Option<i32>,
    pub assigned_vehicle: Option<VehicleResponse>,
    pub account_id: Option<i32>,
    pub version: i32,
}

impl DriverResponse {
    pub fn with_vehicle(driver: Driver, vehicle: Option<Vehicle>) -> Self {
        Self {
            full_name: driver.full_name(),
            id: driver.id,
            first_name: driver.first_name,
            last_name: driver.last_name,
            license_number: driver.license_number,
            status: driver.status,
            assigned_vehicle_id: driver.assigned_vehicle_id,
            assigned_vehicle: vehicle.map(VehicleResponse::from),
            account_id: driver.account_id,
            version: driver.version,
        }
    }
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self::with_vehicle(driver, None)
    }
}
