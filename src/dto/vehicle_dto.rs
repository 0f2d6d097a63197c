use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NewVehicle, Vehicle};
use crate::utils::validation::{validate_license_plate, validate_not_blank};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub brand: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub model: String,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub vehicle_type: String,
}

impl CreateVehicleRequest {
    /// Matrícula en mayúsculas y sin espacios en los extremos
    pub fn normalized(mut self) -> Self {
        self.license_plate = normalize_plate(&self.license_plate);
        self
    }

    pub fn into_new_vehicle(self) -> NewVehicle {
        NewVehicle {
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            license_plate: self.license_plate,
            vehicle_type: self.vehicle_type.trim().to_string(),
        }
    }
}

// Request para actualizar un vehículo; `is_operational` no es editable
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    pub id: Option<i32>,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub brand: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub model: String,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub vehicle_type: String,
    pub version: i32,
}

impl UpdateVehicleRequest {
    pub fn normalized(mut self) -> Self {
        self.license_plate = normalize_plate(&self.license_plate);
        self
    }

    /// Aplica los campos editables sobre el vehículo almacenado
    pub fn apply_to(self, mut vehicle: Vehicle) -> Vehicle {
        vehicle.brand = self.brand.trim().to_string();
        vehicle.model = self.model.trim().to_string();
        vehicle.license_plate = self.license_plate;
        vehicle.vehicle_type = self.vehicle_type.trim().to_string();
        vehicle.version = self.version;
        vehicle
    }
}

fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

// Response de vehículo
#[derive(Debug, Clone, Serialize)]
pub struct VehicleResponse {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub is_operational: bool,
    pub vehicle_type: String,
    pub version: i32,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            brand: vehicle.brand,
            model: vehicle.model,
            license_plate: vehicle.license_plate,
            is_operational: vehicle.is_operational,
            vehicle_type: vehicle.vehicle_type,
            version: vehicle.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_is_normalized_before_validation() {
        let request = CreateVehicleRequest {
            brand: "Ford".to_string(),
            model: "Transit".to_string(),
            license_plate: "  wa 12345 ".to_string(),
            vehicle_type: "Van".to_string(),
        }
        .normalized();

        assert!(request.validate().is_ok());
        assert_eq!(request.into_new_vehicle().license_plate, "WA 12345");
    }

    #[test]
    fn test_blank_brand_is_rejected() {
        let request = CreateVehicleRequest {
            brand: " ".to_string(),
            model: "Transit".to_string(),
            license_plate: "WA 12345".to_string(),
            vehicle_type: "Van".to_string(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("brand"));
    }
}
