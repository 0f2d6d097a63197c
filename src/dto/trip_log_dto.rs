use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NewTripLog, TripLog};
use crate::utils::validation::{validate_distance, validate_not_blank};

// Request para crear un registro de viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripLogRequest {
    pub date: DateTime<Utc>,
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub route_from: String,
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub route_to: String,
    #[validate(custom = "validate_distance")]
    pub distance_km: Decimal,
    #[validate(range(min = 0, message = "duration must not be negative"))]
    pub duration_minutes: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
}

impl CreateTripLogRequest {
    pub fn into_new_log(self) -> NewTripLog {
        NewTripLog {
            date: self.date,
            route_from: self.route_from.trim().to_string(),
            route_to: self.route_to.trim().to_string(),
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
        }
    }
}

// Request para actualizar un registro de viaje
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTripLogRequest {
    pub id: Option<i32>,
    pub date: DateTime<Utc>,
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub route_from: String,
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub route_to: String,
    #[validate(custom = "validate_distance")]
    pub distance_km: Decimal,
    #[validate(range(min = 0, message = "duration must not be negative"))]
    pub duration_minutes: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
    pub version: i32,
}

impl UpdateTripLogRequest {
    pub fn into_log(self, id: i32) -> TripLog {
        TripLog {
            id,
            date: self.date,
            route_from: self.route_from.trim().to_string(),
            route_to: self.route_to.trim().to_string(),
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            version: self.version,
        }
    }
}

// Response de registro de viaje
#[derive(Debug, Clone, Serialize)]
pub struct TripLogResponse {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub route_from: String,
    pub route_to: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    pub duration_minutes: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
    pub version: i32,
}

impl From<TripLog> for TripLogResponse {
    fn from(log: TripLog) -> Self {
        Self {
            id: log.id,
            date: log.date,
            route_from: log.route_from,
            route_to: log.route_to,
            distance_km: log.distance_km,
            duration_minutes: log.duration_minutes,
            driver_id: log.driver_id,
            vehicle_id: log.vehicle_id,
            version: log.version,
        }
    }
}
