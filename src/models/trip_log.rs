//! Modelo de TripLog (registro de viaje)
//!
//! Sin efectos laterales sobre otras entidades.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// TripLog principal - mapea a la tabla trip_logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TripLog {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub route_from: String,
    pub route_to: String,
    pub distance_km: Decimal,
    pub duration_minutes: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
    pub version: i32,
}

/// Datos para insertar un registro de viaje
#[derive(Debug, Clone)]
pub struct NewTripLog {
    pub date: DateTime<Utc>,
    pub route_from: String,
    pub route_to: String,
    pub distance_km: Decimal,
    pub duration_minutes: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
}

impl NewTripLog {
    pub fn into_log(self, id: i32) -> TripLog {
        TripLog {
            id,
            date: self.date,
            route_from: self.route_from,
            route_to: self.route_to,
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            version: 1,
        }
    }
}
