//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y su variante de inserción.
//! Mapea exactamente a la tabla `vehicles` con primary key numérica.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Vehicle principal - mapea a la tabla vehicles
///
/// `is_operational` es un campo derivado: solo lo escribe el tracker de
/// estado operativo como consecuencia de las transiciones de incidencias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub is_operational: bool,
    pub vehicle_type: String,
    pub version: i32,
}

/// Datos para insertar un vehículo nuevo (siempre nace operativo)
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub vehicle_type: String,
}

impl NewVehicle {
    pub fn into_vehicle(self, id: i32) -> Vehicle {
        Vehicle {
            id,
            brand: self.brand,
            model: self.model,
            license_plate: self.license_plate,
            is_operational: true,
            vehicle_type: self.vehicle_type,
            version: 1,
        }
    }
}
