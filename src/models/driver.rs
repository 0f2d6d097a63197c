//! Modelo de Driver
//!
//! Un conductor está ligado 1:1 a una cuenta de acceso (`account_id`).
//! El enlace solo puede faltar de forma transitoria durante el aprovisionamiento.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Estado por defecto de un conductor recién creado
pub const DEFAULT_DRIVER_STATUS: &str = "Available";

/// Driver principal - mapea a la tabla drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub status: String,
    pub assigned_vehicle_id: Option<i32>,
    pub account_id: Option<i32>,
    pub version: i32,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Datos para insertar un conductor nuevo
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub status: String,
    pub assigned_vehicle_id: Option<i32>,
    pub account_id: Option<i32>,
}

impl NewDriver {
    pub fn into_driver(self, id: i32) -> Driver {
        Driver {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            license_number: self.license_number,
            status: self.status,
            assigned_vehicle_id: self.assigned_vehicle_id,
            account_id: self.account_id,
            version: 1,
        }
    }
}
