//! Controladores: traducen DTOs a llamadas de servicio y de vuelta

pub mod auth_controller;
pub mod driver_controller;
pub mod issue_controller;
pub mod trip_log_controller;
pub mod vehicle_controller;
