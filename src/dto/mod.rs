//! DTOs de la API HTTP

pub mod api_response;
pub mod auth_dto;
pub mod driver_dto;
pub mod issue_dto;
pub mod trip_log_dto;
pub mod vehicle_dto;
