//! Repositorios PostgreSQL
//!
//! Cada repositorio trabaja sobre una conexión prestada (normalmente la de
//! una transacción abierta), nunca sobre el pool directamente.

pub mod account_repository;
pub mod driver_repository;
pub mod issue_repository;
pub mod trip_log_repository;
pub mod vehicle_repository;

pub use account_repository::AccountRepository;
pub use driver_repository::DriverRepository;
pub use issue_repository::IssueRepository;
pub use trip_log_repository::TripLogRepository;
pub use vehicle_repository::VehicleRepository;

use crate::utils::errors::{AppError, ValidationFailure};

/// Traduce errores de PostgreSQL a errores del dominio
pub(crate) fn map_db_error(e: sqlx::Error, context: &str) -> AppError {
    if let Some(db) = e.as_database_error() {
        let constraint = db.constraint().unwrap_or_default().to_string();
        match db.code().as_deref() {
            // unique_violation
            Some("23505") => {
                let (code, description) = match constraint.as_str() {
                    "accounts_username_key" => ("DuplicateUserName", "Username is already taken"),
                    "drivers_license_number_key" => {
                        ("DuplicateLicenseNumber", "Duplicate license number")
                    }
                    "drivers_account_id_key" => {
                        ("DuplicateAccountLink", "Account is already linked to a driver")
                    }
                    "vehicles_license_plate_key" => {
                        ("DuplicateLicensePlate", "Duplicate license plate")
                    }
                    _ => ("Duplicate", "Duplicate value"),
                };
                return AppError::Validation(ValidationFailure::single(code, description));
            }
            // foreign_key_violation
            Some("23503") => {
                let entity = if constraint.contains("vehicle") {
                    "Vehicle"
                } else if constraint.contains("driver") {
                    "Driver"
                } else {
                    "Referenced record"
                };
                return AppError::NotFound(format!("{} does not exist", entity));
            }
            // serialization_failure / deadlock_detected
            Some("40001") | Some("40P01") => {
                return AppError::Conflict(format!("{}: concurrent update detected", context));
            }
            _ => {}
        }
    }

    tracing::error!("❌ {}: {}", context, e);
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../migrations/20260115000000_initial_schema.sql");

    #[test]
    fn test_username_uniqueness_ignores_case() {
        assert!(SCHEMA.contains("CREATE UNIQUE INDEX accounts_username_key ON accounts (lower(username));"));
        assert!(!SCHEMA.contains("UNIQUE (username)"));
    }

    #[test]
    fn test_mapped_unique_names_exist_in_schema() {
        for name in [
            "accounts_username_key",
            "drivers_license_number_key",
            "drivers_account_id_key",
            "vehicles_license_plate_key",
        ] {
            assert!(SCHEMA.contains(name), "{} missing from schema", name);
        }
    }
}
