//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean
//! al schema PostgreSQL de la flota.

pub mod account;
pub mod driver;
pub mod issue;
pub mod trip_log;
pub mod vehicle;

pub use account::{Account, Role};
pub use driver::{Driver, NewDriver, DEFAULT_DRIVER_STATUS};
pub use issue::{Issue, IssueDetails, IssuePriority, IssueStatus, NewIssue};
pub use trip_log::{NewTripLog, TripLog};
pub use vehicle::{NewVehicle, Vehicle};
