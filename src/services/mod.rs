//! Services module
//!
//! Lógica de negocio: coordinación de cuentas y conductores, máquina de
//! estados de incidencias, estado operativo de vehículos y políticas de acceso.

pub mod access_policy;
pub mod account_service;
pub mod issue_service;
pub mod navigation;
pub mod provisioning_service;
pub mod vehicle_tracker;

pub use access_policy::{derive_roles, is_authorized, RoleSet};
pub use account_service::{AccountDraft, AccountService, Credentials};
pub use issue_service::{IssueService, StatusChange};
pub use provisioning_service::{DriverProfile, DriverRemoval, ProvisioningService};
pub use vehicle_tracker::{VehicleEffect, VehicleOperationalTracker};
