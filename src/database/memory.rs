//! Almacén en memoria
//!
//! Implementa las mismas garantías que la versión PostgreSQL: cada unidad de
//! trabajo toma el candado global del almacén (las unidades quedan
//! serializadas), trabaja sobre una copia y solo la publica en `commit`.
//! Replica también las restricciones de unicidad, claves foráneas y cascadas
//! del esquema SQL.
//!
//! Se usa en desarrollo sin `DATABASE_URL` y en los tests. Solo los tests de
//! la crate pueden inyectar fallos en puntos concretos (`inject_fault`).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::unit_of_work::{FleetStore, UnitOfWork};
use crate::models::{
    Account, Driver, Issue, IssueDetails, IssueStatus, NewDriver, NewIssue, NewTripLog, NewVehicle,
    Role, TripLog, Vehicle,
};
use crate::utils::errors::{
    conflict_error, not_found_error, AppError, AppResult, ValidationFailure,
};

/// Punto de una unidad de trabajo donde se puede inyectar un fallo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    InsertAccount,
    DeleteAccount,
    InsertDriver,
    DeleteDriver,
    UpdateIssueStatus,
    SetVehicleOperational,
    Commit,
}

/// Fallo inyectado: rechazo con motivos (como el sistema de cuentas) o caída genérica
#[derive(Debug, Clone)]
pub enum Fault {
    Rejected(ValidationFailure),
    Crash(String),
}

impl Fault {
    fn into_error(self) -> AppError {
        match self {
            Fault::Rejected(failure) => AppError::Validation(failure),
            Fault::Crash(msg) => AppError::Internal(msg),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FleetData {
    accounts: BTreeMap<i32, Account>,
    roles: BTreeMap<i32, BTreeSet<Role>>,
    vehicles: BTreeMap<i32, Vehicle>,
    drivers: BTreeMap<i32, Driver>,
    issues: BTreeMap<i32, Issue>,
    logs: BTreeMap<i32, TripLog>,
    last_ids: HashMap<&'static str, i32>,
    last_issue_at: Option<DateTime<Utc>>,
}

impl FleetData {
    fn next_id(&mut self, table: &'static str) -> i32 {
        let id = self.last_ids.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    /// Fecha de creación estrictamente creciente
    fn next_issue_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_issue_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_issue_at = Some(at);
        at
    }

    fn require_vehicle(&self, id: i32) -> AppResult<()> {
        if self.vehicles.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Vehicle does not exist".to_string()))
        }
    }

    fn require_driver(&self, id: i32) -> AppResult<()> {
        if self.drivers.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Driver does not exist".to_string()))
        }
    }

    fn check_driver_unique(&self, license_number: &str, account_id: Option<i32>, except: Option<i32>) -> AppResult<()> {
        let others = self.drivers.values().filter(|d| Some(d.id) != except);
        for other in others {
            if other.license_number == license_number {
                return Err(AppError::Validation(ValidationFailure::single(
                    "DuplicateLicenseNumber",
                    "Duplicate license number",
                )));
            }
            if account_id.is_some() && other.account_id == account_id {
                return Err(AppError::Validation(ValidationFailure::single(
                    "DuplicateAccountLink",
                    "Account is already linked to a driver",
                )));
            }
        }
        Ok(())
    }

    fn check_plate_unique(&self, license_plate: &str, except: Option<i32>) -> AppResult<()> {
        let taken = self
            .vehicles
            .values()
            .any(|v| Some(v.id) != except && v.license_plate == license_plate);
        if taken {
            return Err(AppError::Validation(ValidationFailure::single(
                "DuplicateLicensePlate",
                "Duplicate license plate",
            )));
        }
        Ok(())
    }

    fn remove_driver_cascade(&mut self, id: i32) -> bool {
        if self.drivers.remove(&id).is_none() {
            return false;
        }
        self.issues.retain(|_, i| i.driver_id != Some(id));
        self.logs.retain(|_, l| l.driver_id != id);
        true
    }
}

/// Almacén en memoria compartible entre peticiones
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<FleetData>>,
    faults: Arc<std::sync::Mutex<HashMap<FaultPoint, Fault>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// El próximo paso por `point` fallará con `fault` (una sola vez)
    #[cfg(test)]
    pub(crate) fn inject_fault(&self, point: FaultPoint, fault: Fault) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(point, fault);
        }
    }

    /// Inserta una incidencia sin comprobar que su vehículo existe
    #[cfg(test)]
    pub(crate) async fn insert_orphan_issue(&self, issue: NewIssue) -> Issue {
        let mut data = self.data.lock().await;
        let id = data.next_id("issues");
        let created_at = data.next_issue_timestamp();
        let issue = issue.into_issue(id, created_at);
        data.issues.insert(id, issue.clone());
        issue
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            faults: self.faults.clone(),
        }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<FleetData>,
    working: FleetData,
    faults: Arc<std::sync::Mutex<HashMap<FaultPoint, Fault>>>,
}

impl MemoryUnitOfWork {
    fn trip(&self, point: FaultPoint) -> AppResult<()> {
        let fault = self
            .faults
            .lock()
            .map_err(|_| AppError::Internal("fault registry poisoned".to_string()))?
            .remove(&point);

        match fault {
            Some(fault) => Err(fault.into_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert_account(&mut self, username: &str, password_hash: &str) -> AppResult<Account> {
        self.trip(FaultPoint::InsertAccount)?;

        let taken = self
            .working
            .accounts
            .values()
            .any(|a| a.username.eq_ignore_ascii_case(username));
        if taken {
            return Err(AppError::Validation(ValidationFailure::single(
                "DuplicateUserName",
                format!("Username '{}' is already taken", username),
            )));
        }

        let id = self.working.next_id("accounts");
        let account = Account {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.working.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find_account(&mut self, id: i32) -> AppResult<Option<Account>> {
        Ok(self.working.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(&mut self, username: &str) -> AppResult<Option<Account>> {
        Ok(self
            .working
            .accounts
            .values()
            .find(|a| a.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn add_account_role(&mut self, account_id: i32, role: Role) -> AppResult<()> {
        if !self.working.accounts.contains_key(&account_id) {
            return Err(not_found_error("Account", account_id));
        }
        self.working.roles.entry(account_id).or_default().insert(role);
        Ok(())
    }

    async fn account_roles(&mut self, account_id: i32) -> AppResult<Vec<Role>> {
        Ok(self
            .working
            .roles
            .get(&account_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn delete_account(&mut self, account_id: i32) -> AppResult<bool> {
        self.trip(FaultPoint::DeleteAccount)?;

        if self.working.accounts.remove(&account_id).is_none() {
            return Ok(false);
        }
        self.working.roles.remove(&account_id);

        let linked: Vec<i32> = self
            .working
            .drivers
            .values()
            .filter(|d| d.account_id == Some(account_id))
            .map(|d| d.id)
            .collect();
        for driver_id in linked {
            self.working.remove_driver_cascade(driver_id);
        }
        Ok(true)
    }

    async fn list_vehicles(&mut self) -> AppResult<Vec<Vehicle>> {
        Ok(self.working.vehicles.values().cloned().collect())
    }

    async fn find_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(self.working.vehicles.get(&id).cloned())
    }

    async fn lock_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        self.find_vehicle(id).await
    }

    async fn insert_vehicle(&mut self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        self.working.check_plate_unique(&vehicle.license_plate, None)?;

        let id = self.working.next_id("vehicles");
        let vehicle = vehicle.into_vehicle(id);
        self.working.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        self.working.check_plate_unique(&vehicle.license_plate, Some(vehicle.id))?;

        let stored = self
            .working
            .vehicles
            .get_mut(&vehicle.id)
            .ok_or_else(|| not_found_error("Vehicle", vehicle.id))?;
        if stored.version != vehicle.version {
            return Err(conflict_error("Vehicle", vehicle.id));
        }

        stored.brand = vehicle.brand.clone();
        stored.model = vehicle.model.clone();
        stored.license_plate = vehicle.license_plate.clone();
        stored.vehicle_type = vehicle.vehicle_type.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn set_vehicle_operational(&mut self, id: i32, operational: bool) -> AppResult<()> {
        self.trip(FaultPoint::SetVehicleOperational)?;

        if let Some(vehicle) = self.working.vehicles.get_mut(&id) {
            vehicle.is_operational = operational;
        }
        Ok(())
    }

    async fn delete_vehicle(&mut self, id: i32) -> AppResult<bool> {
        if self.working.vehicles.remove(&id).is_none() {
            return Ok(false);
        }

        self.working.issues.retain(|_, i| i.vehicle_id != id);
        self.working.logs.retain(|_, l| l.vehicle_id != id);
        for driver in self.working.drivers.values_mut() {
            if driver.assigned_vehicle_id == Some(id) {
                driver.assigned_vehicle_id = None;
            }
        }
        Ok(true)
    }

    async fn list_drivers(&mut self) -> AppResult<Vec<Driver>> {
        let mut drivers: Vec<Driver> = self.working.drivers.values().cloned().collect();
        drivers.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(drivers)
    }

    async fn find_driver(&mut self, id: i32) -> AppResult<Option<Driver>> {
        Ok(self.working.drivers.get(&id).cloned())
    }

    async fn lock_driver(&mut self, id: i32) -> AppResult<Option<Driver>> {
        self.find_driver(id).await
    }

    async fn find_driver_by_account(&mut self, account_id: i32) -> AppResult<Option<Driver>> {
        Ok(self
            .working
            .drivers
            .values()
            .find(|d| d.account_id == Some(account_id))
            .cloned())
    }

    async fn insert_driver(&mut self, driver: NewDriver) -> AppResult<Driver> {
        self.trip(FaultPoint::InsertDriver)?;

        self.working
            .check_driver_unique(&driver.license_number, driver.account_id, None)?;
        if let Some(vehicle_id) = driver.assigned_vehicle_id {
            self.working.require_vehicle(vehicle_id)?;
        }
        if let Some(account_id) = driver.account_id {
            if !self.working.accounts.contains_key(&account_id) {
                return Err(AppError::NotFound("Account does not exist".to_string()));
            }
        }

        let id = self.working.next_id("drivers");
        let driver = driver.into_driver(id);
        self.working.drivers.insert(id, driver.clone());
        Ok(driver)
    }

    async fn update_driver(&mut self, driver: &Driver) -> AppResult<Driver> {
        self.working
            .check_driver_unique(&driver.license_number, None, Some(driver.id))?;
        if let Some(vehicle_id) = driver.assigned_vehicle_id {
            self.working.require_vehicle(vehicle_id)?;
        }

        let stored = self
            .working
            .drivers
            .get_mut(&driver.id)
            .ok_or_else(|| not_found_error("Driver", driver.id))?;
        if stored.version != driver.version {
            return Err(conflict_error("Driver", driver.id));
        }

        stored.first_name = driver.first_name.clone();
        stored.last_name = driver.last_name.clone();
        stored.license_number = driver.license_number.clone();
        stored.status = driver.status.clone();
        stored.assigned_vehicle_id = driver.assigned_vehicle_id;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete_driver(&mut self, id: i32) -> AppResult<bool> {
        self.trip(FaultPoint::DeleteDriver)?;
        Ok(self.working.remove_driver_cascade(id))
    }

    async fn list_issues(&mut self) -> AppResult<Vec<IssueDetails>> {
        let mut details: Vec<IssueDetails> = self
            .working
            .issues
            .values()
            .map(|issue| IssueDetails {
                issue: issue.clone(),
                vehicle_license_plate: self
                    .working
                    .vehicles
                    .get(&issue.vehicle_id)
                    .map(|v| v.license_plate.clone()),
                driver_last_name: issue
                    .driver_id
                    .and_then(|id| self.working.drivers.get(&id))
                    .map(|d| d.last_name.clone()),
            })
            .collect();
        details.sort_by(|a, b| {
            (b.issue.created_at, b.issue.id).cmp(&(a.issue.created_at, a.issue.id))
        });
        Ok(details)
    }

    async fn find_issue(&mut self, id: i32) -> AppResult<Option<Issue>> {
        Ok(self.working.issues.get(&id).cloned())
    }

    async fn lock_issue(&mut self, id: i32) -> AppResult<Option<Issue>> {
        self.find_issue(id).await
    }

    async fn insert_issue(&mut self, issue: NewIssue) -> AppResult<Issue> {
        self.working.require_vehicle(issue.vehicle_id)?;
        if let Some(driver_id) = issue.driver_id {
            self.working.require_driver(driver_id)?;
        }

        let id = self.working.next_id("issues");
        let created_at = self.working.next_issue_timestamp();
        let issue = issue.into_issue(id, created_at);
        self.working.issues.insert(id, issue.clone());
        Ok(issue)
    }

    async fn update_issue_status(&mut self, id: i32, status: IssueStatus) -> AppResult<()> {
        self.trip(FaultPoint::UpdateIssueStatus)?;

        if let Some(issue) = self.working.issues.get_mut(&id) {
            issue.status = status;
        }
        Ok(())
    }

    async fn issues_for_driver(&mut self, driver_id: i32) -> AppResult<Vec<Issue>> {
        Ok(self
            .working
            .issues
            .values()
            .filter(|i| i.driver_id == Some(driver_id))
            .cloned()
            .collect())
    }

    async fn count_issues_with_status(&mut self, vehicle_id: i32, status: IssueStatus) -> AppResult<i64> {
        let count = self
            .working
            .issues
            .values()
            .filter(|i| i.vehicle_id == vehicle_id && i.status == status)
            .count();
        Ok(count as i64)
    }

    async fn list_logs(&mut self) -> AppResult<Vec<TripLog>> {
        let mut logs: Vec<TripLog> = self.working.logs.values().cloned().collect();
        logs.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(logs)
    }

    async fn find_log(&mut self, id: i32) -> AppResult<Option<TripLog>> {
        Ok(self.working.logs.get(&id).cloned())
    }

    async fn insert_log(&mut self, log: NewTripLog) -> AppResult<TripLog> {
        self.working.require_driver(log.driver_id)?;
        self.working.require_vehicle(log.vehicle_id)?;

        let id = self.working.next_id("trip_logs");
        let log = log.into_log(id);
        self.working.logs.insert(id, log.clone());
        Ok(log)
    }

    async fn update_log(&mut self, log: &TripLog) -> AppResult<TripLog> {
        self.working.require_driver(log.driver_id)?;
        self.working.require_vehicle(log.vehicle_id)?;

        let stored = self
            .working
            .logs
            .get_mut(&log.id)
            .ok_or_else(|| not_found_error("Log", log.id))?;
        if stored.version != log.version {
            return Err(conflict_error("Log", log.id));
        }

        *stored = TripLog {
            version: stored.version + 1,
            ..log.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_log(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.working.logs.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.trip(FaultPoint::Commit)?;

        let MemoryUnitOfWork {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
