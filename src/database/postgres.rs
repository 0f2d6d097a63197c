//! Implementación PostgreSQL de la unidad de trabajo
//!
//! Cada unidad es una transacción `sqlx`. Si se descarta sin `commit`,
//! sqlx emite el ROLLBACK al devolver la conexión al pool.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::unit_of_work::{FleetStore, UnitOfWork};
use crate::models::{
    Account, Driver, Issue, IssueDetails, IssueStatus, NewDriver, NewIssue, NewTripLog, NewVehicle,
    Role, TripLog, Vehicle,
};
use crate::repositories::{
    map_db_error, AccountRepository, DriverRepository, IssueRepository, TripLogRepository,
    VehicleRepository,
};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Error opening transaction"))?;

        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_account(&mut self, username: &str, password_hash: &str) -> AppResult<Account> {
        AccountRepository::new(&mut *self.tx).create(username, password_hash).await
    }

    async fn find_account(&mut self, id: i32) -> AppResult<Option<Account>> {
        AccountRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn find_account_by_username(&mut self, username: &str) -> AppResult<Option<Account>> {
        AccountRepository::new(&mut *self.tx).find_by_username(username).await
    }

    async fn add_account_role(&mut self, account_id: i32, role: Role) -> AppResult<()> {
        AccountRepository::new(&mut *self.tx).add_role(account_id, role).await
    }

    async fn account_roles(&mut self, account_id: i32) -> AppResult<Vec<Role>> {
        AccountRepository::new(&mut *self.tx).roles(account_id).await
    }

    async fn delete_account(&mut self, account_id: i32) -> AppResult<bool> {
        AccountRepository::new(&mut *self.tx).delete(account_id).await
    }

    async fn list_vehicles(&mut self) -> AppResult<Vec<Vehicle>> {
        VehicleRepository::new(&mut *self.tx).list().await
    }

    async fn find_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        VehicleRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn lock_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        VehicleRepository::new(&mut *self.tx).lock_by_id(id).await
    }

    async fn insert_vehicle(&mut self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        VehicleRepository::new(&mut *self.tx).create(vehicle).await
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        VehicleRepository::new(&mut *self.tx).update(vehicle).await
    }

    async fn set_vehicle_operational(&mut self, id: i32, operational: bool) -> AppResult<()> {
        VehicleRepository::new(&mut *self.tx).set_operational(id, operational).await
    }

    async fn delete_vehicle(&mut self, id: i32) -> AppResult<bool> {
        VehicleRepository::new(&mut *self.tx).delete(id).await
    }

    async fn list_drivers(&mut self) -> AppResult<Vec<Driver>> {
        DriverRepository::new(&mut *self.tx).list().await
    }

    async fn find_driver(&mut self, id: i32) -> AppResult<Option<Driver>> {
        DriverRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn lock_driver(&mut self, id: i32) -> AppResult<Option<Driver>> {
        DriverRepository::new(&mut *self.tx).lock_by_id(id).await
    }

    async fn find_driver_by_account(&mut self, account_id: i32) -> AppResult<Option<Driver>> {
        DriverRepository::new(&mut *self.tx).find_by_account(account_id).await
    }

    async fn insert_driver(&mut self, driver: NewDriver) -> AppResult<Driver> {
        DriverRepository::new(&mut *self.tx).create(driver).await
    }

    async fn update_driver(&mut self, driver: &Driver) -> AppResult<Driver> {
        DriverRepository::new(&mut *self.tx).update(driver).await
    }

    async fn delete_driver(&mut self, id: i32) -> AppResult<bool> {
        DriverRepository::new(&mut *self.tx).delete(id).await
    }

    async fn list_issues(&mut self) -> AppResult<Vec<IssueDetails>> {
        IssueRepository::new(&mut *self.tx).list_with_details().await
    }

    async fn find_issue(&mut self, id: i32) -> AppResult<Option<Issue>> {
        IssueRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn lock_issue(&mut self, id: i32) -> AppResult<Option<Issue>> {
        IssueRepository::new(&mut *self.tx).lock_by_id(id).await
    }

    async fn insert_issue(&mut self, issue: NewIssue) -> AppResult<Issue> {
        IssueRepository::new(&mut *self.tx).create(issue).await
    }

    async fn update_issue_status(&mut self, id: i32, status: IssueStatus) -> AppResult<()> {
        IssueRepository::new(&mut *self.tx).update_status(id, status).await
    }

    async fn issues_for_driver(&mut self, driver_id: i32) -> AppResult<Vec<Issue>> {
        IssueRepository::new(&mut *self.tx).find_by_driver(driver_id).await
    }

    async fn count_issues_with_status(&mut self, vehicle_id: i32, status: IssueStatus) -> AppResult<i64> {
        IssueRepository::new(&mut *self.tx)
            .count_by_vehicle_and_status(vehicle_id, status)
            .await
    }

    async fn list_logs(&mut self) -> AppResult<Vec<TripLog>> {
        TripLogRepository::new(&mut *self.tx).list().await
    }

    async fn find_log(&mut self, id: i32) -> AppResult<Option<TripLog>> {
        TripLogRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn insert_log(&mut self, log: NewTripLog) -> AppResult<TripLog> {
        TripLogRepository::new(&mut *self.tx).create(log).await
    }

    async fn update_log(&mut self, log: &TripLog) -> AppResult<TripLog> {
        TripLogRepository::new(&mut *self.tx).update(log).await
    }

    async fn delete_log(&mut self, id: i32) -> AppResult<bool> {
        TripLogRepository::new(&mut *self.tx).delete(id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error(e, "Error committing transaction"))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_db_error(e, "Error rolling back transaction"))
    }
}
