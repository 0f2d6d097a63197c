//! Unidad de trabajo
//!
//! Cada operación mutante abre una `UnitOfWork`, ejecuta todas sus escrituras
//! contra ella y termina con `commit` o `rollback`. Si la unidad se descarta
//! sin `commit` (error, petición cancelada) ninguna escritura es visible.
//!
//! Los métodos `lock_*` toman un bloqueo de fila hasta el final de la unidad,
//! de modo que dos operaciones sobre el mismo registro quedan serializadas.
//! Los métodos `update_*` aplican concurrencia optimista sobre `version` y
//! devuelven `AppError::Conflict` si otro escritor llegó antes.

use async_trait::async_trait;

use crate::models::{
    Account, Driver, Issue, IssueDetails, IssueStatus, NewDriver, NewIssue, NewTripLog, NewVehicle,
    Role, TripLog, Vehicle,
};
use crate::utils::errors::{AppError, AppResult};

/// Almacén persistente capaz de abrir unidades de trabajo
#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    // --- Cuentas (sistema de identidad) ---

    /// Falla con `Validation` (`DuplicateUserName`) si el usuario ya existe
    async fn insert_account(&mut self, username: &str, password_hash: &str) -> AppResult<Account>;
    async fn find_account(&mut self, id: i32) -> AppResult<Option<Account>>;
    async fn find_account_by_username(&mut self, username: &str) -> AppResult<Option<Account>>;
    async fn add_account_role(&mut self, account_id: i32, role: Role) -> AppResult<()>;
    async fn account_roles(&mut self, account_id: i32) -> AppResult<Vec<Role>>;
    /// Devuelve `false` si la cuenta no existía
    async fn delete_account(&mut self, account_id: i32) -> AppResult<bool>;

    // --- Vehículos ---

    async fn list_vehicles(&mut self) -> AppResult<Vec<Vehicle>>;
    async fn find_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>>;
    async fn lock_vehicle(&mut self, id: i32) -> AppResult<Option<Vehicle>>;
    async fn insert_vehicle(&mut self, vehicle: NewVehicle) -> AppResult<Vehicle>;
    /// Escribe los campos editables; `is_operational` no se toca
    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle>;
    async fn set_vehicle_operational(&mut self, id: i32, operational: bool) -> AppResult<()>;
    /// Borra en cascada incidencias y registros; desasigna conductores
    async fn delete_vehicle(&mut self, id: i32) -> AppResult<bool>;

    // --- Conductores ---

    async fn list_drivers(&mut self) -> AppResult<Vec<Driver>>;
    async fn find_driver(&mut self, id: i32) -> AppResult<Option<Driver>>;
    async fn lock_driver(&mut self, id: i32) -> AppResult<Option<Driver>>;
    async fn find_driver_by_account(&mut self, account_id: i32) -> AppResult<Option<Driver>>;
    async fn insert_driver(&mut self, driver: NewDriver) -> AppResult<Driver>;
    /// Escribe los campos editables; `account_id` no se toca
    async fn update_driver(&mut self, driver: &Driver) -> AppResult<Driver>;
    /// Borra en cascada incidencias y registros del conductor
    async fn delete_driver(&mut self, id: i32) -> AppResult<bool>;

    // --- Incidencias ---

    /// Ordenadas de la más reciente a la más antigua
    async fn list_issues(&mut self) -> AppResult<Vec<IssueDetails>>;
    async fn find_issue(&mut self, id: i32) -> AppResult<Option<Issue>>;
    async fn lock_issue(&mut self, id: i32) -> AppResult<Option<Issue>>;
    /// Asigna estado `Reported` y una fecha de creación monótona
    async fn insert_issue(&mut self, issue: NewIssue) -> AppResult<Issue>;
    async fn update_issue_status(&mut self, id: i32, status: IssueStatus) -> AppResult<()>;
    async fn issues_for_driver(&mut self, driver_id: i32) -> AppResult<Vec<Issue>>;
    async fn count_issues_with_status(&mut self, vehicle_id: i32, status: IssueStatus) -> AppResult<i64>;

    // --- Registros de viaje ---

    async fn list_logs(&mut self) -> AppResult<Vec<TripLog>>;
    async fn find_log(&mut self, id: i32) -> AppResult<Option<TripLog>>;
    async fn insert_log(&mut self, log: NewTripLog) -> AppResult<TripLog>;
    async fn update_log(&mut self, log: &TripLog) -> AppResult<TripLog>;
    async fn delete_log(&mut self, id: i32) -> AppResult<bool>;

    // --- Fin de la unidad ---

    async fn commit(self: Box<Self>) -> AppResult<()>;
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Cierra la unidad según el resultado: `commit` si es `Ok`, `rollback` si no.
///
/// Un fallo del rollback se registra pero no oculta el error original.
pub async fn complete<T>(uow: Box<dyn UnitOfWork>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_error) = uow.rollback().await {
                tracing::error!("❌ Rollback fallido: {}", rollback_error);
            }
            Err(e)
        }
    }
}

/// Como [`complete`], para operaciones que deben ser atómicas.
///
/// Los errores que el llamador puede corregir se devuelven tal cual; el resto
/// (incluido un fallo del propio `commit`) se convierte en `AppError::Atomicity`
/// una vez deshecha la unidad.
pub async fn complete_atomic<T>(
    uow: Box<dyn UnitOfWork>,
    result: AppResult<T>,
    operation: &str,
) -> AppResult<T> {
    let result = match result {
        Ok(value) => uow.commit().await.map(|_| value),
        Err(e) => {
            tracing::warn!("↩️ {}: deshaciendo cambios ({})", operation, e);
            if let Err(rollback_error) = uow.rollback().await {
                tracing::error!("❌ Rollback fallido: {}", rollback_error);
            }
            Err(e)
        }
    };

    result.map_err(|e| {
        if e.is_caller_fault() {
            e
        } else {
            AppError::Atomicity(format!("{}: {}", operation, e))
        }
    })
}
