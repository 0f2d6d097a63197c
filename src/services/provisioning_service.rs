//! Aprovisionamiento de conductores
//!
//! Un conductor y su cuenta de acceso nacen y mueren juntos: alta de cuenta,
//! rol `Driver` y fila del conductor van en una sola unidad de trabajo, igual
//! que la baja del conductor y de su cuenta. Cualquier fallo deshace la unidad
//! completa antes de informar.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::database::{complete, complete_atomic, FleetStore, UnitOfWork};
use crate::models::{Driver, IssueStatus, NewDriver, Role, DEFAULT_DRIVER_STATUS};
use crate::services::account_service::{AccountDraft, AccountService, Credentials};
use crate::services::vehicle_tracker::{VehicleEffect, VehicleOperationalTracker};
use crate::utils::errors::{not_found_error, AppResult};

/// Datos personales de un conductor nuevo
#[derive(Debug, Clone)]
pub struct DriverProfile {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub assigned_vehicle_id: Option<i32>,
}

/// Resultado de la baja de un conductor
#[derive(Debug, Clone, Serialize)]
pub struct DriverRemoval {
    pub driver_id: i32,
    pub account_deleted: bool,
    /// Vehículos cuyo estado operativo se recalculó al desaparecer incidencias `InRepair`
    pub reconciled_vehicles: Vec<(i32, VehicleEffect)>,
}

#[derive(Clone)]
pub struct ProvisioningService {
    store: Arc<dyn FleetStore>,
    accounts: AccountService,
}

impl ProvisioningService {
    pub fn new(store: Arc<dyn FleetStore>, accounts: AccountService) -> Self {
        Self { store, accounts }
    }

    /// Crea cuenta + rol `Driver` + conductor como una unidad atómica
    pub async fn create_driver_with_account(
        &self,
        profile: DriverProfile,
        credentials: &Credentials,
    ) -> AppResult<Driver> {
        let draft = self.accounts.prepare(credentials).await?;

        let mut uow = self.store.begin().await?;
        let result = self.provision(uow.as_mut(), profile, &draft).await;
        let driver = complete_atomic(uow, result, "create driver with account").await?;

        tracing::info!(
            "🚛 Conductor {} ({}) creado con la cuenta {}",
            driver.id,
            driver.full_name(),
            credentials.username
        );
        Ok(driver)
    }

    /// Borra el conductor y, si la tiene, su cuenta como una unidad atómica
    pub async fn delete_driver(&self, driver_id: i32) -> AppResult<DriverRemoval> {
        let mut uow = self.store.begin().await?;
        let result = self.remove(uow.as_mut(), driver_id).await;
        let removal = complete_atomic(uow, result, "delete driver with account").await?;

        tracing::info!(
            "🚛 Conductor {} eliminado (cuenta eliminada: {})",
            removal.driver_id,
            removal.account_deleted
        );
        Ok(removal)
    }

    pub async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_drivers().await;
        complete(uow, result).await
    }

    pub async fn get_driver(&self, driver_id: i32) -> AppResult<Driver> {
        let mut uow = self.store.begin().await?;
        let result = uow
            .find_driver(driver_id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found_error("Driver", driver_id)));
        complete(uow, result).await
    }

    /// Perfil de conductor ligado a una cuenta
    pub async fn driver_for_account(&self, account_id: i32) -> AppResult<Driver> {
        let mut uow = self.store.begin().await?;
        let result = uow.find_driver_by_account(account_id).await.and_then(|found| {
            found.ok_or_else(|| not_found_error("Driver for account", account_id))
        });
        complete(uow, result).await
    }

    /// Escribe los campos editables con control de versión
    pub async fn update_driver(&self, driver: Driver) -> AppResult<Driver> {
        let mut uow = self.store.begin().await?;
        let result = uow.update_driver(&driver).await;
        let updated = complete(uow, result).await?;

        tracing::info!("🚛 Conductor {} actualizado (versión {})", updated.id, updated.version);
        Ok(updated)
    }

    async fn provision(
        &self,
        uow: &mut dyn UnitOfWork,
        profile: DriverProfile,
        draft: &AccountDraft,
    ) -> AppResult<Driver> {
        let account = self.accounts.create_account(uow, draft).await?;
        self.accounts.assign_role(uow, account.id, Role::Driver).await?;

        uow.insert_driver(NewDriver {
            first_name: profile.first_name,
            last_name: profile.last_name,
            license_number: profile.license_number,
            status: DEFAULT_DRIVER_STATUS.to_string(),
            assigned_vehicle_id: profile.assigned_vehicle_id,
            account_id: Some(account.id),
        })
        .await
    }

    async fn remove(&self, uow: &mut dyn UnitOfWork, driver_id: i32) -> AppResult<DriverRemoval> {
        let driver = uow
            .lock_driver(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        // Las incidencias del conductor se borran en cascada; sus vehículos
        // en reparación deben recalcularse después.
        let vehicles_in_repair: BTreeSet<i32> = uow
            .issues_for_driver(driver_id)
            .await?
            .into_iter()
            .filter(|issue| issue.status == IssueStatus::InRepair)
            .map(|issue| issue.vehicle_id)
            .collect();

        uow.delete_driver(driver_id).await?;

        let account_deleted = match driver.account_id {
            Some(account_id) => {
                let deleted = self.accounts.delete_account(uow, account_id).await?;
                if !deleted {
                    tracing::warn!(
                        "⚠️ La cuenta {} del conductor {} ya no existía",
                        account_id,
                        driver_id
                    );
                }
                deleted
            }
            None => false,
        };

        let mut reconciled_vehicles = Vec::with_capacity(vehicles_in_repair.len());
        for vehicle_id in vehicles_in_repair {
            let effect = VehicleOperationalTracker::reconcile(uow, vehicle_id).await?;
            reconciled_vehicles.push((vehicle_id, effect));
        }

        Ok(DriverRemoval {
            driver_id,
            account_deleted,
            reconciled_vehicles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Fault, FaultPoint, MemoryStore};
    use crate::models::{NewIssue, NewVehicle};
    use crate::utils::errors::{AppError, ValidationFailure};

    fn service(store: &MemoryStore) -> ProvisioningService {
        ProvisioningService::new(Arc::new(store.clone()), AccountService::new(4))
    }

    fn profile(license_number: &str) -> DriverProfile {
        DriverProfile {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            license_number: license_number.to_string(),
            assigned_vehicle_id: None,
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("jan.kowalski@fleet.pl", "Kierowca#1")
    }

    async fn account_exists(store: &MemoryStore) -> bool {
        let mut uow = store.begin().await.unwrap();
        uow.find_account_by_username("jan.kowalski@fleet.pl")
            .await
            .unwrap()
            .is_some()
    }

    #[tokio::test]
    async fn test_create_then_delete_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let service = service(&store);

        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();
        assert_eq!(driver.status, DEFAULT_DRIVER_STATUS);
        let account_id = driver.account_id.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.account_roles(account_id).await.unwrap(), vec![Role::Driver]);
        drop(uow);

        let removal = service.delete_driver(driver.id).await.unwrap();
        assert!(removal.account_deleted);

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_driver(driver.id).await.unwrap().is_none());
        assert!(uow.find_account(account_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_account_writes_no_driver() {
        let store = MemoryStore::new();
        let service = service(&store);

        let err = service
            .create_driver_with_account(profile("PL-001"), &Credentials::new("jan", "abc"))
            .await
            .unwrap_err();

        let AppError::Validation(failure) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        assert!(failure.has_code("InvalidUserName"));
        assert!(failure.has_code("PasswordTooShort"));
        assert!(service.list_drivers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_driver_write_rolls_back_account() {
        let store = MemoryStore::new();
        let service = service(&store);
        store.inject_fault(FaultPoint::InsertDriver, Fault::Crash("connection reset".to_string()));

        let err = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Atomicity(_)));
        assert!(!account_exists(&store).await);
        assert!(service.list_drivers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_license_number_rolls_back_account() {
        let store = MemoryStore::new();
        let service = service(&store);
        service
            .create_driver_with_account(profile("PL-001"), &Credentials::new("first@fleet.pl", "Kierowca#1"))
            .await
            .unwrap();

        let err = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref f) if f.has_code("DuplicateLicenseNumber")));
        assert!(!account_exists(&store).await);
    }

    #[tokio::test]
    async fn test_rejected_account_delete_keeps_driver() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();

        store.inject_fault(
            FaultPoint::DeleteAccount,
            Fault::Rejected(ValidationFailure::single(
                "ConcurrencyFailure",
                "Optimistic concurrency failure, object has been modified",
            )),
        );

        let err = service.delete_driver(driver.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.has_code("ConcurrencyFailure")));

        let still_there = service.get_driver(driver.id).await.unwrap();
        assert_eq!(still_there, driver);
        assert!(account_exists(&store).await);
    }

    #[tokio::test]
    async fn test_delete_unknown_driver_is_not_found() {
        let store = MemoryStore::new();
        let err = service(&store).delete_driver(17).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_deletes_remove_driver_once() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();

        let (first, second) = tokio::join!(service.delete_driver(driver.id), service.delete_driver(driver.id));

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::NotFound(_)))));
        assert!(!account_exists(&store).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_store_stays_free_while_password_is_hashed() {
        let store = MemoryStore::new();
        let slow = ProvisioningService::new(Arc::new(store.clone()), AccountService::new(14));

        let creating =
            tokio::spawn(async move { slow.create_driver_with_account(profile("PL-001"), &credentials()).await });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // bcrypt con coste 14 tarda mucho más que la espera: el almacén debe seguir libre
        let uow = tokio::time::timeout(std::time::Duration::from_millis(200), store.begin()).await;
        assert!(uow.is_ok());
        drop(uow);

        let driver = creating.await.unwrap().unwrap();
        assert_eq!(driver.license_number, "PL-001");
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_account_or_driver() {
        let store = MemoryStore::new();
        let service = service(&store);
        store.inject_fault(FaultPoint::Commit, Fault::Crash("commit lost".to_string()));

        let err = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Atomicity(_)));
        assert!(!account_exists(&store).await);
        assert!(service.list_drivers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_driver_delete_keeps_driver_and_account() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();
        store.inject_fault(FaultPoint::DeleteDriver, Fault::Crash("connection reset".to_string()));

        let err = service.delete_driver(driver.id).await.unwrap_err();

        assert!(matches!(err, AppError::Atomicity(_)));
        assert_eq!(service.get_driver(driver.id).await.unwrap(), driver);
        assert!(account_exists(&store).await);
    }

    #[tokio::test]
    async fn test_driver_without_account_deletes_alone() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let driver = uow
            .insert_driver(NewDriver {
                first_name: "Ewa".to_string(),
                last_name: "Zielinska".to_string(),
                license_number: "PL-777".to_string(),
                status: DEFAULT_DRIVER_STATUS.to_string(),
                assigned_vehicle_id: None,
                account_id: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let removal = service(&store).delete_driver(driver.id).await.unwrap();
        assert!(!removal.account_deleted);
    }

    #[tokio::test]
    async fn test_deleting_driver_restores_vehicle_held_by_its_repairs() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();

        let mut uow = store.begin().await.unwrap();
        let vehicle = uow
            .insert_vehicle(NewVehicle {
                brand: "Renault".to_string(),
                model: "Master".to_string(),
                license_plate: "PO 1234".to_string(),
                vehicle_type: "Van".to_string(),
            })
            .await
            .unwrap();
        let issue = uow
            .insert_issue(NewIssue {
                title: "Steering".to_string(),
                description: String::new(),
                priority: Default::default(),
                vehicle_id: vehicle.id,
                driver_id: Some(driver.id),
            })
            .await
            .unwrap();
        uow.update_issue_status(issue.id, IssueStatus::InRepair).await.unwrap();
        uow.set_vehicle_operational(vehicle.id, false).await.unwrap();
        uow.commit().await.unwrap();

        let removal = service.delete_driver(driver.id).await.unwrap();
        assert_eq!(
            removal.reconciled_vehicles,
            vec![(vehicle.id, VehicleEffect::Updated { operational: true })]
        );

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_vehicle(vehicle.id).await.unwrap().unwrap().is_operational);
    }

    #[tokio::test]
    async fn test_update_with_stale_version_conflicts() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();

        let mut first = driver.clone();
        first.status = "On route".to_string();
        let updated = service.update_driver(first).await.unwrap();
        assert_eq!(updated.version, driver.version + 1);

        let mut stale = driver;
        stale.status = "Off duty".to_string();
        let err = service.update_driver(stale).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_driver_for_account() {
        let store = MemoryStore::new();
        let service = service(&store);
        let driver = service
            .create_driver_with_account(profile("PL-001"), &credentials())
            .await
            .unwrap();

        let me = service.driver_for_account(driver.account_id.unwrap()).await.unwrap();
        assert_eq!(me.id, driver.id);
        assert!(matches!(
            service.driver_for_account(999).await,
            Err(AppError::NotFound(_))
        ));
    }
}
