//! Seguimiento del estado operativo de los vehículos
//!
//! Un vehículo está operativo si y solo si ninguna de sus incidencias está
//! `InRepair`. El flag se recalcula sobre todas las incidencias del vehículo
//! dentro de la misma unidad de trabajo que provocó el cambio; es el único
//! código que escribe `is_operational`.

use serde::Serialize;

use crate::database::UnitOfWork;
use crate::models::IssueStatus;
use crate::utils::errors::AppResult;

/// Efecto del recálculo sobre el vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VehicleEffect {
    Unchanged { operational: bool },
    Updated { operational: bool },
    VehicleMissing,
}

impl VehicleEffect {
    pub fn operational(&self) -> Option<bool> {
        match self {
            VehicleEffect::Unchanged { operational } | VehicleEffect::Updated { operational } => {
                Some(*operational)
            }
            VehicleEffect::VehicleMissing => None,
        }
    }
}

pub struct VehicleOperationalTracker;

impl VehicleOperationalTracker {
    /// Bloquea el vehículo y alinea su flag con las incidencias `InRepair`
    pub async fn reconcile(uow: &mut dyn UnitOfWork, vehicle_id: i32) -> AppResult<VehicleEffect> {
        let Some(vehicle) = uow.lock_vehicle(vehicle_id).await? else {
            tracing::warn!("⚠️ Vehículo {} no existe; no se actualiza su estado operativo", vehicle_id);
            return Ok(VehicleEffect::VehicleMissing);
        };

        let in_repair = uow
            .count_issues_with_status(vehicle_id, IssueStatus::InRepair)
            .await?;
        let operational = in_repair == 0;

        if vehicle.is_operational == operational {
            tracing::debug!(
                "🚚 Vehículo {} sin cambios (operativo: {}, en reparación: {})",
                vehicle_id,
                operational,
                in_repair
            );
            return Ok(VehicleEffect::Unchanged { operational });
        }

        uow.set_vehicle_operational(vehicle_id, operational).await?;
        tracing::info!(
            "🚚 Vehículo {} ({}) ahora {}",
            vehicle_id,
            vehicle.license_plate,
            if operational { "operativo" } else { "fuera de servicio" }
        );

        Ok(VehicleEffect::Updated { operational })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{FleetStore, MemoryStore};
    use crate::models::{NewIssue, NewVehicle};

    async fn setup(store: &MemoryStore) -> (i32, i32) {
        let mut uow = store.begin().await.unwrap();
        let vehicle = uow
            .insert_vehicle(NewVehicle {
                brand: "Iveco".to_string(),
                model: "Daily".to_string(),
                license_plate: "KR 7781".to_string(),
                vehicle_type: "Truck".to_string(),
            })
            .await
            .unwrap();
        let issue = uow
            .insert_issue(NewIssue {
                title: "Oil leak".to_string(),
                description: String::new(),
                priority: Default::default(),
                vehicle_id: vehicle.id,
                driver_id: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        (vehicle.id, issue.id)
    }

    #[tokio::test]
    async fn test_reconcile_marks_vehicle_out_of_service() {
        let store = MemoryStore::new();
        let (vehicle_id, issue_id) = setup(&store).await;

        let mut uow = store.begin().await.unwrap();
        uow.update_issue_status(issue_id, IssueStatus::InRepair).await.unwrap();
        let effect = VehicleOperationalTracker::reconcile(uow.as_mut(), vehicle_id)
            .await
            .unwrap();

        assert_eq!(effect, VehicleEffect::Updated { operational: false });
        assert!(!uow.find_vehicle(vehicle_id).await.unwrap().unwrap().is_operational);
    }

    #[tokio::test]
    async fn test_reconcile_without_repairs_is_a_no_op() {
        let store = MemoryStore::new();
        let (vehicle_id, _) = setup(&store).await;

        let mut uow = store.begin().await.unwrap();
        let effect = VehicleOperationalTracker::reconcile(uow.as_mut(), vehicle_id)
            .await
            .unwrap();

        assert_eq!(effect, VehicleEffect::Unchanged { operational: true });
    }

    #[tokio::test]
    async fn test_reconcile_missing_vehicle() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let effect = VehicleOperationalTracker::reconcile(uow.as_mut(), 404).await.unwrap();
        assert_eq!(effect, VehicleEffect::VehicleMissing);
        assert_eq!(effect.operational(), None);
    }
}
