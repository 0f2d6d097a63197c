//! Máquina de estados de incidencias
//!
//! `Reported` -> `InRepair` -> `Resolved`, con `Reported` -> `Resolved`
//! directo. Nada sale de `Resolved`. Entrar o salir de `InRepair` recalcula el
//! estado operativo del vehículo en la misma unidad de trabajo que el cambio
//! de estado. Orden de bloqueo: incidencia, después vehículo (solo si la
//! transición toca `InRepair`).

use std::sync::Arc;

use serde::Serialize;

use crate::database::{complete, complete_atomic, FleetStore, UnitOfWork};
use crate::models::{Issue, IssueDetails, IssueStatus, NewIssue};
use crate::services::vehicle_tracker::{VehicleEffect, VehicleOperationalTracker};
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

/// Resultado de un cambio de estado
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub issue: Issue,
    pub previous_status: IssueStatus,
    /// `None` si la transición no afecta al vehículo
    pub vehicle_effect: Option<VehicleEffect>,
    pub warning: Option<String>,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.previous_status != self.issue.status
    }
}

#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn FleetStore>,
}

impl IssueService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Registra una incidencia nueva en estado `Reported`; el vehículo no cambia
    pub async fn report(&self, issue: NewIssue) -> AppResult<Issue> {
        let mut uow = self.store.begin().await?;
        let result = uow.insert_issue(issue).await;
        let issue = complete(uow, result).await?;

        tracing::info!(
            "🛠️ Incidencia {} registrada para el vehículo {}: {}",
            issue.id,
            issue.vehicle_id,
            issue.title
        );
        Ok(issue)
    }

    /// Todas las incidencias, de la más reciente a la más antigua
    pub async fn list(&self) -> AppResult<Vec<IssueDetails>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_issues().await;
        complete(uow, result).await
    }

    /// Cambia el estado de una incidencia.
    ///
    /// El texto del estado se compara sin distinguir mayúsculas. Si la
    /// transición debía tocar el vehículo y este ya no existe, el estado se
    /// escribe igualmente y el resultado lleva un aviso.
    pub async fn set_status(&self, issue_id: i32, new_status: &str) -> AppResult<StatusChange> {
        let target: IssueStatus = new_status
            .parse()
            .map_err(|e: String| validation_error("InvalidIssueStatus", &e))?;

        let mut uow = self.store.begin().await?;
        let result = Self::apply_status(uow.as_mut(), issue_id, target).await;
        let change = complete_atomic(uow, result, "update issue status").await?;

        if change.changed() {
            tracing::info!(
                "🛠️ Incidencia {}: {} -> {}",
                change.issue.id,
                change.previous_status,
                change.issue.status
            );
        }
        Ok(change)
    }

    async fn apply_status(
        uow: &mut dyn UnitOfWork,
        issue_id: i32,
        target: IssueStatus,
    ) -> AppResult<StatusChange> {
        let mut issue = uow
            .lock_issue(issue_id)
            .await?
            .ok_or_else(|| not_found_error("Issue", issue_id))?;
        let previous_status = issue.status;

        if !previous_status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Issue {} cannot move from {} to {}",
                issue_id, previous_status, target
            )));
        }

        if previous_status == target {
            return Ok(StatusChange {
                issue,
                previous_status,
                vehicle_effect: None,
                warning: None,
            });
        }

        let touches_repair =
            previous_status == IssueStatus::InRepair || target == IssueStatus::InRepair;
        let vehicle_exists = if touches_repair {
            uow.lock_vehicle(issue.vehicle_id).await?.is_some()
        } else {
            false
        };

        uow.update_issue_status(issue_id, target).await?;
        issue.status = target;

        let (vehicle_effect, warning) = if !touches_repair {
            (None, None)
        } else if !vehicle_exists {
            tracing::warn!(
                "⚠️ La incidencia {} apunta al vehículo {} que no existe",
                issue_id,
                issue.vehicle_id
            );
            (
                Some(VehicleEffect::VehicleMissing),
                Some(format!(
                    "Vehicle {} does not exist; issue status was updated without a vehicle change",
                    issue.vehicle_id
                )),
            )
        } else {
            let effect = VehicleOperationalTracker::reconcile(uow, issue.vehicle_id).await?;
            (Some(effect), None)
        };

        Ok(StatusChange {
            issue,
            previous_status,
            vehicle_effect,
            warning,
        })
    }
}
