//! Modelo de Issue (incidencia de mantenimiento)
//!
//! Incluye los enums de estado y prioridad. Los estados se mapean a los
//! ENUM de PostgreSQL `issue_status` e `issue_priority`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado de la incidencia - mapea al ENUM issue_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
pub enum IssueStatus {
    Reported,
    InRepair,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Reported => "Reported",
            IssueStatus::InRepair => "InRepair",
            IssueStatus::Resolved => "Resolved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IssueStatus::Resolved)
    }

    /// Transiciones legales: Reported -> InRepair -> Resolved y Reported -> Resolved.
    /// Repetir el estado actual es un no-op salvo en el estado terminal.
    pub fn can_transition_to(&self, target: IssueStatus) -> bool {
        match (self, target) {
            (IssueStatus::Resolved, _) => false,
            (current, target) if *current == target => true,
            (IssueStatus::Reported, IssueStatus::InRepair) => true,
            (IssueStatus::Reported, IssueStatus::Resolved) => true,
            (IssueStatus::InRepair, IssueStatus::Resolved) => true,
            _ => false,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normaliza un texto de estado: minúsculas y sin separadores
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for IssueStatus {
    type Err = String;

    /// Comparación insensible a mayúsculas ("inrepair", "In Repair", "in_repair")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "reported" => Ok(IssueStatus::Reported),
            "inrepair" => Ok(IssueStatus::InRepair),
            "resolved" => Ok(IssueStatus::Resolved),
            _ => Err(format!(
                "unknown issue status '{}' (expected Reported, InRepair or Resolved)",
                s
            )),
        }
    }
}

/// Prioridad de la incidencia - mapea al ENUM issue_priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_priority", rename_all = "snake_case")]
pub enum IssuePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuePriority::Low => "Low",
            IssuePriority::Normal => "Normal",
            IssuePriority::High => "High",
        }
    }
}

impl FromStr for IssuePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(IssuePriority::Low),
            "normal" => Ok(IssuePriority::Normal),
            "high" => Ok(IssuePriority::High),
            _ => Err(format!(
                "unknown issue priority '{}' (expected Low, Normal or High)",
                s
            )),
        }
    }
}

/// Issue principal - mapea a la tabla issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub vehicle_id: i32,
    pub driver_id: Option<i32>,
}

/// Datos para insertar una incidencia (estado y fecha los asigna el servidor)
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub priority: IssuePriority,
    pub vehicle_id: i32,
    pub driver_id: Option<i32>,
}

impl NewIssue {
    pub fn into_issue(self, id: i32, created_at: DateTime<Utc>) -> Issue {
        Issue {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: IssueStatus::Reported,
            created_at,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
        }
    }
}

/// Incidencia con datos del vehículo y del conductor que la reportó
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IssueDetails {
    #[sqlx(flatten)]
    pub issue: Issue,
    pub vehicle_license_plate: Option<String>,
    pub driver_last_name: Option<String>,
}
