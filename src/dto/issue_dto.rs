use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Issue, IssueDetails, IssuePriority, IssueStatus};
use crate::utils::validation::validate_not_blank;

// Request para reportar una incidencia
#[derive(Debug, Deserialize, Validate)]
pub struct ReportIssueRequest {
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    /// Low, Normal o High; Normal si falta
    pub priority: Option<String>,
    pub vehicle_id: i32,
    /// Solo lo tiene en cuenta un Admin; para un conductor se usa su propio perfil
    pub driver_id: Option<i32>,
}

// Request para cambiar el estado de una incidencia
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIssueStatusRequest {
    #[validate(custom = "validate_not_blank")]
    pub status: String,
}

// Response de incidencia
#[derive(Debug, Clone, Serialize)]
pub struct IssueResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub vehicle_id: i32,
    pub driver_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_last_name: Option<String>,
}

impl From<Issue> for IssueResponse {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title,
            description: issue.description,
            priority: issue.priority,
            status: issue.status,
            created_at: issue.created_at,
            vehicle_id: issue.vehicle_id,
            driver_id: issue.driver_id,
            vehicle_license_plate: None,
            driver_last_name: None,
        }
    }
}

impl From<IssueDetails> for IssueResponse {
    fn from(details: IssueDetails) -> Self {
        Self {
            vehicle_license_plate: details.vehicle_license_plate,
            driver_last_name: details.driver_last_name,
            ..Self::from(details.issue)
        }
    }
}
