use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::issue_dto::{IssueResponse, ReportIssueRequest, UpdateIssueStatusRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::{IssuePriority, NewIssue};
use crate::services::{IssueService, ProvisioningService, StatusChange};
use crate::utils::errors::{validation_error, AppError};

pub struct IssueController {
    issues: IssueService,
    provisioning: ProvisioningService,
}

impl IssueController {
    pub fn new(issues: IssueService, provisioning: ProvisioningService) -> Self {
        Self {
            issues,
            provisioning,
        }
    }

    /// Vista de administración: de la más reciente a la más antigua
    pub async fn list(&self) -> Result<Vec<IssueResponse>, AppError> {
        let issues = self.issues.list().await?;
        Ok(issues.into_iter().map(IssueResponse::from).collect())
    }

    pub async fn report(
        &self,
        user: &AuthenticatedUser,
        request: ReportIssueRequest,
    ) -> Result<ApiResponse<IssueResponse>, AppError> {
        request.validate()?;

        let priority = match request.priority.as_deref() {
            Some(priority) => priority
                .parse::<IssuePriority>()
                .map_err(|e| validation_error("InvalidIssuePriority", &e))?,
            None => IssuePriority::default(),
        };

        // Un conductor siempre reporta como sí mismo
        let driver_id = if user.is_admin() {
            request.driver_id
        } else {
            match self.provisioning.driver_for_account(user.account_id).await {
                Ok(driver) => Some(driver.id),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            }
        };

        let issue = self
            .issues
            .report(NewIssue {
                title: request.title.trim().to_string(),
                description: request.description.trim().to_string(),
                priority,
                vehicle_id: request.vehicle_id,
                driver_id,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            IssueResponse::from(issue),
            "Issue reported",
        ))
    }

    pub async fn update_status(
        &self,
        id: i32,
        request: UpdateIssueStatusRequest,
    ) -> Result<ApiResponse<StatusChange>, AppError> {
        request.validate()?;

        let change = self.issues.set_status(id, &request.status).await?;
        let message = change
            .warning
            .clone()
            .unwrap_or_else(|| "Issue status updated".to_string());

        Ok(ApiResponse::success_with_message(change, message))
    }
}
