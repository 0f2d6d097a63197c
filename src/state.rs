//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::database::FleetStore;
use crate::services::{AccountService, IssueService, ProvisioningService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub accounts: AccountService,
    pub issues: IssueService,
    pub provisioning: ProvisioningService,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, config: EnvironmentConfig) -> Self {
        let accounts = AccountService::new(config.bcrypt_cost);

        Self {
            jwt: JwtConfig::from(&config),
            issues: IssueService::new(store.clone()),
            provisioning: ProvisioningService::new(store.clone(), accounts.clone()),
            accounts,
            store,
            config,
        }
    }
}
