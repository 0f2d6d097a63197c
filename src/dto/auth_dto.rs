use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Account, Role};
use crate::services::Credentials;

// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(request: LoginRequest) -> Self {
        Credentials::new(request.username.trim(), request.password)
    }
}

// Register request: cuenta sin roles
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

impl From<RegisterRequest> for Credentials {
    fn from(request: RegisterRequest) -> Self {
        Credentials::new(request.username.trim(), request.password)
    }
}

// Datos públicos de una cuenta
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub roles: Vec<Role>,
    /// Perfil de conductor ligado a la cuenta, si existe
    pub driver_id: Option<i32>,
}

impl UserInfo {
    pub fn new(account: &Account, roles: Vec<Role>, driver_id: Option<i32>) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            roles,
            driver_id,
        }
    }
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}
