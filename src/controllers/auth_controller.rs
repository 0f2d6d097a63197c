use std::sync::Arc;

use crate::database::{complete, FleetStore};
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::services::{AccountService, Credentials};
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    store: Arc<dyn FleetStore>,
    accounts: AccountService,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(store: Arc<dyn FleetStore>, accounts: AccountService, jwt: JwtConfig) -> Self {
        Self { store, accounts, jwt }
    }

    /// Verifica credenciales y emite un JWT con los roles de la cuenta
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let credentials = Credentials::from(request);

        let (account, roles) = self.accounts.authenticate(self.store.as_ref(), &credentials).await?;

        let mut uow = self.store.begin().await?;
        let result = uow.find_driver_by_account(account.id).await;
        let driver_id = complete(uow, result).await?.map(|driver| driver.id);

        let issued = generate_token(account.id, &account.username, &roles, &self.jwt)?;
        tracing::info!("🔓 Login de {} con roles {:?}", account.username, roles);

        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserInfo::new(&account, roles, driver_id),
        })
    }

    /// Alta de una cuenta sin roles
    pub async fn register(&self, request: RegisterRequest) -> Result<ApiResponse<UserInfo>, AppError> {
        let credentials = Credentials::from(request);
        let draft = self.accounts.prepare(&credentials).await?;

        let mut uow = self.store.begin().await?;
        let result = self.accounts.create_account(uow.as_mut(), &draft).await;
        let account = complete(uow, result).await?;

        Ok(ApiResponse::success_with_message(
            UserInfo::new(&account, Vec::new(), None),
            "Account registered",
        ))
    }
}
