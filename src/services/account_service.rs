//! Pasarela de identidad
//!
//! Alta, roles, baja y verificación de cuentas. Las escrituras trabajan
//! dentro de la unidad de trabajo del llamador, de modo que la cuenta comparte
//! transacción con las escrituras que la acompañan. El cifrado y la
//! verificación de contraseñas (bcrypt) se hacen siempre fuera de la unidad.

use crate::database::{unit_of_work, FleetStore, UnitOfWork};
use crate::models::{Account, Role};
use crate::utils::errors::{internal_error, AppError, AppResult, ValidationFailure};
use crate::utils::validation::{password_reasons, username_reasons};

/// Usuario y contraseña en claro
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Alta de cuenta preparada: política evaluada y contraseña ya cifrada
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub username: String,
    rejected: ValidationFailure,
    password_hash: Option<String>,
}

/// Servicio de cuentas
#[derive(Debug, Clone)]
pub struct AccountService {
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self { bcrypt_cost }
    }

    /// Evalúa la política de usuario y contraseña y cifra la contraseña.
    ///
    /// Se llama antes de abrir la unidad de trabajo. Los rechazos no fallan
    /// aquí: se devuelven en [`create_account`](Self::create_account) junto
    /// con el de usuario duplicado.
    pub async fn prepare(&self, credentials: &Credentials) -> AppResult<AccountDraft> {
        let mut rejected = ValidationFailure::default();
        rejected.reasons.extend(username_reasons(&credentials.username));
        rejected.reasons.extend(password_reasons(&credentials.password));

        let password_hash = if rejected.is_empty() {
            Some(self.hash_password(&credentials.password).await?)
        } else {
            None
        };

        Ok(AccountDraft {
            username: credentials.username.clone(),
            rejected,
            password_hash,
        })
    }

    /// Crea una cuenta sin roles.
    ///
    /// Todos los motivos de rechazo (formato de usuario, política de
    /// contraseña, usuario duplicado) se devuelven juntos y no se escribe nada.
    pub async fn create_account(
        &self,
        uow: &mut dyn UnitOfWork,
        draft: &AccountDraft,
    ) -> AppResult<Account> {
        let mut failure = draft.rejected.clone();

        if uow.find_account_by_username(&draft.username).await?.is_some() {
            failure.push(
                "DuplicateUserName",
                format!("Username '{}' is already taken", draft.username),
            );
        }

        if !failure.is_empty() {
            return Err(AppError::Validation(failure));
        }

        let password_hash = draft
            .password_hash
            .as_deref()
            .ok_or_else(|| internal_error("account draft without password hash"))?;
        let account = uow.insert_account(&draft.username, password_hash).await?;

        tracing::info!("👤 Cuenta creada: {} (id {})", account.username, account.id);
        Ok(account)
    }

    pub async fn assign_role(
        &self,
        uow: &mut dyn UnitOfWork,
        account_id: i32,
        role: Role,
    ) -> AppResult<()> {
        uow.add_account_role(account_id, role).await?;
        tracing::debug!("👤 Rol {} asignado a la cuenta {}", role, account_id);
        Ok(())
    }

    /// Devuelve `false` si la cuenta no existía
    pub async fn delete_account(&self, uow: &mut dyn UnitOfWork, account_id: i32) -> AppResult<bool> {
        let deleted = uow.delete_account(account_id).await?;
        if deleted {
            tracing::info!("👤 Cuenta {} eliminada", account_id);
        }
        Ok(deleted)
    }

    /// Verifica usuario y contraseña; devuelve la cuenta y sus roles.
    ///
    /// La lectura usa su propia unidad de trabajo, que se cierra antes de
    /// verificar el hash.
    pub async fn authenticate(
        &self,
        store: &dyn FleetStore,
        credentials: &Credentials,
    ) -> AppResult<(Account, Vec<Role>)> {
        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        let mut uow = store.begin().await?;
        let result = Self::load_account(uow.as_mut(), &credentials.username).await;
        let (account, roles) = unit_of_work::complete(uow, result).await?.ok_or_else(invalid)?;

        if !self
            .verify_password(&credentials.password, &account.password_hash)
            .await?
        {
            tracing::warn!("🔒 Contraseña incorrecta para {}", credentials.username);
            return Err(invalid());
        }

        Ok((account, roles))
    }

    /// Garantiza que exista una cuenta Admin con ese usuario.
    ///
    /// Devuelve `true` si la cuenta se creó en esta llamada.
    pub async fn ensure_admin(&self, store: &dyn FleetStore, credentials: &Credentials) -> AppResult<bool> {
        let draft = self.prepare(credentials).await?;

        let mut uow = store.begin().await?;
        let result = self.seed_admin(uow.as_mut(), &draft).await;
        unit_of_work::complete(uow, result).await
    }

    async fn load_account(
        uow: &mut dyn UnitOfWork,
        username: &str,
    ) -> AppResult<Option<(Account, Vec<Role>)>> {
        let Some(account) = uow.find_account_by_username(username).await? else {
            return Ok(None);
        };
        let roles = uow.account_roles(account.id).await?;
        Ok(Some((account, roles)))
    }

    async fn seed_admin(&self, uow: &mut dyn UnitOfWork, draft: &AccountDraft) -> AppResult<bool> {
        match uow.find_account_by_username(&draft.username).await? {
            Some(account) => {
                self.assign_role(uow, account.id, Role::Admin).await?;
                Ok(false)
            }
            None => {
                let account = self.create_account(uow, draft).await?;
                self.assign_role(uow, account.id, Role::Admin).await?;
                Ok(true)
            }
        }
    }

    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }
}
