//! Middleware de autenticación JWT
//!
//! Verifica la firma y caducidad del token, deriva los roles de sus claims y
//! deja un [`AuthenticatedUser`] en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    models::Role,
    services::access_policy::{is_authorized, roles_from_claims, RoleSet},
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError, AppResult},
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: i32,
    pub username: String,
    pub roles: RoleSet,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Forbidden si no tiene ninguno de los roles pedidos
    pub fn require(&self, roles: &[Role]) -> AppResult<()> {
        if is_authorized(&self.roles, roles) {
            return Ok(());
        }

        let expected: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(forbidden_error(
            "access this resource",
            &format!("requires role {}", expected.join(" or ")),
        ))
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    let account_id = claims["sub"]
        .as_str()
        .and_then(|sub| sub.parse::<i32>().ok())
        .ok_or_else(|| AppError::Unauthorized("Token subject is not a valid account id".to_string()))?;

    let user = AuthenticatedUser {
        account_id,
        username: claims["unique_name"].as_str().unwrap_or_default().to_string(),
        roles: roles_from_claims(&claims),
    };

    tracing::debug!("🔑 {} autenticado con roles {:?}", user.username, user.roles);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
