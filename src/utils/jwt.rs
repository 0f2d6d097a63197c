//! Utilidades JWT
//!
//! Emisión y verificación de los tokens de sesión. El claim de rol se emite
//! con la clave con espacio de nombres: un string si hay un rol, una lista
//! si hay varios.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::environment::EnvironmentConfig;
use crate::models::Role;
use crate::services::access_policy::RoleClaim;
use crate::utils::errors::AppError;

/// Claims del JWT emitido al iniciar sesión
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// id de la cuenta
    pub sub: String,
    pub unique_name: String,
    #[serde(rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role", skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
    pub exp: usize,
    pub iat: usize,
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Token emitido junto con su caducidad
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Generar JWT token para una cuenta
pub fn generate_token(
    account_id: i32,
    username: &str,
    roles: &[Role],
    config: &JwtConfig,
) -> Result<IssuedToken, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let role = match roles {
        [] => None,
        [single] => Some(RoleClaim::One(single.as_str().to_string())),
        many => Some(RoleClaim::Many(
            many.iter().map(|r| r.as_str().to_string()).collect(),
        )),
    };

    let claims = JwtClaims {
        sub: account_id.to_string(),
        unique_name: username.to_string(),
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
}

/// Verificar firma y caducidad; devuelve el payload completo
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<serde_json::Value, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<serde_json::Value>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token must not be empty".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::access_policy::{roles_from_claims, ROLE_CLAIM_NAMESPACED};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn test_single_role_is_a_string_claim() {
        let issued = generate_token(7, "jan@example.com", &[Role::Driver], &config()).unwrap();
        let claims = verify_token(&issued.token, &config()).unwrap();

        assert_eq!(claims[ROLE_CLAIM_NAMESPACED], "Driver");
        assert_eq!(claims["sub"], "7");
        assert_eq!(claims["unique_name"], "jan@example.com");
    }

    #[test]
    fn test_several_roles_are_a_list_claim() {
        let issued =
            generate_token(1, "boss@example.com", &[Role::Admin, Role::Driver], &config()).unwrap();
        let claims = verify_token(&issued.token, &config()).unwrap();

        assert!(claims[ROLE_CLAIM_NAMESPACED].is_array());
        assert_eq!(roles_from_claims(&claims).len(), 2);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = generate_token(1, "a@example.com", &[Role::Admin], &config()).unwrap();
        let other = JwtConfig {
            secret: "other".to_string(),
            expiration: 3600,
        };
        assert!(matches!(verify_token(&issued.token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
