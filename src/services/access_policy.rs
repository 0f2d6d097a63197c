//! Evaluador de políticas de acceso
//!
//! Deriva el conjunto de roles de un token y decide si un conjunto de roles
//! basta para una acción. Nunca propaga errores de decodificación: un token
//! ilegible equivale a "sin roles".

use std::collections::BTreeSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Role;

/// Clave con espacio de nombres del claim de rol
pub const ROLE_CLAIM_NAMESPACED: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
/// Clave corta del claim de rol
pub const ROLE_CLAIM_SHORT: &str = "role";

pub type RoleSet = BTreeSet<Role>;

/// Valor del claim de rol: uno o varios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    fn names(&self) -> Vec<&str> {
        match self {
            RoleClaim::One(name) => vec![name.as_str()],
            RoleClaim::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Fallos al leer el payload de un token
#[derive(Debug, Error)]
pub enum AuthDecodeError {
    #[error("token must have three dot-separated segments")]
    Malformed,

    #[error("payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Decodifica el payload de un JWT sin verificar la firma
pub fn decode_payload(token: &str) -> Result<Value, AuthDecodeError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthDecodeError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let value: Value = serde_json::from_slice(&bytes)?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(AuthDecodeError::NotAnObject)
    }
}

/// Roles presentes en un payload ya decodificado.
///
/// Se lee la clave con espacio de nombres y, si falta, la clave corta `role`.
/// El valor puede ser un string o una lista; los nombres desconocidos se ignoran.
pub fn roles_from_claims(payload: &Value) -> RoleSet {
    let claim = payload
        .get(ROLE_CLAIM_NAMESPACED)
        .filter(|v| !v.is_null())
        .or_else(|| payload.get(ROLE_CLAIM_SHORT));

    let Some(claim) = claim else {
        return RoleSet::new();
    };

    let claim = match RoleClaim::deserialize(claim) {
        Ok(claim) => claim,
        Err(e) => {
            tracing::debug!("🔑 Claim de rol ilegible: {}", e);
            return RoleSet::new();
        }
    };

    claim
        .names()
        .into_iter()
        .filter_map(|name| match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!("🔑 Rol ignorado: {}", e);
                None
            }
        })
        .collect()
}

/// Conjunto de roles de un token; vacío ante cualquier fallo
pub fn derive_roles(token: &str) -> RoleSet {
    match decode_payload(token) {
        Ok(payload) => roles_from_claims(&payload),
        Err(e) => {
            tracing::debug!("🔑 No se pudo decodificar el token: {}", e);
            RoleSet::new()
        }
    }
}

/// `required` vacío acepta cualquier actor autenticado
pub fn is_authorized(roles: &RoleSet, required: &[Role]) -> bool {
    required.is_empty() || required.iter().any(|role| roles.contains(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unsigned_token(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_scalar_role_claim() {
        let token = unsigned_token(&json!({ "role": "Admin" }));
        assert_eq!(derive_roles(&token), RoleSet::from([Role::Admin]));
    }

    #[test]
    fn test_list_role_claim() {
        let token = unsigned_token(&json!({ "role": ["Admin", "Driver"] }));
        assert_eq!(derive_roles(&token), RoleSet::from([Role::Admin, Role::Driver]));
    }

    #[test]
    fn test_namespaced_claim_takes_precedence() {
        let payload = json!({ ROLE_CLAIM_NAMESPACED: "Driver", "role": "Admin" });
        assert_eq!(roles_from_claims(&payload), RoleSet::from([Role::Driver]));
    }

    #[test]
    fn test_unknown_role_names_are_ignored() {
        let payload = json!({ "role": ["Driver", "Mechanic"] });
        assert_eq!(roles_from_claims(&payload), RoleSet::from([Role::Driver]));
    }

    #[test]
    fn test_unparseable_tokens_yield_no_roles() {
        assert!(derive_roles("").is_empty());
        assert!(derive_roles("not-a-token").is_empty());
        assert!(derive_roles("a.%%%.c").is_empty());
        assert!(derive_roles(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("not json"))).is_empty());
        assert!(derive_roles(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("[1,2]"))).is_empty());
    }

    #[test]
    fn test_missing_or_malformed_claim_yields_no_roles() {
        assert!(roles_from_claims(&json!({ "sub": "1" })).is_empty());
        assert!(roles_from_claims(&json!({ "role": 42 })).is_empty());
        assert!(roles_from_claims(&json!({ "role": [1, 2] })).is_empty());
    }

    #[test]
    fn test_is_authorized() {
        let driver = RoleSet::from([Role::Driver]);
        let boss = RoleSet::from([Role::Admin, Role::Driver]);

        assert!(is_authorized(&driver, &[]));
        assert!(is_authorized(&driver, &[Role::Driver]));
        assert!(!is_authorized(&driver, &[Role::Admin]));
        assert!(is_authorized(&boss, &[Role::Admin]));
        assert!(is_authorized(&driver, &[Role::Admin, Role::Driver]));
    }
}
