//! Utilidades de validación
//!
//! Validadores personalizados para `validator` y la política de contraseñas
//! del sistema de cuentas.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::utils::errors::ValidationReason;

/// Longitud mínima de contraseña
pub const PASSWORD_MIN_LENGTH: usize = 6;

lazy_static! {
    static ref USERNAME_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid username regex");
    static ref LICENSE_PLATE_REGEX: Regex =
        Regex::new(r"^[A-Z0-9][A-Z0-9 \-]{1,10}[A-Z0-9]$").expect("valid plate regex");
    static ref LICENSE_NUMBER_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9/\-]{3,32}$").expect("valid license number regex");
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de matrícula de vehículo (mayúsculas, dígitos, espacios y guiones)
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE_REGEX.is_match(value) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("license plate must be 3-12 upper-case letters, digits, spaces or dashes".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de número de permiso de conducir
pub fn validate_license_number(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_NUMBER_REGEX.is_match(value) {
        let mut error = ValidationError::new("license_number");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("license number must be 3-32 letters, digits, '/' or '-'".into());
        return Err(error);
    }
    Ok(())
}

/// Validar que una distancia no sea negativa
pub fn validate_distance(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("distance must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Los nombres de usuario tienen forma de e-mail
pub fn username_reasons(username: &str) -> Vec<ValidationReason> {
    if USERNAME_REGEX.is_match(username) {
        Vec::new()
    } else {
        vec![ValidationReason::new(
            "InvalidUserName",
            format!("Username '{}' is invalid, it must be an e-mail address", username),
        )]
    }
}

/// Política de contraseñas: devuelve todos los motivos de rechazo a la vez
pub fn password_reasons(password: &str) -> Vec<ValidationReason> {
    let mut reasons = Vec::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        reasons.push(ValidationReason::new(
            "PasswordTooShort",
            format!("Passwords must be at least {} characters", PASSWORD_MIN_LENGTH),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        reasons.push(ValidationReason::new(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        reasons.push(ValidationReason::new(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9')",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        reasons.push(ValidationReason::new(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z')",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        reasons.push(ValidationReason::new(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z')",
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(reasons: Vec<ValidationReason>) -> Vec<String> {
        reasons.into_iter().map(|r| r.code).collect()
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(password_reasons("Kierowca#2026").is_empty());
    }

    #[test]
    fn test_weak_password_lists_every_reason() {
        let codes = codes(password_reasons("abc"));
        assert_eq!(
            codes,
            vec![
                "PasswordTooShort",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresDigit",
                "PasswordRequiresUpper",
            ]
        );
    }

    #[test]
    fn test_username_must_look_like_email() {
        assert!(username_reasons("jan@example.com").is_empty());
        assert_eq!(codes(username_reasons("jan")), vec!["InvalidUserName"]);
        assert_eq!(codes(username_reasons("jan@@example.com")), vec!["InvalidUserName"]);
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("WA 12345").is_ok());
        assert!(validate_license_plate("KR-4F21").is_ok());
        assert!(validate_license_plate("wa 12345").is_err());
        assert!(validate_license_plate("A").is_err());
        assert!(validate_license_plate("ABCDEFGHIJKLMN").is_err());
    }

    #[test]
    fn test_validate_license_number() {
        assert!(validate_license_number("PL-0042/19").is_ok());
        assert!(validate_license_number("x").is_err());
        assert!(validate_license_number("has space").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Jan").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_distance() {
        assert!(validate_distance(&Decimal::new(1250, 1)).is_ok());
        assert!(validate_distance(&Decimal::new(-1, 0)).is_err());
    }
}
