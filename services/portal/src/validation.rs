//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum length accepted for a new password
pub const MIN_SECRET_LEN: usize = 6;

/// Why a new password pair was rejected before submission
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretError {
    #[error("Preencha os dois campos de senha.")]
    Missing,

    #[error("A senha deve ter pelo menos 6 caracteres.")]
    TooShort,

    /// The two fields do not match
    #[error("As senhas não coincidem.")]
    Mismatch,
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();

    if email.is_empty() {
        return Err("Informe seu e-mail.".to_string());
    }

    if email.len() > 254 {
        return Err("O e-mail deve ter no máximo 254 caracteres.".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Informe um e-mail válido.".to_string());
    }

    Ok(())
}

/// Validate a new password and its confirmation
///
/// Length is counted in characters, not bytes.
pub fn validate_new_secret(secret: &str, confirmation: &str) -> Result<(), SecretError> {
    if secret.is_empty() || confirmation.is_empty() {
        return Err(SecretError::Missing);
    }

    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(SecretError::TooShort);
    }

    if secret != confirmation {
        return Err(SecretError::Mismatch);
    }

    Ok(())
}

/// Whether a required text field has content
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
