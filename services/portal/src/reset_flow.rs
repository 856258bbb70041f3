//! Password reset flow
//!
//! ```text
//!   Idle ──request_reset──▶ RequestSent ──resend──▶ Idle
//!
//!   (code in link) AwaitingNewSecret ──confirm──▶ Completed
//! ```
//!
//! Each transition performs at most one upstream call. Failed calls keep
//! the current state and attach the message to show; nothing propagates
//! as an error.

use tracing::{error, info, warn};

use crate::{
    credentials::{AuthApi, ForgotPasswordRequest, ResetPasswordRequest},
    validation::{validate_email, validate_new_secret},
};

/// Shown when the reset email could not be sent
pub const SEND_FAILED: &str = "Erro ao enviar e-mail. Tente novamente.";
/// Shown when setting the new password fails without a server message
pub const RESET_FAILED: &str = "Erro ao redefinir a senha.";

/// Where the user is in the reset flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetState {
    /// Asking for the account email
    Idle { email: String, error: Option<String> },
    /// Instructions were emailed
    RequestSent { email: String },
    /// Reset link followed; asking for the new password
    AwaitingNewSecret { code: String, error: Option<String> },
    /// Password changed
    Completed,
}

impl ResetState {
    /// Entry state for a page visit, keyed on the link's reset code
    pub fn initial(code: Option<&str>) -> Self {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => ResetState::AwaitingNewSecret {
                code: code.to_string(),
                error: None,
            },
            None => ResetState::Idle {
                email: String::new(),
                error: None,
            },
        }
    }

    /// Ask the CMS to email reset instructions
    pub async fn request_reset<A>(self, api: &A, email: &str) -> Self
    where
        A: AuthApi + ?Sized,
    {
        if !matches!(self, ResetState::Idle { .. }) {
            warn!("Ignoring reset request outside of the idle state");
            return self;
        }

        let email = email.trim().to_string();
        if let Err(message) = validate_email(&email) {
            return ResetState::Idle {
                email,
                error: Some(message),
            };
        }

        let request = ForgotPasswordRequest {
            email: email.clone(),
        };

        match api.forgot_password(&request).await {
            Ok(()) => {
                info!("Password reset email requested");
                ResetState::RequestSent { email }
            }
            Err(e) => {
                error!("Failed to request password reset: {}", e);
                ResetState::Idle {
                    email,
                    error: Some(SEND_FAILED.to_string()),
                }
            }
        }
    }

    /// Go back to the email form, keeping the address, without a network call
    pub fn resend(self) -> Self {
        match self {
            ResetState::RequestSent { email } => ResetState::Idle { email, error: None },
            other => other,
        }
    }

    /// Submit the new password with the reset code
    pub async fn confirm<A>(self, api: &A, new_secret: &str, confirmation: &str) -> Self
    where
        A: AuthApi + ?Sized,
    {
        let code = match self {
            ResetState::AwaitingNewSecret { code, .. } => code,
            other => {
                warn!("Ignoring password confirmation without a reset code");
                return other;
            }
        };

        if let Err(e) = validate_new_secret(new_secret, confirmation) {
            return ResetState::AwaitingNewSecret {
                code,
                error: Some(e.to_string()),
            };
        }

        let request = ResetPasswordRequest {
            code: code.clone(),
            password: new_secret.to_string(),
            password_confirmation: confirmation.to_string(),
        };

        let message = match api.reset_password(&request).await {
            Ok(response) if response.token().is_some() => {
                info!("Password reset completed");
                return ResetState::Completed;
            }
            Ok(response) => response.error_message().unwrap_or(RESET_FAILED).to_string(),
            Err(e) => {
                error!("Password reset request failed: {}", e);
                RESET_FAILED.to_string()
            }
        };

        ResetState::AwaitingNewSecret {
            code,
            error: Some(message),
        }
    }

    /// Inline error of the current state
    pub fn error(&self) -> Option<&str> {
        match self {
            ResetState::Idle { error, .. } | ResetState::AwaitingNewSecret { error, .. } => {
                error.as_deref()
            }
            ResetState::RequestSent { .. } | ResetState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ResetState::Completed)
    }
}
