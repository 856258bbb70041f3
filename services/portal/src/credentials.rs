//! Credential client for the CMS authentication API
//!
//! Wraps the Strapi `users-permissions` endpoints used by the portal:
//! local login, forgot-password and reset-password.

use async_trait::async_trait;
use common::{
    error::{ClientError, ClientResult},
    http::join_url,
    storage::{SessionStorage, StorageScope},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::session::{DEFAULT_ROLE, Presence, Profile, Session, SessionStore};

/// Message shown when the CMS rejects credentials without saying why
pub const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos.";

/// Request for user login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Request for a password reset email
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request for setting a new password with an emailed code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body returned by the login and reset-password endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub jwt: Option<String>,
    pub user: Option<AuthUser>,
    pub error: Option<ErrorBody>,
}

/// User record embedded in an auth response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthUser {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Media>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Media {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Role {
    pub name: Option<String>,
}

/// CMS error payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

impl AuthResponse {
    /// Issued token, if the call succeeded
    pub fn token(&self) -> Option<&str> {
        self.jwt.as_deref().filter(|t| !t.is_empty())
    }

    /// Server-provided error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

impl AuthUser {
    /// Map the CMS user onto the stored profile snapshot
    pub fn to_profile(&self) -> Profile {
        fn non_blank(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        Profile {
            display_name: non_blank(&self.username)
                .or(non_blank(&self.name))
                .unwrap_or_default()
                .to_string(),
            email: self.email.clone().unwrap_or_default(),
            avatar_url: self
                .avatar
                .as_ref()
                .and_then(|a| non_blank(&a.url))
                .unwrap_or_default()
                .to_string(),
            role: self
                .role
                .as_ref()
                .and_then(|r| non_blank(&r.name))
                .unwrap_or(DEFAULT_ROLE)
                .to_string(),
            presence: Presence::Online,
        }
    }
}

/// CMS authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/local`; the body is returned whatever the status
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse>;

    /// `POST /api/auth/forgot-password`; non-2xx is an error
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> ClientResult<()>;

    /// `POST /api/auth/reset-password`; the body is returned whatever the status
    async fn reset_password(&self, request: &ResetPasswordRequest) -> ClientResult<AuthResponse>;
}

/// Strapi implementation of [`AuthApi`]
#[derive(Clone)]
pub struct StrapiAuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl StrapiAuthClient {
    /// Create a new auth client
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    async fn post_for_body<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<AuthResponse> {
        let url = join_url(&self.base_url, path);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            error!("Undecodable body from {} (status {}): {}", path, status, e);
            ClientError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl AuthApi for StrapiAuthClient {
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.post_for_body("api/auth/local", request).await
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> ClientResult<()> {
        let url = join_url(&self.base_url, "api/auth/forgot-password");
        let response = self.http.post(&url).json(request).send().await.map_err(|e| {
            error!("Forgot-password request failed: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Forgot-password returned {}", status);
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(())
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> ClientResult<AuthResponse> {
        self.post_for_body("api/auth/reset-password", request).await
    }
}

/// Why a login attempt failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Informe e-mail e senha.")]
    MissingCredentials,

    /// Rejected by the CMS, with the message to show
    #[error("{0}")]
    Rejected(String),

    #[error("Não foi possível conectar ao servidor. Tente novamente.")]
    Unavailable,

    #[error("Não foi possível salvar a sessão. Tente novamente.")]
    Storage,
}

/// Exchange identifier and secret for a session
pub async fn submit_credentials<A>(
    api: &A,
    identifier: &str,
    secret: &str,
) -> Result<Session, AuthError>
where
    A: AuthApi + ?Sized,
{
    let identifier = identifier.trim();
    if identifier.is_empty() || secret.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    info!("Login attempt for user: {}", identifier);

    let request = LoginRequest {
        identifier: identifier.to_string(),
        password: secret.to_string(),
    };

    let response = api.login(&request).await.map_err(|e| {
        error!("Login request failed: {}", e);
        AuthError::Unavailable
    })?;

    match response.token() {
        Some(token) => Ok(Session {
            token: token.to_string(),
            profile: response
                .user
                .as_ref()
                .map(AuthUser::to_profile)
                .unwrap_or_else(|| Profile {
                    presence: Presence::Online,
                    ..Profile::anonymous()
                }),
        }),
        None => {
            let message = response.error_message().unwrap_or(INVALID_CREDENTIALS);
            info!("Login rejected for user: {}", identifier);
            Err(AuthError::Rejected(message.to_string()))
        }
    }
}

/// Log in and persist the resulting session in `scope`
pub async fn sign_in<A, S>(
    api: &A,
    store: &SessionStore<S>,
    identifier: &str,
    secret: &str,
    scope: StorageScope,
) -> Result<Session, AuthError>
where
    A: AuthApi + ?Sized,
    S: SessionStorage,
{
    let session = submit_credentials(api, identifier, secret).await?;

    store.save(&session, scope).map_err(|e| {
        error!("Failed to store session: {}", e);
        AuthError::Storage
    })?;

    Ok(session)
}
