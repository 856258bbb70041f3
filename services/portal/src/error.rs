//! Custom error types for the portal service

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Errors that abort a page render
///
/// Upstream failures never end up here: every page has a fallback for
/// them and shows it inline instead.
#[derive(Error, Debug)]
pub enum PortalError {
    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);

        let message = match self {
            PortalError::Template(_) => "Erro ao montar a página.",
        };

        let body = format!(
            "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\"><title>DealerSpace</title></head>\
             <body><p>{}</p><p><a href=\"/\">Voltar</a></p></body></html>",
            message
        );

        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

/// Type alias for portal results
pub type PortalResult<T> = Result<T, PortalError>;
