//! Error types for the imobiliária API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers branch on it (the
//! site configuration falls back to its defaults when nothing has been
//! saved yet). `Unauthorized` is reserved for a conclusive authentication
//! failure — a 401 that survived the one-shot refresh protocol. Every
//! other non-2xx response lands in `Api` with the status code and the
//! server's `detail` text when it provides one.

use thiserror::Error;

/// Errors returned by the API client and the domain stores.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS failure, refused
    /// connection, timeout). Never triggers a token refresh.
    #[error("network failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned 404 — the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request after the refresh protocol was
    /// exhausted, or no credentials were available to attach.
    #[error("not authenticated")]
    Unauthorized,

    /// A token refresh was requested but no refresh token is stored.
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The access token payload could not be decoded.
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// The server returned a non-2xx status other than 401/404.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Server-provided `detail` text, when the error carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
