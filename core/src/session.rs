//! Session lifecycle: login, logout, refresh, profile.
//!
//! # Design
//! Operations the presentation layer drives directly return outcome
//! values instead of errors — a failed login is a normal result with a
//! user-facing message, not an exception. The message is the server's
//! `detail` text when it sent one, otherwise the operation's generic
//! fallback. Everything here is a thin layer over [`ApiClient`], which
//! owns the tokens and the refresh protocol.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::http::{ApiClient, SessionState};
use crate::token::{decode_claims, AccessClaims};
use crate::types::{ProfileUpdate, RegisterData, UserProfile};

/// Result value for user-driven auth operations. Never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl OpOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn fail(error: &ApiError, fallback: &str) -> Self {
        let message = error
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        Self {
            success: false,
            error: Some(message),
        }
    }
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Maintains the one authenticated session.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Re-hydrate the session from durable storage at startup. An
    /// expired or unreadable stored token clears storage and leaves the
    /// session unauthenticated; a valid one restores the session without
    /// touching the network.
    pub fn bootstrap(&self) {
        let Some(stored) = self.client.storage().load() else {
            return;
        };
        match decode_claims(&stored.access_token) {
            Ok(claims) if !claims.is_expired() => {
                debug!(username = %claims.username, "session restored from storage");
                self.client.restore_session(stored, claims);
            }
            Ok(_) => {
                debug!("stored access token expired, clearing tokens");
                self.client.storage().clear();
            }
            Err(e) => {
                warn!(error = %e, "stored access token unreadable, clearing tokens");
                self.client.storage().clear();
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> OpOutcome {
        #[derive(Serialize)]
        struct Credentials<'a> {
            username: &'a str,
            password: &'a str,
        }

        let url = self.client.url("/api/token/");
        let body = Credentials { username, password };
        let result: Result<TokenPair, ApiError> = self
            .client
            .request_json(|http| http.post(url.as_str()).json(&body))
            .await;

        match result {
            Ok(pair) => match self.client.install_session(pair.access, pair.refresh) {
                Ok(claims) => {
                    info!(username = %claims.username, "login succeeded");
                    OpOutcome::ok()
                }
                Err(e) => {
                    error!(error = %e, "login returned an undecodable access token");
                    OpOutcome::fail(&e, "Erro ao fazer login")
                }
            },
            Err(e) => {
                error!(error = %e, "login failed");
                OpOutcome::fail(&e, "Erro ao fazer login")
            }
        }
    }

    /// Clears the session from memory and durable storage. Idempotent.
    pub fn logout(&self) {
        self.client.clear_session();
    }

    /// Force a token refresh. Fails if no refresh token is stored or the
    /// refresh call is rejected; failure logs the session out as a side
    /// effect and returns the error.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        self.client.refresh_access().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Claims of the current access token, when authenticated.
    pub fn current_user(&self) -> Option<AccessClaims> {
        self.client.claims()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.client.watch_state()
    }

    pub async fn register(&self, data: &RegisterData) -> OpOutcome {
        let url = self.client.url("/api/register/");
        match self
            .client
            .request_unit(|http| http.post(url.as_str()).json(data))
            .await
        {
            Ok(()) => OpOutcome::ok(),
            Err(e) => {
                error!(error = %e, "registration failed");
                OpOutcome::fail(&e, "Erro ao realizar cadastro")
            }
        }
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let url = self.client.url("/api/user/");
        self.client
            .request_json(|http| http.get(url.as_str()))
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> bool {
        let url = self.client.url("/api/user/");
        match self
            .client
            .request_unit(|http| http.put(url.as_str()).json(update))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "profile update failed");
                false
            }
        }
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> OpOutcome {
        #[derive(Serialize)]
        struct ChangePassword<'a> {
            old_password: &'a str,
            new_password: &'a str,
        }

        let url = self.client.url("/api/change-password/");
        let body = ChangePassword {
            old_password,
            new_password,
        };
        match self
            .client
            .request_unit(|http| http.post(url.as_str()).json(&body))
            .await
        {
            Ok(()) => OpOutcome::ok(),
            Err(e) => {
                error!(error = %e, "password change failed");
                OpOutcome::fail(&e, "Erro ao alterar senha")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::{MemoryTokenStorage, StoredTokens, TokenStorage};
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::sync::Arc;

    fn token(exp_offset: i64) -> String {
        let claims = AccessClaims {
            exp: Utc::now().timestamp() + exp_offset,
            user_id: 1,
            username: "admin".to_string(),
            email: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test"),
        )
        .unwrap()
    }

    fn store_with(storage: Arc<MemoryTokenStorage>) -> SessionStore {
        let client = ApiClient::new(
            ApiConfig::new("http://localhost:8000"),
            storage as Arc<dyn TokenStorage>,
        )
        .unwrap();
        SessionStore::new(client)
    }

    #[test]
    fn bootstrap_restores_a_valid_session() {
        let storage = Arc::new(MemoryTokenStorage::new());
        storage.store(&StoredTokens {
            access_token: token(3600),
            refresh_token: "refresh".to_string(),
        });
        let session = store_with(storage);
        session.bootstrap();
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().username, "admin");
    }

    #[test]
    fn bootstrap_clears_an_expired_session() {
        let storage = Arc::new(MemoryTokenStorage::new());
        storage.store(&StoredTokens {
            access_token: token(-300),
            refresh_token: "refresh".to_string(),
        });
        let session = store_with(storage.clone());
        session.bootstrap();
        assert!(!session.is_authenticated());
        assert!(storage.load().is_none());
    }

    #[test]
    fn bootstrap_clears_unreadable_tokens() {
        let storage = Arc::new(MemoryTokenStorage::new());
        storage.store(&StoredTokens {
            access_token: "garbage".to_string(),
            refresh_token: "refresh".to_string(),
        });
        let session = store_with(storage.clone());
        session.bootstrap();
        assert!(!session.is_authenticated());
        assert!(storage.load().is_none());
    }

    #[test]
    fn bootstrap_with_empty_storage_is_a_no_op() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = store_with(storage);
        session.bootstrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn logout_is_idempotent() {
        let storage = Arc::new(MemoryTokenStorage::new());
        storage.store(&StoredTokens {
            access_token: token(3600),
            refresh_token: "refresh".to_string(),
        });
        let session = store_with(storage.clone());
        session.bootstrap();
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
        assert!(storage.load().is_none());
    }

    #[test]
    fn outcome_prefers_the_server_detail() {
        let err = ApiError::Api {
            status: 400,
            detail: Some("invalid credentials".to_string()),
        };
        let outcome = OpOutcome::fail(&err, "Erro ao fazer login");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("invalid credentials"));
    }

    #[test]
    fn outcome_falls_back_without_detail() {
        let outcome = OpOutcome::fail(&ApiError::Unauthorized, "Erro ao fazer login");
        assert_eq!(outcome.error.as_deref(), Some("Erro ao fazer login"));
    }
}
