//! HTTP client with transparent bearer authentication.
//!
//! # Design
//! `ApiClient` is a cheap-to-clone handle (inner `Arc`) created once at
//! application start — the explicit context object that replaces a
//! module-level singleton. It owns the `reqwest` client, the session
//! tokens and the durable token storage, and attaches the bearer header
//! to every request while a session exists.
//!
//! The 401 protocol: a request that comes back 401 while a refresh token
//! is stored suspends, refreshes the access token once, and is replayed
//! exactly once. Refreshing is single-flight — concurrent 401s queue on
//! one gate and only the first caller hits the refresh endpoint; the
//! rest observe the rotated token and skip straight to their replay. A
//! 401 on the replay is conclusive. Transport failures never trigger a
//! refresh. When the refresh call itself fails the session is torn down
//! (memory and durable storage) and the transition is published on the
//! state channel so a protected shell can route back to its login entry.
//!
//! Requests are described by a builder closure rather than a prebuilt
//! request so the replay can construct a fresh request — multipart
//! bodies cannot be cloned after the fact.

use std::sync::{Arc, RwLock};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::storage::{StoredTokens, TokenStorage};
use crate::token::{decode_claims, AccessClaims};

/// The session as the rest of the application observes it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { claims: AccessClaims },
}

#[derive(Debug, Clone)]
struct SessionTokens {
    access: String,
    refresh: String,
    claims: AccessClaims,
}

struct ClientInner {
    http: reqwest::Client,
    config: ApiConfig,
    storage: Arc<dyn TokenStorage>,
    tokens: RwLock<Option<SessionTokens>>,
    refresh_gate: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
}

/// Shared API client handle.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let (state_tx, _) = watch::channel(SessionState::Unauthenticated);
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                storage,
                tokens: RwLock::new(None),
                refresh_gate: Mutex::new(()),
                state_tx,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.config.base_url)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.read().unwrap().is_some()
    }

    pub fn claims(&self) -> Option<AccessClaims> {
        self.inner.tokens.read().unwrap().as_ref().map(|t| t.claims.clone())
    }

    /// Observe session transitions. The receiver always reflects the
    /// latest state; a protected shell watches for `Unauthenticated` to
    /// route back to its login entry.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    fn access_token(&self) -> Option<String> {
        self.inner.tokens.read().unwrap().as_ref().map(|t| t.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.tokens.read().unwrap().as_ref().map(|t| t.refresh.clone())
    }

    pub(crate) fn storage(&self) -> &dyn TokenStorage {
        self.inner.storage.as_ref()
    }

    /// Install a freshly issued token pair, persisting it.
    pub(crate) fn install_session(
        &self,
        access: String,
        refresh: String,
    ) -> Result<AccessClaims, ApiError> {
        let claims = decode_claims(&access)?;
        self.inner.storage.store(&StoredTokens {
            access_token: access.clone(),
            refresh_token: refresh.clone(),
        });
        *self.inner.tokens.write().unwrap() = Some(SessionTokens {
            access,
            refresh,
            claims: claims.clone(),
        });
        self.inner
            .state_tx
            .send_replace(SessionState::Authenticated { claims: claims.clone() });
        debug!(username = %claims.username, "session installed");
        Ok(claims)
    }

    /// Re-adopt tokens already present in durable storage.
    pub(crate) fn restore_session(&self, stored: StoredTokens, claims: AccessClaims) {
        *self.inner.tokens.write().unwrap() = Some(SessionTokens {
            access: stored.access_token,
            refresh: stored.refresh_token,
            claims: claims.clone(),
        });
        self.inner
            .state_tx
            .send_replace(SessionState::Authenticated { claims });
    }

    /// Drop the session from memory and durable storage. Idempotent.
    pub(crate) fn clear_session(&self) {
        let had_session = self.inner.tokens.write().unwrap().take().is_some();
        self.inner.storage.clear();
        self.inner.state_tx.send_replace(SessionState::Unauthenticated);
        if had_session {
            debug!("session cleared");
        }
    }

    /// Execute a request, attaching credentials and running the one-shot
    /// refresh protocol on 401. Returns the response whatever its status.
    pub(crate) async fn send<F>(&self, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut refreshed = false;
        loop {
            let mut request = build(&self.inner.http);
            if let Some(access) = self.access_token() {
                request = request.bearer_auth(access);
            }
            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED && !refreshed {
                let failed = match self.access_token() {
                    Some(access) if self.refresh_token().is_some() => access,
                    // No refresh token to play: the 401 is final.
                    _ => return Err(ApiError::Unauthorized),
                };
                debug!("request returned 401, running refresh protocol");
                self.ensure_refreshed(&failed).await?;
                refreshed = true;
                continue;
            }
            return Ok(response);
        }
    }

    /// Execute a request and deserialize a 2xx JSON body.
    pub(crate) async fn request_json<T, F>(&self, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let response = into_success(self.send(build).await?).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Execute a request, expecting a 2xx with no body of interest.
    pub(crate) async fn request_unit<F>(&self, build: F) -> Result<(), ApiError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        into_success(self.send(build).await?).await?;
        Ok(())
    }

    /// Refresh the access token once, behind the single-flight gate, but
    /// only if `failed_access` is still the current token — a concurrent
    /// request may already have rotated it while we waited.
    async fn ensure_refreshed(&self, failed_access: &str) -> Result<(), ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;
        if self.access_token().as_deref() != Some(failed_access) {
            debug!("token already rotated by a concurrent request");
            return Ok(());
        }
        self.refresh_access_locked().await.map(|_| ())
    }

    /// Exchange the stored refresh token for a new access token. Any
    /// failure tears the session down as a side effect.
    pub(crate) async fn refresh_access(&self) -> Result<String, ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;
        self.refresh_access_locked().await
    }

    async fn refresh_access_locked(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.refresh_token() else {
            self.clear_session();
            return Err(ApiError::MissingRefreshToken);
        };

        let url = self.url("/api/token/refresh/");
        let outcome: Result<(String, AccessClaims), ApiError> = async {
            let response = self
                .inner
                .http
                .post(&url)
                .json(&RefreshRequest { refresh: &refresh })
                .send()
                .await?;
            let response = into_success(response).await?;
            let text = response.text().await?;
            let body: RefreshResponse =
                serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
            let claims = decode_claims(&body.access)?;
            Ok((body.access, claims))
        }
        .await;

        match outcome {
            Ok((access, claims)) => {
                {
                    let mut guard = self.inner.tokens.write().unwrap();
                    match guard.as_mut() {
                        Some(tokens) => {
                            tokens.access = access.clone();
                            tokens.claims = claims.clone();
                        }
                        None => {
                            *guard = Some(SessionTokens {
                                access: access.clone(),
                                refresh,
                                claims: claims.clone(),
                            });
                        }
                    }
                }
                self.inner.storage.update_access(&access);
                self.inner
                    .state_tx
                    .send_replace(SessionState::Authenticated { claims });
                debug!("access token refreshed");
                Ok(access)
            }
            Err(e) => {
                error!(error = %e, "token refresh failed, tearing down session");
                self.clear_session();
                Err(e)
            }
        }
    }
}

/// Map non-2xx statuses into the error taxonomy, extracting the server's
/// `detail` text when it sends one.
async fn into_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}
