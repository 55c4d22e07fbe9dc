//! Access-token claims handling.
//!
//! # Design
//! The client is not the verifying party — signature validation belongs
//! to the backend. Here the JWT payload is only decoded so the session
//! can read `exp`, the user id and the username, mirroring what the
//! server put into the token at login. Expiry is checked explicitly at
//! re-hydration rather than during decoding, because decoding must also
//! succeed for already-expired tokens (they are what the refresh
//! protocol exists for).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims carried by the access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AccessClaims {
    /// Whether `exp` is in the past.
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Decode the claims of an access token without verifying its signature
/// or expiry.
pub fn decode_claims(token: &str) -> Result<AccessClaims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = jsonwebtoken::decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ApiError::InvalidToken(e.to_string()))?;
    Ok(data.claims)
}
