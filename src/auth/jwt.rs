//! JWT token management
//!
//! Issues and verifies HS256 access tokens. The claims carry the permission
//! level and the linked time tracker so that coarse authorization needs no
//! store lookup.

use crate::auth::Permissions;
use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: String,
    #[serde(rename = "timeTrackerId")]
    pub time_tracker_id: Option<String>,
    pub username: String,
    pub email: String,
    /// Permission bitmask as an integer
    pub x_permission_level: u32,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn permissions(&self) -> Permissions {
        Permissions::from_level(self.x_permission_level)
    }
}

/// Identity fields a token is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: String,
    pub time_tracker_id: Option<String>,
    pub username: String,
    pub email: String,
    pub permission_level: Permissions,
}

/// A token that failed verification. Keeps the `jsonwebtoken` cause.
#[derive(Debug, Error)]
#[error("invalid token: {0}")]
pub struct InvalidToken(#[source] jsonwebtoken::errors::Error);

impl InvalidToken {
    pub fn is_expired(&self) -> bool {
        matches!(self.0.kind(), ErrorKind::ExpiredSignature)
    }
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: std::time::Duration) -> Result<Self, AppError> {
        let ttl = Duration::from_std(ttl)
            .map_err(|e| AppError::Config(format!("Access token lifetime out of range: {}", e)))?;
        if Utc::now().checked_add_signed(ttl).is_none() {
            return Err(AppError::Config(
                "Access token lifetime reaches past the representable date range".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Self::new(&config.access_token_secret, config.access_token_life)
    }

    /// Issue an access token valid for the configured lifetime
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: subject.user_id.clone(),
            time_tracker_id: subject.time_tracker_id.clone(),
            username: subject.username.clone(),
            email: subject.email.clone(),
            x_permission_level: subject.permission_level.level(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .ok_or_else(|| AppError::Internal("Access token expiry overflowed".to_string()))?
                .timestamp(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
    }

    /// Decode and validate a token
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(InvalidToken)
    }
}
