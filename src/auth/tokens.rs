//! JWT access/refresh token creation and verification.
//!
//! The platform issues two tokens per session: a short-lived access token that
//! carries identity claims, and a longer-lived refresh token signed with a
//! separate secret. The refresh token currently honored for a user is also
//! persisted on the user row; presenting any other (even validly signed)
//! refresh token is rejected at the handler layer.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, errors::Error, types::UserId};

/// Claims carried by the access token
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,      // Subject (user ID)
    pub username: String, // Username
    pub email: String,    // User email
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
}

/// Claims carried by the refresh token
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

fn access_secret(config: &Config) -> Result<&str, Error> {
    config.auth.access.secret.as_deref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: auth.access.secret is required".to_string(),
    })
}

fn refresh_secret(config: &Config) -> Result<&str, Error> {
    config.auth.refresh.secret.as_deref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: auth.refresh.secret is required".to_string(),
    })
}

/// Create an access token for a user
pub fn create_access_token(id: UserId, username: &str, email: &str, config: &Config) -> Result<String, Error> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: id,
        username: username.to_string(),
        email: email.to_string(),
        exp: (now + config.auth.access.ttl).timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(access_secret(config)?.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create access JWT: {e}"),
    })
}

/// Create a refresh token for a user
pub fn create_refresh_token(id: UserId, config: &Config) -> Result<String, Error> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: id,
        exp: (now + config.auth.refresh.ttl).timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(refresh_secret(config)?.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create refresh JWT: {e}"),
    })
}

/// Verify and decode an access token
pub fn verify_access_token(token: &str, config: &Config) -> Result<AccessClaims, Error> {
    decode_token(token, access_secret(config)?)
}

/// Verify and decode a refresh token
pub fn verify_refresh_token(token: &str, config: &Config) -> Result<RefreshClaims, Error> {
    decode_token(token, refresh_secret(config)?)
}

fn decode_token<C: serde::de::DeserializeOwned>(token: &str, secret: &str) -> Result<C, Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<C>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        // Catch-all for any future error variants (default to server error for safety)
        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    Ok(token_data.claims)
}
