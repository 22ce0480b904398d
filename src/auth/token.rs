// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Token codec and issuer (HS256, symmetric secret).
//!
//! The codec turns claims into signed strings and back; the issuer mints new
//! credentials with a fixed time-to-live. Both are side-effect free; a
//! credential's existence implies cryptographic integrity, and decoding fails
//! closed on any mismatch.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::TokenClaims;
use super::AuthError;
use crate::models::UserAccount;

/// Encodes and decodes signed, time-bound credentials.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the shared symmetric secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is an exact boundary here; the refresh gate handles
        // near-expiry proactively, so no leeway is granted.
        validation.leeway = 0;
        validation.validate_aud = false;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign claims into a credential string.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    /// Verify and decode a credential string.
    ///
    /// Any signature mismatch, truncation, or unparseable timestamp yields a
    /// rejection, never a partial result.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

/// A freshly minted credential together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed credential string
    pub token: String,
    /// Claims the credential carries
    pub claims: TokenClaims,
}

/// Mints credentials with a fixed time-to-live.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, ttl: Duration) -> Self {
        Self { codec, ttl }
    }

    /// The codec this issuer signs with (shared with every verifier).
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a credential for `user`, valid for the configured TTL from now.
    pub fn issue(&self, user: &UserAccount) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a credential as of a given instant.
    ///
    /// Two calls at different instants produce different credentials (the
    /// issued-at differs); this is intentional.
    pub fn issue_at(&self, user: &UserAccount, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            uid: user.id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            phone: Some(user.phone.clone()),
            name: Some(user.real_name.clone()),
        };
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }
}

/// Everything the request gates need: the issuer (with its codec) plus the
/// sliding-window refresh threshold.
pub struct AuthRuntime {
    issuer: TokenIssuer,
    /// Remaining-lifetime cutoff below which a credential is replaced
    pub refresh_threshold: Duration,
}

impl AuthRuntime {
    pub fn new(secret: &str, ttl: Duration, refresh_threshold: Duration) -> Self {
        Self {
            issuer: TokenIssuer::new(TokenCodec::new(secret), ttl),
            refresh_threshold,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn codec(&self) -> &TokenCodec {
        self.issuer.codec()
    }
}
