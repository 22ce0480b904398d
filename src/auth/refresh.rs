// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Sliding-window token refresh gate.
//!
//! Every inbound request passes through this gate. Anonymous requests pass
//! untouched; requests bearing a credential are verified, and credentials
//! close to expiry are replaced proactively so clients never need a separate
//! login round-trip.
//!
//! The refresh decision itself is a pure function over the decoded claims;
//! the middleware wrapper is the transport layer that surfaces the
//! replacement via the [`REFRESHED_TOKEN_HEADER`] response header. That
//! header must be allow-listed for cross-origin exposure (see the CORS layer
//! in `api::router`).
//!
//! Refresh issuance is read-only with respect to account state: concurrent
//! requests from one subject may each mint a replacement, which is safe
//! because credentials are stateless and verified solely by signature and
//! expiry.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};

use super::claims::TokenClaims;
use super::token::IssuedToken;
use super::AuthError;
use crate::state::AppState;
use crate::storage::StoreError;

/// Response header carrying a replacement credential.
///
/// Deliberately distinct from `Authorization`: the caller adopts it for
/// subsequent requests, the current request proceeds with the old credential.
pub const REFRESHED_TOKEN_HEADER: &str = "x-new-token";

/// Outcome of inspecting a (non-expired) credential.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Replacement credential, present when the old one was near expiry
    pub replacement: Option<IssuedToken>,
}

/// Pure refresh decision: should a non-expired credential be replaced now?
pub fn replacement_due(claims: &TokenClaims, now: DateTime<Utc>, threshold: Duration) -> bool {
    claims.remaining_seconds(now) < threshold.num_seconds()
}

/// Inspect the claims and mint a replacement if the remaining lifetime is
/// below the threshold. The account is looked up so the replacement carries
/// current display claims; a vanished account fails closed.
pub fn evaluate(
    state: &AppState,
    claims: &TokenClaims,
    now: DateTime<Utc>,
) -> Result<RefreshOutcome, AuthError> {
    if !replacement_due(claims, now, state.auth.refresh_threshold) {
        return Ok(RefreshOutcome { replacement: None });
    }

    let user = state.db.user(claims.uid).map_err(|e| match e {
        StoreError::NotFound(_) => AuthError::UnknownSubject,
        other => AuthError::InternalError(other.to_string()),
    })?;
    let issued = state.auth.issuer().issue_at(&user, now)?;
    tracing::debug!(user_id = claims.uid, "issued replacement credential");
    Ok(RefreshOutcome {
        replacement: Some(issued),
    })
}

/// Refresh middleware.
///
/// 1. No bearer credential: pass through (authorization, if required, is
///    enforced downstream by the admin gate).
/// 2. Decode failure or expiry: reject with 401 before any business logic.
/// 3. Remaining lifetime below the threshold: attach a replacement to the
///    response.
/// 4. Proceed regardless of whether a refresh occurred.
pub async fn refresh_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = match super::bearer_token(request.headers()) {
        Some(token) => token.to_owned(),
        None => return Ok(next.run(request).await),
    };

    let claims = state.auth.codec().decode(&token)?;
    let outcome = evaluate(&state, &claims, Utc::now())?;

    let mut response = next.run(request).await;
    if let Some(issued) = outcome.replacement {
        let value = HeaderValue::from_str(&issued.token)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        response
            .headers_mut()
            .insert(HeaderName::from_static(REFRESHED_TOKEN_HEADER), value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_remaining(now: DateTime<Utc>, remaining: Duration) -> TokenClaims {
        TokenClaims {
            uid: 7,
            iat: (now - Duration::hours(1)).timestamp(),
            exp: (now + remaining).timestamp(),
            phone: None,
            name: None,
        }
    }

    #[test]
    fn no_replacement_above_threshold() {
        let now = Utc::now();
        let claims = claims_with_remaining(now, Duration::hours(25));
        assert!(!replacement_due(&claims, now, Duration::hours(24)));
    }

    #[test]
    fn replacement_below_threshold() {
        let now = Utc::now();
        let claims = claims_with_remaining(now, Duration::hours(23));
        assert!(replacement_due(&claims, now, Duration::hours(24)));
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let now = Utc::now();
        let claims = claims_with_remaining(now, Duration::hours(24));
        assert!(!replacement_due(&claims, now, Duration::hours(24)));
    }
}
