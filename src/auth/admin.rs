// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Admin gate: restricts the reserved `/api/admin` namespace to subjects
//! holding the administrator role.
//!
//! The gate applies only to requests whose path falls under the reserved
//! prefix; every other path passes through untouched. It must be layered so
//! the refresh gate runs first: a near-expiry admin token is still refreshed,
//! and this gate only ever sees credentials already confirmed non-expired.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::claims::AdminIdentity;
use super::AuthError;
use crate::state::AppState;
use crate::storage::StoreError;

/// Reserved URL-path namespace requiring the administrator role.
pub const ADMIN_PATH_PREFIX: &str = "/api/admin";

/// Admin gate middleware.
///
/// For matching paths: require a present, decodable credential (401), resolve
/// the subject's account (missing account fails closed, 401), require the
/// administrator role (403), then attach the resolved identity to the request
/// for downstream handlers.
pub async fn admin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !request.uri().path().starts_with(ADMIN_PATH_PREFIX) {
        return Ok(next.run(request).await);
    }

    let token = super::bearer_token(request.headers())
        .ok_or(AuthError::MissingAuthHeader)?
        .to_owned();
    let claims = state.auth.codec().decode(&token)?;

    let user = state.db.user(claims.uid).map_err(|e| match e {
        StoreError::NotFound(_) => AuthError::UnknownSubject,
        other => AuthError::InternalError(other.to_string()),
    })?;

    if !user.is_admin() {
        tracing::warn!(user_id = user.id, path = %request.uri().path(), "admin access denied");
        return Err(AuthError::AdminRequired);
    }

    request.extensions_mut().insert(AdminIdentity {
        user_id: user.id,
        real_name: user.real_name,
    });
    Ok(next.run(request).await)
}

/// Extractor handing admin handlers the identity resolved by [`admin_gate`].
pub struct AdminUser(pub AdminIdentity);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminIdentity>()
            .cloned()
            .map(AdminUser)
            // Reachable only if a handler is mounted outside the gated
            // namespace; treated as unauthenticated rather than a 500.
            .ok_or(AuthError::MissingAuthHeader)
    }
}
