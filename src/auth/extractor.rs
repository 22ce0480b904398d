// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Axum extractor for authenticated users.
//!
//! Use `CurrentUser` in handlers that require a signed-in subject:
//!
//! ```rust,ignore
//! async fn my_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     // user is the caller's UserAccount
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::AuthError;
use crate::models::UserAccount;
use crate::state::AppState;
use crate::storage::StoreError;

/// Extractor resolving the bearer credential to the caller's account.
///
/// The refresh gate has already rejected expired or tampered credentials by
/// the time a handler runs; this extractor re-decodes the token (cheap, no
/// I/O beyond the account load) and fails closed if the account is gone.
pub struct CurrentUser(pub UserAccount);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = super::bearer_token(&parts.headers).ok_or(AuthError::MissingAuthHeader)?;
        let claims = state.auth.codec().decode(token)?;

        let user = state.db.user(claims.uid).map_err(|e| match e {
            StoreError::NotFound(_) => AuthError::UnknownSubject,
            other => AuthError::InternalError(other.to_string()),
        })?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn current_user_requires_auth_header() {
        let state = crate::state::tests::test_state();
        let mut parts = Request::builder()
            .uri("/api/users/me")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn current_user_resolves_account() {
        let state = crate::state::tests::test_state();
        let user = state
            .db
            .create_user("+79990000001", "Alice", [crate::auth::Role::Customer])
            .unwrap();
        let issued = state.auth.issuer().issue(&user).unwrap();

        let mut parts = Request::builder()
            .uri("/api/users/me")
            .header("Authorization", format!("Bearer {}", issued.token))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let CurrentUser(resolved) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn current_user_fails_closed_for_unknown_subject() {
        let state = crate::state::tests::test_state();
        let ghost = crate::auth::token::tests::sample_user(999);
        let issued = state.auth.issuer().issue(&ghost).unwrap();

        let mut parts = Request::builder()
            .uri("/api/users/me")
            .header("Authorization", format!("Bearer {}", issued.token))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownSubject)));
    }
}
