// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! # Authentication Module
//!
//! Stateless JWT authentication for the aggregator API.
//!
//! ## Auth Flow
//!
//! 1. Client obtains a credential via OTP login (`/api/auth/login`)
//! 2. Client sends `Authorization: Bearer <token>` on every request
//! 3. Server:
//!    - [`refresh::refresh_gate`] verifies the credential and, when it is
//!      close to expiry, attaches a replacement via the `X-New-Token`
//!      response header
//!    - [`admin::admin_gate`] additionally requires the administrator role
//!      for the reserved `/api/admin` namespace
//!
//! ## Security
//!
//! - HS256 with a symmetric secret shared by issuer and verifier
//! - Credentials are never persisted server-side; verification is signature
//!   plus expiry only
//! - Gates fail closed: decode errors and missing accounts reject
//! - The signing secret is never logged

use axum::http::{header::AUTHORIZATION, HeaderMap};

pub mod admin;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod refresh;
pub mod roles;
pub mod token;

pub use admin::{admin_gate, AdminUser, ADMIN_PATH_PREFIX};
pub use claims::{AdminIdentity, TokenClaims};
pub use error::AuthError;
pub use extractor::CurrentUser;
pub use refresh::{refresh_gate, REFRESHED_TOKEN_HEADER};
pub use roles::Role;
pub use token::{AuthRuntime, IssuedToken, TokenCodec, TokenIssuer};

/// Extract the bearer token from the `Authorization` header, if present.
///
/// Returns `None` for a missing header; a present but non-Bearer header is
/// also treated as absent, matching the pass-through behavior of the refresh
/// gate for anonymous requests.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_absent_without_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn bearer_token_rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
