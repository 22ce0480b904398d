// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! JWT claims carried by issued credentials.

use serde::{Deserialize, Serialize};

/// Claims encoded into every issued credential.
///
/// The credential is stateless: it is never persisted server-side and is
/// verified solely by signature and expiry. `uid` is the canonical subject
/// identity; `phone` and `name` are auxiliary display claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user id)
    pub uid: u64,

    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix seconds)
    pub exp: i64,

    /// Contact phone (auxiliary claim)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Display name (auxiliary claim)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TokenClaims {
    /// Seconds of lifetime left at `now` (negative once expired).
    pub fn remaining_seconds(&self, now: chrono::DateTime<chrono::Utc>) -> i64 {
        self.exp - now.timestamp()
    }
}

/// Identity resolved by the admin gate and attached to the request for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    /// Administrator's user id
    pub user_id: u64,
    /// Administrator's display name
    pub real_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn remaining_seconds_counts_down() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = TokenClaims {
            uid: 7,
            iat: now.timestamp() - 10,
            exp: now.timestamp() + 90,
            phone: None,
            name: None,
        };
        assert_eq!(claims.remaining_seconds(now), 90);
        assert!(claims.remaining_seconds(now + chrono::Duration::seconds(100)) < 0);
    }

    #[test]
    fn aux_claims_are_optional_on_the_wire() {
        let json = r#"{"uid":3,"iat":1,"exp":2}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.uid, 3);
        assert!(claims.phone.is_none());
        assert!(claims.name.is_none());
    }
}
