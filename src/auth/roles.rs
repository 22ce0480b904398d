// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// The role vocabulary is closed and small, so roles are a fixed enum rather
/// than a dynamic collection:
///
/// - `Customer` - normal user, books workspaces
/// - `Landlord` - offers workspaces (granted through the approval workflow)
/// - `Administrator` - drives the approval workflow, may access `/api/admin`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Normal user
    Customer,
    /// Workspace owner
    Landlord,
    /// Full administrative access
    Administrator,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "CUSTOMER" => Some(Role::Customer),
            "LANDLORD" => Some(Role::Landlord),
            "ADMINISTRATOR" => Some(Role::Administrator),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is Customer (least privilege).
    fn default() -> Self {
        Role::Customer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "CUSTOMER"),
            Role::Landlord => write!(f, "LANDLORD"),
            Role::Administrator => write!(f, "ADMINISTRATOR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(Role::from_str("administrator"), Some(Role::Administrator));
        assert_eq!(Role::from_str("ADMINISTRATOR"), Some(Role::Administrator));
        assert_eq!(Role::from_str("Customer"), Some(Role::Customer));
        assert_eq!(Role::from_str("unknown"), None);
    }

    #[test]
    fn default_role_is_customer() {
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Role::Landlord).unwrap(),
            r#""LANDLORD""#
        );
    }
}
