// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Domain model: user accounts, workspaces, and the landlord role-request
//! state machine vocabulary.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

/// Status of a role request (landlord approval flow).
///
/// A user starts at `None`, moves to `Pending` when they submit a landlord
/// request, and an administrator resolves it to `Approved` or `Rejected`.
/// Re-submission is allowed after a rejection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleRequestStatus {
    /// User never asked for this role
    None,
    /// Asked, admin review pending
    Pending,
    /// Role granted
    Approved,
    /// Request was denied
    Rejected,
}

impl std::fmt::Display for RoleRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleRequestStatus::None => write!(f, "NONE"),
            RoleRequestStatus::Pending => write!(f, "PENDING"),
            RoleRequestStatus::Approved => write!(f, "APPROVED"),
            RoleRequestStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Review status of a workspace.
///
/// A workspace mirrors its owner's landlord status after every workflow
/// operation: the two are updated in the same store transaction and must
/// never diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceStatus {
    /// Submitted together with a landlord request, awaiting review
    UnderReview,
    /// Visible to customers
    Approved,
    /// Hidden after the owner's request was denied
    Rejected,
}

impl std::fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceStatus::UnderReview => write!(f, "UNDER_REVIEW"),
            WorkspaceStatus::Approved => write!(f, "APPROVED"),
            WorkspaceStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserAccount {
    /// Unique user identifier
    pub id: u64,
    /// Contact phone (E.164 or local digits), unique per account
    pub phone: String,
    /// Display name
    pub real_name: String,
    /// Granted roles (closed set, see [`Role`])
    pub roles: BTreeSet<Role>,
    /// State of this user's landlord request
    pub landlord_status: RoleRequestStatus,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Check whether the user holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check whether this user may pass the admin gate.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Administrator)
    }
}

/// Rentable workspace owned by a (prospective) landlord.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Workspace {
    /// Unique workspace identifier
    pub id: u64,
    /// Owning user's id
    pub owner_id: u64,
    /// Display name
    pub name: String,
    pub city: String,
    pub address: String,
    /// Category, e.g. "hair chair" or "massage room"
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hourly rate
    pub price_per_hour: f64,
    /// Minimal rentable slot in minutes
    pub min_rent_minutes: u32,
    /// Review status, cascaded from the owner's landlord status
    pub status: WorkspaceStatus,
    /// When the workspace was created
    pub created_at: DateTime<Utc>,
}

/// Form data for creating a workspace alongside a landlord request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WorkspaceForm {
    pub name: String,
    pub city: String,
    pub address: String,
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_per_hour: f64,
    pub min_rent_minutes: u32,
}

/// Transition record returned by every workflow operation, for audit and
/// notification purposes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserStatusChanged {
    /// User whose request changed state
    pub user_id: u64,
    /// Role the request concerns (always `LANDLORD` today)
    pub role: Role,
    /// State before the operation
    pub old_status: RoleRequestStatus,
    /// State after the operation
    pub new_status: RoleRequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserAccount {
        UserAccount {
            id: 1,
            phone: "+79990001122".to_string(),
            real_name: "Alice".to_string(),
            roles: BTreeSet::from([Role::Customer]),
            landlord_status: RoleRequestStatus::None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn has_role_checks_membership() {
        let mut user = sample_user();
        assert!(user.has_role(Role::Customer));
        assert!(!user.is_admin());

        user.roles.insert(Role::Administrator);
        assert!(user.is_admin());
    }

    #[test]
    fn statuses_serialize_screaming_snake() {
        let json = serde_json::to_string(&RoleRequestStatus::Pending).unwrap();
        assert_eq!(json, r#""PENDING""#);
        let json = serde_json::to_string(&WorkspaceStatus::UnderReview).unwrap();
        assert_eq!(json, r#""UNDER_REVIEW""#);
    }

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(RoleRequestStatus::None.to_string(), "NONE");
        assert_eq!(WorkspaceStatus::Rejected.to_string(), "REJECTED");
    }
}
