// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! # Landlord Workflow
//!
//! State machine for the landlord role request:
//!
//! ```text
//! None ──submit──▶ Pending ──approve──▶ Approved
//!   ▲                 │
//!   │              reject
//!   └── resubmit ──▶ Rejected
//! ```
//!
//! An administrator decision moves the requester and cascades the matching
//! state to every workspace they own, atomically (see
//! [`crate::storage::Database::apply_landlord_transition`]).
//!
//! Under [`TransitionPolicy::Strict`] a decision requires the request to be
//! `Pending`; [`TransitionPolicy::Legacy`] applies decisions from any state,
//! preserving the pre-hardening behavior for deployments that relied on it.

use crate::models::{RoleRequestStatus, UserAccount, UserStatusChanged, Workspace, WorkspaceForm, WorkspaceStatus};
use crate::storage::{Database, StoreResult};

/// States a new or repeated submit may start from.
const SUBMIT_FROM: &[RoleRequestStatus] = &[RoleRequestStatus::None, RoleRequestStatus::Rejected];

/// States a strict approve/reject decision may start from.
const DECIDE_FROM: &[RoleRequestStatus] = &[RoleRequestStatus::Pending];

/// Precondition mode for administrator decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Approve/reject only from `Pending`; anything else is a conflict.
    #[default]
    Strict,
    /// Approve/reject from any state (including re-deciding a decided
    /// request). Matches the behavior before preconditions were enforced.
    Legacy,
}

/// The landlord role-request workflow over a store handle.
pub struct LandlordWorkflow<'a> {
    db: &'a Database,
    policy: TransitionPolicy,
}

impl<'a> LandlordWorkflow<'a> {
    pub fn new(db: &'a Database, policy: TransitionPolicy) -> Self {
        Self { db, policy }
    }

    /// Submit a landlord request with the applicant's first workspace.
    ///
    /// Allowed from `None` and `Rejected` (a rejected applicant may try
    /// again); a repeat submit while `Pending` or after approval is a
    /// conflict.
    pub fn submit(
        &self,
        user_id: u64,
        form: &WorkspaceForm,
    ) -> StoreResult<(UserAccount, Workspace)> {
        let (user, workspace) = self.db.submit_landlord_request(user_id, form, SUBMIT_FROM)?;
        tracing::info!(
            user_id,
            workspace_id = workspace.id,
            "landlord request submitted"
        );
        Ok((user, workspace))
    }

    /// Approve a pending request: the user becomes an approved landlord and
    /// every workspace they own becomes `Approved`.
    pub fn approve(&self, user_id: u64) -> StoreResult<UserStatusChanged> {
        self.decide(user_id, RoleRequestStatus::Approved, WorkspaceStatus::Approved)
    }

    /// Reject a pending request: the user may resubmit later; every workspace
    /// they own becomes `Rejected`.
    pub fn reject(&self, user_id: u64) -> StoreResult<UserStatusChanged> {
        self.decide(user_id, RoleRequestStatus::Rejected, WorkspaceStatus::Rejected)
    }

    /// List users whose landlord request is in the given state.
    pub fn landlords_by_status(&self, status: RoleRequestStatus) -> StoreResult<Vec<UserAccount>> {
        self.db.users_by_landlord_status(status)
    }

    fn decide(
        &self,
        user_id: u64,
        new_status: RoleRequestStatus,
        workspace_status: WorkspaceStatus,
    ) -> StoreResult<UserStatusChanged> {
        let allowed_from = match self.policy {
            TransitionPolicy::Strict => Some(DECIDE_FROM),
            TransitionPolicy::Legacy => None,
        };
        let (record, cascaded) =
            self.db
                .apply_landlord_transition(user_id, new_status, workspace_status, allowed_from)?;
        tracing::info!(
            user_id,
            old_status = %record.old_status,
            new_status = %record.new_status,
            cascaded_workspaces = cascaded,
            "landlord request decided"
        );
        Ok(record)
    }
}
