// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Embedded store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized UserAccount (JSON bytes)
//! - `phone_index`: phone → user_id
//! - `workspaces`: workspace_id → serialized Workspace (JSON bytes)
//! - `workspace_owner_index`: (owner_id, workspace_id) → ()
//! - `auth_codes`: phone → latest OTP code
//! - `counters`: name → last allocated id
//!
//! The landlord workflow's atomicity contract lives here: a user's
//! role-request transition and the cascade over their workspaces run inside
//! one write transaction, with the precondition evaluated inside that same
//! transaction. Concurrent workflow calls on one user serialize on redb's
//! single-writer transactions; no in-process locking is needed.

use std::path::Path;

use chrono::Utc;
use redb::{Database as RedbDatabase, ReadableDatabase, ReadableTable, TableDefinition};

use crate::auth::Role;
use crate::models::{
    RoleRequestStatus, UserAccount, UserStatusChanged, Workspace, WorkspaceForm, WorkspaceStatus,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized UserAccount (JSON bytes).
const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: phone → user_id.
const PHONE_INDEX: TableDefinition<&str, u64> = TableDefinition::new("phone_index");

/// Primary table: workspace_id → serialized Workspace (JSON bytes).
const WORKSPACES: TableDefinition<u64, &[u8]> = TableDefinition::new("workspaces");

/// Index: (owner_id, workspace_id) → () for per-owner range scans.
const OWNER_INDEX: TableDefinition<(u64, u64), ()> = TableDefinition::new("workspace_owner_index");

/// OTP codes awaiting login: phone → latest code (one active code per phone).
const AUTH_CODES: TableDefinition<&str, &str> = TableDefinition::new("auth_codes");

/// Id allocation: counter name → last allocated value.
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("transition not allowed from {from}")]
    InvalidTransition { from: RoleRequestStatus },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID store for users, workspaces, and OTP codes.
pub struct Database {
    db: RedbDatabase,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = RedbDatabase::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(PHONE_INDEX)?;
            let _ = write_txn.open_table(WORKSPACES)?;
            let _ = write_txn.open_table(OWNER_INDEX)?;
            let _ = write_txn.open_table(AUTH_CODES)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user. Fails with `AlreadyExists` on a duplicate phone.
    pub fn create_user(
        &self,
        phone: &str,
        real_name: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> StoreResult<UserAccount> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut phones = write_txn.open_table(PHONE_INDEX)?;
            let mut counters = write_txn.open_table(COUNTERS)?;

            if phones.get(phone)?.is_some() {
                return Err(StoreError::AlreadyExists(format!("user with phone {phone}")));
            }

            let id = counters.get("user")?.map(|g| g.value()).unwrap_or(0) + 1;
            counters.insert("user", id)?;

            let user = UserAccount {
                id,
                phone: phone.to_string(),
                real_name: real_name.to_string(),
                roles: roles.into_iter().collect(),
                landlord_status: RoleRequestStatus::None,
                created_at: now,
                updated_at: now,
            };
            let bytes = serde_json::to_vec(&user)?;
            users.insert(id, bytes.as_slice())?;
            phones.insert(phone, id)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Load a user by id.
    pub fn user(&self, id: u64) -> StoreResult<UserAccount> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let guard = users
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Load a user by phone.
    pub fn user_by_phone(&self, phone: &str) -> StoreResult<UserAccount> {
        let read_txn = self.db.begin_read()?;
        let phones = read_txn.open_table(PHONE_INDEX)?;
        let id = phones
            .get(phone)?
            .map(|g| g.value())
            .ok_or_else(|| StoreError::NotFound(format!("user with phone {phone}")))?;
        let users = read_txn.open_table(USERS)?;
        let guard = users
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// List users whose landlord request is in the given state.
    pub fn users_by_landlord_status(
        &self,
        status: RoleRequestStatus,
    ) -> StoreResult<Vec<UserAccount>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let mut out = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            let user: UserAccount = serde_json::from_slice(value.value())?;
            if user.landlord_status == status {
                out.push(user);
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// List all workspaces owned by a user.
    pub fn workspaces_by_owner(&self, owner_id: u64) -> StoreResult<Vec<Workspace>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_INDEX)?;
        let workspaces = read_txn.open_table(WORKSPACES)?;

        let mut out = Vec::new();
        for entry in index.range((owner_id, 0u64)..=(owner_id, u64::MAX))? {
            let (key, _) = entry?;
            let (_, ws_id) = key.value();
            if let Some(guard) = workspaces.get(ws_id)? {
                out.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Landlord workflow (atomic transitions)
    // =========================================================================

    /// Submit a landlord request: move the user to `Pending` and create their
    /// first workspace in `UnderReview`, in one transaction.
    ///
    /// `allowed_from` is the set of states the submit may start from; the
    /// check runs inside the transaction so check and mutation are atomic.
    pub fn submit_landlord_request(
        &self,
        user_id: u64,
        form: &WorkspaceForm,
        allowed_from: &[RoleRequestStatus],
    ) -> StoreResult<(UserAccount, Workspace)> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let (user, workspace) = {
            let mut users = write_txn.open_table(USERS)?;
            let mut workspaces = write_txn.open_table(WORKSPACES)?;
            let mut owner_index = write_txn.open_table(OWNER_INDEX)?;
            let mut counters = write_txn.open_table(COUNTERS)?;

            let mut user: UserAccount = {
                let guard = users
                    .get(user_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
                serde_json::from_slice(guard.value())?
            };
            if !allowed_from.contains(&user.landlord_status) {
                return Err(StoreError::InvalidTransition {
                    from: user.landlord_status,
                });
            }

            user.landlord_status = RoleRequestStatus::Pending;
            user.updated_at = now;
            let user_bytes = serde_json::to_vec(&user)?;
            users.insert(user_id, user_bytes.as_slice())?;

            let ws_id = counters.get("workspace")?.map(|g| g.value()).unwrap_or(0) + 1;
            counters.insert("workspace", ws_id)?;

            let workspace = Workspace {
                id: ws_id,
                owner_id: user_id,
                name: form.name.clone(),
                city: form.city.clone(),
                address: form.address.clone(),
                kind: form.kind.clone(),
                description: form.description.clone(),
                price_per_hour: form.price_per_hour,
                min_rent_minutes: form.min_rent_minutes,
                status: WorkspaceStatus::UnderReview,
                created_at: now,
            };
            let ws_bytes = serde_json::to_vec(&workspace)?;
            workspaces.insert(ws_id, ws_bytes.as_slice())?;
            owner_index.insert((user_id, ws_id), ())?;

            (user, workspace)
        };
        write_txn.commit()?;
        Ok((user, workspace))
    }

    /// Apply an administrator decision: set the user's landlord status and
    /// cascade `workspace_status` to every workspace they own, in one
    /// transaction. A crash between the two writes cannot leave them
    /// diverged.
    ///
    /// `allowed_from: None` skips the precondition (legacy policy).
    /// Returns the transition record and the number of cascaded workspaces.
    pub fn apply_landlord_transition(
        &self,
        user_id: u64,
        new_status: RoleRequestStatus,
        workspace_status: WorkspaceStatus,
        allowed_from: Option<&[RoleRequestStatus]>,
    ) -> StoreResult<(UserStatusChanged, usize)> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let (record, cascaded) = {
            let mut users = write_txn.open_table(USERS)?;
            let mut workspaces = write_txn.open_table(WORKSPACES)?;
            let owner_index = write_txn.open_table(OWNER_INDEX)?;

            let mut user: UserAccount = {
                let guard = users
                    .get(user_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
                serde_json::from_slice(guard.value())?
            };
            let old_status = user.landlord_status;
            if let Some(allowed) = allowed_from {
                if !allowed.contains(&old_status) {
                    return Err(StoreError::InvalidTransition { from: old_status });
                }
            }

            user.landlord_status = new_status;
            user.updated_at = now;
            let user_bytes = serde_json::to_vec(&user)?;
            users.insert(user_id, user_bytes.as_slice())?;

            let mut ws_ids = Vec::new();
            for entry in owner_index.range((user_id, 0u64)..=(user_id, u64::MAX))? {
                let (key, _) = entry?;
                ws_ids.push(key.value().1);
            }
            for ws_id in &ws_ids {
                let mut workspace: Workspace = {
                    let guard = workspaces
                        .get(*ws_id)?
                        .ok_or_else(|| StoreError::NotFound(format!("workspace {ws_id}")))?;
                    serde_json::from_slice(guard.value())?
                };
                workspace.status = workspace_status;
                let bytes = serde_json::to_vec(&workspace)?;
                workspaces.insert(*ws_id, bytes.as_slice())?;
            }

            (
                UserStatusChanged {
                    user_id,
                    role: Role::Landlord,
                    old_status,
                    new_status,
                },
                ws_ids.len(),
            )
        };
        write_txn.commit()?;
        Ok((record, cascaded))
    }

    // =========================================================================
    // OTP codes
    // =========================================================================

    /// Store the active OTP code for a phone, replacing any previous one.
    pub fn put_auth_code(&self, phone: &str, code: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut codes = write_txn.open_table(AUTH_CODES)?;
            codes.insert(phone, code)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Verify and consume the OTP code for a phone.
    ///
    /// On a match the code is removed (single use); on a mismatch it is kept
    /// and `false` is returned.
    pub fn consume_auth_code(&self, phone: &str, code: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let matched = {
            let mut codes = write_txn.open_table(AUTH_CODES)?;
            let stored = codes.get(phone)?.map(|g| g.value().to_string());
            match stored {
                Some(stored) if stored == code => {
                    codes.remove(phone)?;
                    true
                }
                _ => false,
            }
        };
        write_txn.commit()?;
        Ok(matched)
    }

    /// Drop any pending OTP code for a phone.
    pub fn clear_auth_codes(&self, phone: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut codes = write_txn.open_table(AUTH_CODES)?;
            codes.remove(phone)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
