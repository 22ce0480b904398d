// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! # Storage Module
//!
//! Persistence for the aggregator: users, workspaces, and OTP codes, all in a
//! single embedded [redb](https://docs.rs/redb) database.
//!
//! Values are stored as JSON bytes keyed by numeric ids; secondary indexes
//! (phone, workspace owner) are plain key tables. Multi-record mutations,
//! the landlord-transition cascade in particular, run in a single write
//! transaction.

pub mod database;

pub use database::{Database, StoreError, StoreResult};
