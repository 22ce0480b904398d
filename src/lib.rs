// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Sector Aggregator - Service-Sector Aggregation Backend
//!
//! Phone-first backend for aggregating service-sector workspaces (hair
//! chairs, massage rooms, and the like): OTP login, stateless JWT
//! credentials with in-flight refresh, and an admin-driven landlord
//! approval workflow over an embedded ACID store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec/issuer, refresh and admin gates
//! - `workflow` - Landlord role-request state machine
//! - `storage` - Embedded database (redb)
//! - `sms` - One-time-code delivery

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod sms;
pub mod state;
pub mod storage;
pub mod workflow;
