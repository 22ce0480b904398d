// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! Administration endpoints for the landlord approval queue.
//!
//! Everything here lives under `/api/admin` and is reachable only through
//! the admin gate (see [`crate::auth::admin`]).

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::models::{RoleRequestStatus, UserStatusChanged, Workspace};
use crate::state::AppState;

use super::users::UserProfile;

/// Query for GET /api/admin/landlords
#[derive(Debug, Deserialize, IntoParams)]
pub struct LandlordQuery {
    /// Request state to filter by; defaults to `PENDING`
    pub status: Option<RoleRequestStatus>,
}

/// Request body for approve/reject.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserStatusChangeRequest {
    /// The applicant to decide on
    pub user_id: u64,
}

/// Applicant plus the workspaces awaiting the same decision.
#[derive(Debug, Serialize, ToSchema)]
pub struct LandlordApplication {
    pub user: UserProfile,
    pub workspaces: Vec<Workspace>,
}

/// List landlord applications by request state.
#[utoipa::path(
    get,
    path = "/api/admin/landlords",
    tag = "Admin",
    security(("bearer" = [])),
    params(LandlordQuery),
    responses(
        (status = 200, description = "Applications in the requested state", body = [LandlordApplication]),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Administrator role required"),
    )
)]
pub async fn landlords_by_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<LandlordQuery>,
) -> Result<Json<Vec<LandlordApplication>>, ApiError> {
    let status = query.status.unwrap_or(RoleRequestStatus::Pending);
    let users = state.landlord_workflow().landlords_by_status(status)?;

    let mut applications = Vec::with_capacity(users.len());
    for user in users {
        let workspaces = state.db.workspaces_by_owner(user.id)?;
        applications.push(LandlordApplication {
            user: user.into(),
            workspaces,
        });
    }
    Ok(Json(applications))
}

/// Approve a pending landlord request.
///
/// The applicant's request becomes `APPROVED` and every workspace they own
/// becomes visible to customers, in one atomic step.
#[utoipa::path(
    post,
    path = "/api/admin/landlords/approve",
    tag = "Admin",
    security(("bearer" = [])),
    request_body = UserStatusChangeRequest,
    responses(
        (status = 200, description = "Transition record", body = UserStatusChanged),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Request is not pending"),
    )
)]
pub async fn approve_landlord(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<UserStatusChangeRequest>,
) -> Result<Json<UserStatusChanged>, ApiError> {
    let record = state.landlord_workflow().approve(request.user_id)?;
    tracing::info!(
        admin_id = admin.user_id,
        user_id = request.user_id,
        "landlord approved"
    );
    Ok(Json(record))
}

/// Reject a pending landlord request.
///
/// The applicant may resubmit later; their workspaces are hidden.
#[utoipa::path(
    post,
    path = "/api/admin/landlords/reject",
    tag = "Admin",
    security(("bearer" = [])),
    request_body = UserStatusChangeRequest,
    responses(
        (status = 200, description = "Transition record", body = UserStatusChanged),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Request is not pending"),
    )
)]
pub async fn reject_landlord(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<UserStatusChangeRequest>,
) -> Result<Json<UserStatusChanged>, ApiError> {
    let record = state.landlord_workflow().reject(request.user_id)?;
    tracing::info!(
        admin_id = admin.user_id,
        user_id = request.user_id,
        "landlord rejected"
    );
    Ok(Json(record))
}
