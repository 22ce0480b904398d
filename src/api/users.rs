// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! User endpoints: registration, profile, landlord request submission.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::auth::{CurrentUser, Role};
use crate::error::ApiError;
use crate::models::{RoleRequestStatus, UserAccount, Workspace, WorkspaceForm};
use crate::sms;
use crate::state::AppState;

/// Public view of a user account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: u64,
    pub phone: String,
    pub real_name: String,
    pub roles: BTreeSet<Role>,
    pub landlord_status: RoleRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserProfile {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            real_name: user.real_name,
            roles: user.roles,
            landlord_status: user.landlord_status,
            created_at: user.created_at,
        }
    }
}

/// Credential plus the account it authenticates.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Signed bearer credential
    pub token: String,
    pub user: UserProfile,
}

/// Request body for POST /api/users
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Phone in E.164, or a `+0…` test number
    pub phone: String,
    pub real_name: String,
}

/// Response for POST /api/users/me/landlord-request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LandlordRequestResponse {
    pub user: UserProfile,
    /// The workspace submitted for review alongside the request
    pub workspace: Workspace,
}

/// Register a new account.
///
/// Every account starts with the customer role only; landlord status is
/// acquired through the approval workflow. Any OTP codes left over from the
/// phone's pre-registration attempts are dropped.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Malformed phone or empty name"),
        (status = 409, description = "Phone already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if !sms::is_test_phone(&request.phone) && !sms::is_valid_phone(&request.phone) {
        return Err(ApiError::bad_request(format!(
            "phone must be E.164: {}",
            request.phone
        )));
    }
    if request.real_name.trim().is_empty() {
        return Err(ApiError::bad_request("real_name must not be empty"));
    }

    let user = state
        .db
        .create_user(&request.phone, request.real_name.trim(), [Role::Customer])?;
    state.db.clear_auth_codes(&request.phone)?;

    let issued = state
        .auth
        .issuer()
        .issue(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: issued.token,
            user: user.into(),
        }),
    ))
}

/// Get the current authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid credential"),
    )
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.into())
}

/// Submit a landlord role request with the applicant's first workspace.
///
/// Allowed when the caller has never asked or was previously rejected;
/// a request already pending or approved is a conflict.
#[utoipa::path(
    post,
    path = "/api/users/me/landlord-request",
    tag = "Users",
    security(("bearer" = [])),
    request_body = WorkspaceForm,
    responses(
        (status = 201, description = "Request submitted", body = LandlordRequestResponse),
        (status = 401, description = "Missing or invalid credential"),
        (status = 409, description = "Request already pending or approved"),
    )
)]
pub async fn submit_landlord_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<WorkspaceForm>,
) -> Result<(StatusCode, Json<LandlordRequestResponse>), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::bad_request("workspace name must not be empty"));
    }

    let (user, workspace) = state.landlord_workflow().submit(user.id, &form)?;
    Ok((
        StatusCode::CREATED,
        Json(LandlordRequestResponse {
            user: user.into(),
            workspace,
        }),
    ))
}
