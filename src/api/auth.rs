// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! OTP authentication endpoints: code delivery and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::sms;
use crate::state::AppState;

use super::users::AuthResponse;

/// Request body for POST /api/auth/code
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendCodeRequest {
    /// Phone in E.164, or a `+0…` test number
    pub phone: String,
}

/// Request body for POST /api/auth/login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub phone: String,
    /// Six digit code previously delivered to the phone
    pub code: String,
}

/// Request a one-time login code.
///
/// Generates a six digit code, delivers it via the SMS gateway, and stores it
/// as the single active code for the phone (replacing any previous one).
/// Test numbers always get the fixed test code and skip delivery.
#[utoipa::path(
    post,
    path = "/api/auth/code",
    tag = "Auth",
    request_body = SendCodeRequest,
    responses(
        (status = 204, description = "Code generated and sent"),
        (status = 400, description = "Phone is not E.164"),
        (status = 503, description = "SMS delivery failed"),
    )
)]
pub async fn send_code(
    State(state): State<AppState>,
    Json(request): Json<SendCodeRequest>,
) -> Result<StatusCode, ApiError> {
    if !sms::is_test_phone(&request.phone) && !sms::is_valid_phone(&request.phone) {
        return Err(ApiError::bad_request(format!(
            "phone must be E.164: {}",
            request.phone
        )));
    }

    let code = sms::generate_code(&request.phone);
    state.sms.send_code(&request.phone, &code)?;
    state.db.put_auth_code(&request.phone, &code)?;

    tracing::info!(phone = %request.phone, "login code issued");
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange a one-time code for a signed credential.
///
/// The code is single use: a successful login consumes it, a failed attempt
/// keeps it so the user can retry with the right digits.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid auth code"),
        (status = 404, description = "No account for this phone"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state.db.user_by_phone(&request.phone)?;

    if !state.db.consume_auth_code(&request.phone, &request.code)? {
        return Err(ApiError::unauthorized("invalid auth code"));
    }

    let issued = state
        .auth
        .issuer()
        .issue(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        token: issued.token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::tests::test_state;

    #[tokio::test]
    async fn send_code_rejects_malformed_phone() {
        let state = test_state();
        let result = send_code(
            State(state),
            Json(SendCodeRequest {
                phone: "not-a-phone".to_string(),
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_phone_logs_in_with_fixed_code() {
        let state = test_state();
        state
            .db
            .create_user("+01112223344", "Tester", [Role::Customer])
            .unwrap();

        let status = send_code(
            State(state.clone()),
            Json(SendCodeRequest {
                phone: "+01112223344".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(response) = login(
            State(state.clone()),
            Json(LoginRequest {
                phone: "+01112223344".to_string(),
                code: sms::TEST_CODE.to_string(),
            }),
        )
        .await
        .unwrap();

        let claims = state.auth.codec().decode(&response.token).unwrap();
        assert_eq!(claims.uid, response.user.id);
    }

    #[tokio::test]
    async fn wrong_code_is_unauthorized_and_code_survives() {
        let state = test_state();
        state
            .db
            .create_user("+01112223355", "Tester", [Role::Customer])
            .unwrap();
        send_code(
            State(state.clone()),
            Json(SendCodeRequest {
                phone: "+01112223355".to_string(),
            }),
        )
        .await
        .unwrap();

        let err = login(
            State(state.clone()),
            Json(LoginRequest {
                phone: "+01112223355".to_string(),
                code: "000000".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        // The stored code is still usable after a failed attempt.
        assert!(login(
            State(state),
            Json(LoginRequest {
                phone: "+01112223355".to_string(),
                code: sms::TEST_CODE.to_string(),
            }),
        )
        .await
        .is_ok());
    }

    #[tokio::test]
    async fn login_without_account_is_not_found() {
        let state = test_state();
        let err = login(
            State(state),
            Json(LoginRequest {
                phone: "+01119998877".to_string(),
                code: sms::TEST_CODE.to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
