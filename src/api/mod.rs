// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! # HTTP API
//!
//! Route table:
//!
//! - `POST /api/auth/code` - request a one-time login code
//! - `POST /api/auth/login` - exchange the code for a credential
//! - `POST /api/users` - register
//! - `GET  /api/users/me` - current profile
//! - `POST /api/users/me/landlord-request` - submit a landlord request
//! - `GET  /api/admin/landlords` - list applications by state
//! - `POST /api/admin/landlords/approve` - approve an application
//! - `POST /api/admin/landlords/reject` - reject an application
//! - `GET  /health` - health probe
//! - `/docs` - Swagger UI
//!
//! Middleware, outermost first: request-id, trace, CORS, refresh gate, admin
//! gate. The refresh gate therefore runs before the admin gate on every
//! request, and the CORS layer exposes the `X-New-Token` header so browser
//! clients can read replacement credentials.

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{admin_gate, refresh_gate, Role, REFRESHED_TOKEN_HEADER},
    models::{
        RoleRequestStatus, UserStatusChanged, Workspace, WorkspaceForm, WorkspaceStatus,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/code", post(auth::send_code))
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .route("/users/me", get(users::me))
        .route(
            "/users/me/landlord-request",
            post(users::submit_landlord_request),
        )
        .route("/admin/landlords", get(admin::landlords_by_status))
        .route("/admin/landlords/approve", post(admin::approve_landlord))
        .route("/admin/landlords/reject", post(admin::reject_landlord))
        .with_state(state.clone());

    let root_routes = Router::new()
        .route("/health", get(health::health))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .merge(root_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Layers run outside-in in reverse order of addition: the admin gate
        // added first is innermost, so the refresh gate sees every request
        // before it.
        .layer(middleware::from_fn_with_state(state.clone(), admin_gate))
        .layer(middleware::from_fn_with_state(state, refresh_gate))
        .layer(cors_layer())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Permissive CORS with the refresh header explicitly exposed: browsers hide
/// non-safelisted response headers from cross-origin scripts unless they are
/// named here.
fn cors_layer() -> CorsLayer {
    CorsLayer::permissive().expose_headers([HeaderName::from_static(REFRESHED_TOKEN_HEADER)])
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::send_code,
        auth::login,
        users::register,
        users::me,
        users::submit_landlord_request,
        admin::landlords_by_status,
        admin::approve_landlord,
        admin::reject_landlord
    ),
    components(
        schemas(
            Role,
            RoleRequestStatus,
            WorkspaceStatus,
            Workspace,
            WorkspaceForm,
            UserStatusChanged,
            users::UserProfile,
            users::AuthResponse,
            users::RegisterRequest,
            users::LandlordRequestResponse,
            auth::SendCodeRequest,
            auth::LoginRequest,
            admin::UserStatusChangeRequest,
            admin::LandlordApplication,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Auth", description = "OTP login and token issuance"),
        (name = "Users", description = "Registration, profile, landlord requests"),
        (name = "Admin", description = "Landlord approval queue")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn workspace_form() -> serde_json::Value {
        serde_json::json!({
            "name": "Chair by the window",
            "city": "Riga",
            "address": "Main st 1",
            "kind": "hair chair",
            "price_per_hour": 12.5,
            "min_rent_minutes": 60
        })
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_reachable_without_credentials() {
        let app = router(test_state());
        let response = send(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn near_expiry_credential_is_replaced_in_flight() {
        let state = test_state();
        let user = state
            .db
            .create_user("+01234700001", "Alice", [Role::Customer])
            .unwrap();
        // 50 of 72 hours elapsed: 22 hours remain, below the 24 hour
        // threshold.
        let stale = state
            .auth
            .issuer()
            .issue_at(&user, Utc::now() - Duration::hours(50))
            .unwrap();

        let app = router(state.clone());
        let response = send(&app, "GET", "/api/users/me", Some(&stale.token), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let replacement = response
            .headers()
            .get(REFRESHED_TOKEN_HEADER)
            .expect("replacement header must be present")
            .to_str()
            .unwrap()
            .to_owned();
        let claims = state.auth.codec().decode(&replacement).unwrap();
        assert_eq!(claims.uid, user.id);
        assert!(claims.exp > stale.claims.exp);
    }

    #[tokio::test]
    async fn fresh_credential_is_not_replaced() {
        let state = test_state();
        let user = state
            .db
            .create_user("+01234700002", "Bob", [Role::Customer])
            .unwrap();
        let issued = state.auth.issuer().issue(&user).unwrap();

        let app = router(state);
        let response = send(&app, "GET", "/api/users/me", Some(&issued.token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(REFRESHED_TOKEN_HEADER).is_none());
    }

    #[tokio::test]
    async fn expired_credential_is_rejected_before_handlers() {
        let state = test_state();
        let user = state
            .db
            .create_user("+01234700003", "Carol", [Role::Customer])
            .unwrap();
        let expired = state
            .auth
            .issuer()
            .issue_at(&user, Utc::now() - Duration::hours(73))
            .unwrap();

        let app = router(state);
        let response = send(&app, "GET", "/api/users/me", Some(&expired.token), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_namespace_is_gated() {
        let state = test_state();
        let customer = state
            .db
            .create_user("+01234700004", "Customer", [Role::Customer])
            .unwrap();
        let admin = state
            .db
            .create_user(
                "+01234700005",
                "Root",
                [Role::Customer, Role::Administrator],
            )
            .unwrap();
        let customer_token = state.auth.issuer().issue(&customer).unwrap().token;
        let admin_token = state.auth.issuer().issue(&admin).unwrap().token;

        let app = router(state);

        // No credential: 401.
        let response = send(&app, "GET", "/api/admin/landlords", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Credential without the administrator role: 403.
        let response = send(
            &app,
            "GET",
            "/api/admin/landlords",
            Some(&customer_token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Administrator: 200.
        let response = send(
            &app,
            "GET",
            "/api/admin/landlords",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // The gate only guards its namespace: the same customer credential
        // works outside it.
        let response = send(&app, "GET", "/api/users/me", Some(&customer_token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn approval_cascades_to_every_workspace() {
        let state = test_state();
        let applicant = state
            .db
            .create_user("+01234700006", "Applicant", [Role::Customer])
            .unwrap();
        let admin = state
            .db
            .create_user("+01234700007", "Root", [Role::Administrator])
            .unwrap();
        let applicant_token = state.auth.issuer().issue(&applicant).unwrap().token;
        let admin_token = state.auth.issuer().issue(&admin).unwrap().token;

        let app = router(state.clone());

        // First submission, rejected, then a second one: two workspaces on
        // file, the applicant pending again.
        let response = send(
            &app,
            "POST",
            "/api/users/me/landlord-request",
            Some(&applicant_token),
            Some(workspace_form()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &app,
            "POST",
            "/api/admin/landlords/reject",
            Some(&admin_token),
            Some(serde_json::json!({"user_id": applicant.id})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            "POST",
            "/api/users/me/landlord-request",
            Some(&applicant_token),
            Some(workspace_form()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        // Approve: the record names the transition, and both workspaces flip.
        let response = send(
            &app,
            "POST",
            "/api/admin/landlords/approve",
            Some(&admin_token),
            Some(serde_json::json!({"user_id": applicant.id})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let record = json_body(response).await;
        assert_eq!(record["user_id"], applicant.id);
        assert_eq!(record["role"], "LANDLORD");
        assert_eq!(record["old_status"], "PENDING");
        assert_eq!(record["new_status"], "APPROVED");

        let workspaces = state.db.workspaces_by_owner(applicant.id).unwrap();
        assert_eq!(workspaces.len(), 2);
        assert!(workspaces
            .iter()
            .all(|ws| ws.status == WorkspaceStatus::Approved));

        // Deciding the same request twice is a conflict under strict policy.
        let response = send(
            &app,
            "POST",
            "/api/admin/landlords/approve",
            Some(&admin_token),
            Some(serde_json::json!({"user_id": applicant.id})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn otp_flow_end_to_end() {
        let state = test_state();
        let app = router(state);

        // Register with a test number, then log in with the fixed code.
        let response = send(
            &app,
            "POST",
            "/api/users",
            None,
            Some(serde_json::json!({"phone": "+01234700008", "real_name": "Dana"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &app,
            "POST",
            "/api/auth/code",
            None,
            Some(serde_json::json!({"phone": "+01234700008"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({"phone": "+01234700008", "code": "123456"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let token = body["token"].as_str().unwrap().to_owned();

        let response = send(&app, "GET", "/api/users/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let profile = json_body(response).await;
        assert_eq!(profile["real_name"], "Dana");
    }
}
