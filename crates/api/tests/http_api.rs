//! Routing, authentication and middleware behaviour of the HTTP surface.
//!
//! None of these requests reach the database.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{bearer, body_json, get, send};
use tower::ServiceExt;

const RETRO_URI: &str = "/api/v1/sprints/1/retrospective";

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(common::build_test_app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let response = get(common::build_test_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["rooms"], 0);
    assert_eq!(json["connections"], 0);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn enter_without_token_is_unauthorized() {
    let response = send(common::build_test_app(), Method::POST, RETRO_URI, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn status_without_token_is_unauthorized() {
    let response = get(common::build_test_app(), RETRO_URI).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_unauthorized() {
    let response = send(
        common::build_test_app(),
        Method::POST,
        RETRO_URI,
        Some("Token abc"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Bearer"));
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let response = send(
        common::build_test_app(),
        Method::POST,
        RETRO_URI,
        Some("Bearer not.a.jwt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn non_numeric_sprint_id_is_rejected() {
    let response = send(
        common::build_test_app(),
        Method::POST,
        "/api/v1/sprints/abc/retrospective",
        Some(&bearer(1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = send(common::build_test_app(), Method::POST, RETRO_URI, None).await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("response must carry x-request-id");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(RETRO_URI)
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization")
        .body(Body::empty())
        .unwrap();

    let response = common::build_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .unwrap()
            .to_str()
            .unwrap(),
        "http://localhost:5173"
    );
    assert!(headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("POST"));
}
