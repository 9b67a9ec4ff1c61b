//! Admin login, logout, seeding and dashboard access.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use folio_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, TestApp, body_json, body_text, json_request, request,
    session_cookie,
};
use folio_server::services::{AdminAuthService, SeedOutcome};

fn login_body(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password })
}

fn form_login(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        )))
        .unwrap()
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app.send(request("GET", "/api/admin/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;

    let wrong_password = app
        .send(json_request(
            "POST",
            "/api/admin/login",
            None,
            &login_body(ADMIN_EMAIL, "not-the-password"),
        ))
        .await;
    let unknown_email = app
        .send(json_request(
            "POST",
            "/api/admin/login",
            None,
            &login_body("nobody@example.com", ADMIN_PASSWORD),
        ))
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_email).await
    );
}

#[tokio::test]
async fn test_failed_login_is_recorded() {
    let app = TestApp::new().await;
    app.send(json_request(
        "POST",
        "/api/admin/login",
        None,
        &login_body(ADMIN_EMAIL, "guess-one"),
    ))
    .await;

    let cookie = app.login().await;
    let response = app
        .send(request("GET", "/api/admin/notifications", Some(&cookie)))
        .await;
    let notifications = body_json(response).await;
    let first = &notifications[0];
    assert_eq!(first["severity"], "warning");
    assert_eq!(first["read"], false);
    assert!(first["message"].as_str().unwrap().contains(ADMIN_EMAIL));

    let id = first["id"].as_str().unwrap();
    let response = app
        .send(request(
            "POST",
            &format!("/api/admin/notifications/{id}/read"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["read"], true);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(request("POST", "/api/admin/logout", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(request("GET", "/api/admin/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let app = TestApp::new().await;

    let outcome = AdminAuthService::new(app.store.as_ref())
        .seed(ADMIN_EMAIL, "a-different-password")
        .await
        .unwrap();
    assert!(matches!(outcome, SeedOutcome::AlreadyExists));

    // The original password still works; the new one does not
    app.login().await;
    let response = app
        .send(json_request(
            "POST",
            "/api/admin/login",
            None,
            &login_body(ADMIN_EMAIL, "a-different-password"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let app = TestApp::new().await;

    let response = app.send(request("GET", "/admin", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");

    let response = app.send(request("GET", "/api/admin/dashboard", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_form_login_renders_dashboard() {
    let app = TestApp::new().await;

    let response = app.send(form_login(ADMIN_EMAIL, "wrong-password")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin/login?error=credentials"
    );

    let response = app.send(form_login(ADMIN_EMAIL, ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    let cookie = session_cookie(&response).unwrap();

    let response = app.send(request("GET", "/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(ADMIN_EMAIL));

    let response = app
        .send(request("GET", "/admin?section=projects", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_snapshot() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(request("GET", "/api/admin/dashboard", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"]["database"], "connected");
    assert!(body["notifications"].is_array());
}

#[tokio::test]
async fn test_admin_api_rejects_anonymous_with_401() {
    let app = TestApp::new().await;

    for (method, uri) in [
        ("GET", "/api/admin/me"),
        ("GET", "/api/admin/dashboard"),
        ("GET", "/api/admin/notifications"),
        ("POST", "/api/admin/logout"),
        ("POST", "/api/admin/notifications/65a1f0c2e4b0a1b2c3d4e5f6/read"),
    ] {
        let response = app.send(request(method, uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Authentication required" }),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_repeated_failed_logins_share_one_notification() {
    let app = TestApp::new().await;

    for _ in 0..20 {
        let response = app
            .send(json_request(
                "POST",
                "/api/admin/login",
                None,
                &login_body(ADMIN_EMAIL, "guessing"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let cookie = app.login().await;
    let response = app
        .send(request("GET", "/api/admin/notifications", Some(&cookie)))
        .await;
    let notifications = body_json(response).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_read_form_redirects_to_notifications() {
    let app = TestApp::new().await;
    app.send(json_request(
        "POST",
        "/api/admin/login",
        None,
        &login_body(ADMIN_EMAIL, "guessing"),
    ))
    .await;
    let cookie = app.login().await;

    let response = app
        .send(request("GET", "/admin?section=notifications", Some(&cookie)))
        .await;
    let html = body_text(response).await;
    let notifications = body_json(
        app.send(request("GET", "/api/admin/notifications", Some(&cookie)))
            .await,
    )
    .await;
    let id = notifications[0]["id"].as_str().unwrap().to_string();
    let action = format!("/admin/notifications/{id}/read");
    assert!(html.contains(&action));

    let response = app.send(request("POST", &action, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin?section=notifications"
    );

    let notifications = body_json(
        app.send(request("GET", "/api/admin/notifications", Some(&cookie)))
            .await,
    )
    .await;
    assert_eq!(notifications[0]["read"], true);
}
