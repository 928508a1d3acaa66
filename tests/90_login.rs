mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, ROOT_EMAIL, ROOT_PASSWORD, ROOT_USERNAME};
use tweets_api::auth::Role;

#[tokio::test]
async fn configured_super_admin_logs_in_end_to_end() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.login(ROOT_EMAIL, ROOT_PASSWORD).await?;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["token_type"], "Bearer");
    assert_eq!(data["expires_in"], 24 * 3600);
    assert_eq!(data["admin"]["email"], ROOT_EMAIL);
    assert_eq!(data["admin"]["role"], "super-admin");
    assert!(data["admin"].get("password_hash").is_none());

    let token = data["token"].as_str().expect("token");
    let claims = app.state.tokens.verify(token)?;
    assert_eq!(claims.role, Role::SuperAdmin);
    assert_eq!(claims.username, ROOT_USERNAME);
    Ok(())
}

#[tokio::test]
async fn username_works_as_login_too() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/fortauth",
            None,
            Some(json!({ "username": ROOT_USERNAME, "password": ROOT_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/fortauth",
            None,
            Some(json!({ "email": ROOT_EMAIL, "password": ROOT_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn email_and_username_may_be_sent_together() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/fortauth",
            None,
            Some(json!({ "email": ROOT_EMAIL, "username": ROOT_USERNAME, "password": ROOT_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["admin"]["username"], ROOT_USERNAME);

    // A blank `login` falls through to the next identifier.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/fortauth",
            None,
            Some(json!({ "login": " ", "username": ROOT_USERNAME, "password": ROOT_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_login_are_indistinguishable() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (wrong_status, wrong) = app.login(ROOT_EMAIL, "nope").await?;
    let (unknown_status, unknown) = app.login("ghost@x.com", ROOT_PASSWORD).await?;

    assert_eq!(wrong_status, StatusCode::NOT_FOUND);
    assert_eq!(unknown_status, StatusCode::NOT_FOUND);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["success"], false);
    Ok(())
}

#[tokio::test]
async fn malformed_login_requests_are_bad_requests() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .request(Method::POST, "/api/fortauth", None, Some(json!({ "password": "x" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.login("   ", "x").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn banner_health_and_fallback() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Tweets API");

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "ok");

    let (status, body) = app.get("/no/such/route").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn health_reports_unavailable_store() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.state.db.close().await;

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    // Searches against a closed pool are transient, not client errors.
    let (status, _) = app.get("/api/tweets").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
