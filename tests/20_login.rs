mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use clipforge_api::database::models::Role;
use common::{bearer, send, StubLlm, TestApp};

fn login_body() -> serde_json::Value {
    json!({ "email": "ada@example.com", "name": "Ada", "googletoken": "g-123" })
}

#[tokio::test]
async fn repeated_login_resolves_to_one_user() {
    let app = TestApp::new(StubLlm::replying("code"));

    let (status, first) = send(app.router(), Method::POST, "/login", None, Some(login_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], true);
    assert_eq!(first["message"], "Login successful.");

    let (status, second) = send(app.router(), Method::POST, "/login", None, Some(login_body())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.store.users.lock().unwrap().len(), 1);

    let a = app.codec.decode(first["token"].as_str().unwrap()).unwrap();
    let b = app.codec.decode(second["token"].as_str().unwrap()).unwrap();
    assert_eq!(a.subject_id, b.subject_id);
    assert_eq!(a.role, Role::User);
    assert_eq!(a.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn issued_token_opens_the_profile() {
    let app = TestApp::new(StubLlm::replying("code"));
    let (_, login) = send(app.router(), Method::POST, "/login", None, Some(login_body())).await;
    let token = login["token"].as_str().unwrap().to_string();

    let (status, body) =
        send(app.router(), Method::GET, "/profile", Some(&bearer(&token)), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile fetched successfully.");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["role"], "USER");
    assert!(body["data"].get("external_token").is_none());
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = TestApp::new(StubLlm::replying("code"));
    let cases = [
        (json!({ "name": "Ada", "googletoken": "g" }), "Email is required"),
        (json!({ "email": "ada", "name": "Ada", "googletoken": "g" }), "Invalid email address"),
        (json!({ "email": "ada@example.com", "googletoken": "g" }), "Name is required"),
        (json!({ "email": "ada@example.com", "name": "Ada" }), "Google token is required"),
    ];

    for (body, message) in cases {
        let (status, response) = send(app.router(), Method::POST, "/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], false);
        assert_eq!(response["message"], message);
    }
    assert!(app.store.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn store_outage_is_an_internal_error() {
    let app = TestApp::new(StubLlm::replying("code"));
    app.store
        .fail_all
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let (status, body) = send(app.router(), Method::POST, "/login", None, Some(login_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
