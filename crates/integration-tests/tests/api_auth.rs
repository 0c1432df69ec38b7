use axum::http::StatusCode;
use serde_json::json;

use integration_tests::http::{send, send_raw};
use integration_tests::Harness;

#[tokio::test]
async fn signup_login_and_user_info() {
    let h = Harness::new();
    let app = h.app();

    let signup = send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "name": "Ada", "email": "  Ada@Example.com ", "password": "hunter22" })),
    )
    .await;
    assert_eq!(signup.status, StatusCode::CREATED);
    assert_eq!(signup.body["user"]["email"], "ada@example.com");
    assert!(signup.body["token"].is_string());
    assert!(signup.body["user"].get("password").is_none());

    let login = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["token"].as_str().unwrap().to_string();

    let me = send(&app, "GET", "/auth/user-info", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["name"], "Ada");
    assert_eq!(me.body["user"]["role"], "member");
    assert!(me.body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_email_and_bad_credentials() {
    let h = Harness::new();
    let app = h.app();
    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter22" });

    send(&app, "POST", "/auth/signup", None, Some(body.clone())).await;
    let dup = send(&app, "POST", "/auth/signup", None, Some(body)).await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.body["success"], false);

    let wrong = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "nope" })),
    )
    .await;
    let unknown = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "who@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], unknown.body["message"]);
}

#[tokio::test]
async fn missing_or_bad_tokens_are_rejected() {
    let h = Harness::new();
    let app = h.app();

    let none = send(&app, "GET", "/projects", None, None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["success"], false);

    let bad = send(&app, "GET", "/projects", Some("garbage"), None).await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_of_a_deleted_user_is_rejected() {
    let h = Harness::new();
    let app = h.app();
    let owner = h.owner("Olive").await;
    let member = h.member("Mia").await;
    let owner_token = h.token_for(&owner);
    let member_token = h.token_for(&member);

    let listed = send(&app, "GET", "/users/members", Some(&owner_token), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], 1);

    let forbidden = send(&app, "GET", "/users/members", Some(&member_token), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = send(
        &app,
        "DELETE",
        &format!("/users/members/{}", member.id),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let after = send(&app, "GET", "/auth/user-info", Some(&member_token), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let own = send(
        &app,
        "DELETE",
        &format!("/users/members/{}", owner.id),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = Harness::new();
    let app = h.app();
    let owner = h.owner("Olive").await;
    let token = h.token_for(&owner);

    let reply = send_raw(&app, "POST", "/projects", &token, "{not json").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["success"], false);
}
