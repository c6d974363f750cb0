//! End-to-end HTTP tests
//!
//! Drives the real router in-process with `tower::ServiceExt::oneshot`:
//! - registration, login and the `x-auth-token` gate
//! - profile CRUD with experience/education entries
//! - the GitHub proxy against a local stand-in server

use axum::{
    body::{to_bytes, Body},
    extract::Path,
    http::{Method, Request, StatusCode},
    routing::get,
    Json, Router,
};
use devhub_backend::{
    build_router,
    config::{Config, GithubConfig},
    db::Database,
    AppState,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config(github_url: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        db_path: ":memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl: Duration::from_secs(360_000),
        bcrypt_cost: 4,
        github: GithubConfig {
            api_url: github_url.to_string(),
            client_id: None,
            client_secret: None,
        },
    }
}

fn test_state(github_url: &str) -> AppState {
    let db = Database::open_in_memory().expect("in-memory db");
    AppState::from_config(&test_config(github_url), db).expect("state")
}

fn test_app() -> (Router, AppState) {
    let state = test_state("http://127.0.0.1:9");
    (build_router(state.clone()), state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "API Started!");

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_then_fetch_current_user() {
    let (app, _) = test_app();
    let token = register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, body) = send(&app, Method::GET, "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "ann@x.com");
    assert!(body["avatar"].as_str().unwrap().contains("gravatar.com"));
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let (app, _) = test_app();
    register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": "Ann Again", "email": "ann@x.com", "password": "other12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "User already exists");

    // First password still works
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "ann@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": "", "email": "not-an-email", "password": "12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let params: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn test_login_is_enumeration_safe() {
    let (app, _) = test_app();
    register(&app, "Ann", "ann@x.com", "secret1").await;

    let (ok_status, ok_body) = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "ann@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(ok_status, StatusCode::OK);
    let token = ok_body["token"].as_str().unwrap();
    let (status, _) = send(&app, Method::GET, "/api/auth", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "ann@x.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["errors"][0]["msg"], "Invalid Credentials");
}

#[tokio::test]
async fn test_gate_distinguishes_missing_from_invalid() {
    let (app, state) = test_app();

    let (missing_status, missing_body) = send(&app, Method::GET, "/api/auth", None, None).await;
    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_body["msg"], "No token, authorization denied");

    let (invalid_status, invalid_body) =
        send(&app, Method::GET, "/api/auth", Some("abc.def.ghi"), None).await;
    assert_eq!(invalid_status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid_body["msg"], "Token is not valid");

    // Expired and tampered tokens read exactly like garbage
    let expired = state
        .tokens
        .issue_at(
            &Uuid::new_v4(),
            chrono::Utc::now() - chrono::Duration::seconds(400_000),
        )
        .unwrap();
    let (status, body) = send(&app, Method::GET, "/api/auth", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, invalid_body);

    let token = register(&app, "Ann", "ann@x.com", "secret1").await;
    let mut tampered: Vec<char> = token.chars().collect();
    let idx = token.rfind('.').unwrap() + 5;
    tampered[idx] = if tampered[idx] == 'x' { 'y' } else { 'x' };
    let tampered: String = tampered.into_iter().collect();
    let (status, body) = send(&app, Method::GET, "/api/auth", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, invalid_body);
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let (app, _) = test_app();
    let token = register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, body) = send(&app, Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "There is no profile for this user");

    // status + skills required
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&token),
        Some(json!({ "company": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&token),
        Some(json!({
            "status": "Developer",
            "skills": "rust, go , sql",
            "company": "Acme",
            "githubusername": "octocat",
            "twitter": "https://twitter.com/ann"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["user"]["name"], "Ann");
    assert_eq!(created["skills"], json!(["rust", "go", "sql"]));
    assert_eq!(created["social"]["twitter"], "https://twitter.com/ann");
    let user_id = created["user"]["id"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], created["id"]);

    // Public reads
    let (status, all) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, by_user) = send(
        &app,
        Method::GET,
        &format!("/api/profile/user/{user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_user["status"], "Developer");

    let (status, body) = send(&app, Method::GET, "/api/profile/user/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Profile not found");

    // Experience
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile/experience",
        Some(&token),
        Some(json!({ "title": "Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (status, with_exp) = send(
        &app,
        Method::PUT,
        "/api/profile/experience",
        Some(&token),
        Some(json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01", "current": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let exp_id = with_exp["experience"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/profile/experience/does-not-exist",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Experience not found");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/profile/experience/{exp_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["experience"].as_array().unwrap().is_empty());

    // Education
    let (status, with_edu) = send(
        &app,
        Method::PUT,
        "/api/profile/education",
        Some(&token),
        Some(json!({
            "school": "MIT",
            "degree": "BSc",
            "fieldofstudy": "CS",
            "from": "2014-09-01",
            "to": "2018-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let edu_id = with_edu["education"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/profile/education/{edu_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["education"].as_array().unwrap().is_empty());

    // Account deletion removes profile and user, nobody else's data
    let other = register(&app, "Bob", "bob@x.com", "secret2").await;
    send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&other),
        Some(json!({ "status": "Designer", "skills": "figma" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "User deleted");

    let (status, body) = send(&app, Method::GET, "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "User not found");

    // The token outlives its account; writes with it are a client error
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/profile",
        Some(&token),
        Some(json!({ "status": "Developer", "skills": "rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "User not found");

    let (_, all) = send(&app, Method::GET, "/api/profile", None, None).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["user"]["name"], "Bob");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = test_app();

    for (method, uri) in [
        (Method::GET, "/api/profile/me"),
        (Method::POST, "/api/profile"),
        (Method::DELETE, "/api/profile"),
        (Method::PUT, "/api/profile/experience"),
        (Method::DELETE, "/api/profile/education/x"),
        (Method::GET, "/api/profile/github/octocat"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["msg"], "No token, authorization denied");
    }
}

async fn fake_github() -> String {
    let app = Router::new().route(
        "/users/:name/repos",
        get(|Path(name): Path<String>| async move {
            if name == "octocat" {
                Ok(Json(json!([{ "name": "hello-world", "stargazers_count": 42 }])))
            } else {
                Err(StatusCode::NOT_FOUND)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_github_proxy() {
    let state = test_state(&fake_github().await);
    let app = build_router(state);
    let token = register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/profile/github/octocat",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "hello-world");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/profile/github/nobody",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "No Github profile found");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/profile/github/-bad-",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
