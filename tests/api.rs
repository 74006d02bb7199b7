//! End-to-end tests over the HTTP surface with an in-memory database and a
//! scripted completion backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use docchat::api::{create_router, AppState};
use docchat::config::Config;
use docchat::llm::MockBackend;

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: "sqlite::memory:".to_string(),
        static_dir: "./build".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_base_url: "http://localhost:1".to_string(),
        db_max_connections: 1,
        db_min_connections: 1,
        request_timeout_secs: 5,
    }
}

async fn test_app(backend: MockBackend) -> Router {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("migrations");

    create_router(AppState {
        db,
        llm: Arc::new(backend),
        config: Arc::new(test_config()),
    })
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/register",
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn create_session(app: &Router, user_id: i64, title: Option<&str>) -> Value {
    let mut payload = json!({"user_id": user_id});
    if let Some(title) = title {
        payload["title"] = json!(title);
    }
    let (status, body) = request_json(app, "POST", "/api/sessions", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn register_then_duplicate_email_fails_cleanly() {
    let app = test_app(MockBackend::new()).await;

    let first = register(&app, "a@example.com", "password123").await;
    assert_eq!(first["success"], json!(true));
    assert_eq!(first["email"], json!("a@example.com"));
    let user_id = first["user_id"].as_i64().expect("user_id");

    let second = register(&app, "a@example.com", "other-password").await;
    assert_eq!(second["success"], json!(false));
    assert_eq!(second["error"], json!("Email already exists"));

    // The first registration is still loginable.
    let (status, login) = request_json(
        &app,
        "POST",
        "/api/login",
        Some(json!({"email": "a@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["success"], json!(true));
    assert_eq!(login["user_id"].as_i64(), Some(user_id));
}

#[tokio::test]
async fn login_rejects_one_character_off_password() {
    let app = test_app(MockBackend::new()).await;
    register(&app, "b@example.com", "password123").await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/login",
        Some(json!({"email": "b@example.com", "password": "password124"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Invalid email or password"));
}

#[tokio::test]
async fn session_without_title_defaults_and_lists_for_owner() {
    let app = test_app(MockBackend::new()).await;
    let user = register(&app, "c@example.com", "pw").await;
    let user_id = user["user_id"].as_i64().unwrap();

    let created = create_session(&app, user_id, None).await;
    assert_eq!(created["title"], json!("New Chat"));

    let (status, listed) =
        request_json(&app, "GET", &format!("/api/sessions?user_id={user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = listed["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["title"], json!("New Chat"));
    assert_eq!(sessions[0]["id"], created["session_id"]);
}

#[tokio::test]
async fn chat_turn_round_trips_through_message_listing() {
    let backend = MockBackend::new().with_reply("The answer is 42.");
    let app = test_app(backend).await;
    let user_id = register(&app, "d@example.com", "pw").await["user_id"]
        .as_i64()
        .unwrap();
    let session_id = create_session(&app, user_id, Some("Math")).await["session_id"]
        .as_i64()
        .unwrap();

    let (status, reply) = request_json(
        &app,
        "POST",
        "/api/chat",
        Some(json!({
            "message": "What is the answer?",
            "user_id": user_id,
            "session_id": session_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["response"], json!("The answer is 42."));

    let (_, listed) =
        request_json(&app, "GET", &format!("/api/messages/{session_id}"), None).await;
    let messages = listed["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], json!("user"));
    assert_eq!(messages[0]["text"], json!("What is the answer?"));
    assert_eq!(messages[1]["sender"], json!("bot"));
    assert_eq!(messages[1]["text"], json!("The answer is 42."));
    // Both entries carry the turn's timestamp.
    assert_eq!(messages[0]["timestamp"], messages[1]["timestamp"]);
}

#[tokio::test]
async fn empty_message_returns_notice_and_stores_nothing() {
    let app = test_app(MockBackend::new().with_reply("unused")).await;
    let user_id = register(&app, "e@example.com", "pw").await["user_id"]
        .as_i64()
        .unwrap();
    let session_id = create_session(&app, user_id, None).await["session_id"]
        .as_i64()
        .unwrap();

    let (status, reply) = request_json(
        &app,
        "POST",
        "/api/chat",
        Some(json!({"message": "   ", "user_id": user_id, "session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["response"], json!("Please enter a message"));

    let (_, listed) =
        request_json(&app, "GET", &format!("/api/messages/{session_id}"), None).await;
    assert!(listed["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn backend_failure_is_flattened_into_the_response_envelope() {
    let app = test_app(MockBackend::new().with_error("connection refused")).await;
    let user_id = register(&app, "f@example.com", "pw").await["user_id"]
        .as_i64()
        .unwrap();
    let session_id = create_session(&app, user_id, None).await["session_id"]
        .as_i64()
        .unwrap();

    let (status, reply) = request_json(
        &app,
        "POST",
        "/api/chat",
        Some(json!({"message": "hi", "user_id": user_id, "session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    assert!(text.starts_with("Error:"), "got: {text}");
    assert!(text.contains("connection refused"));
}

#[tokio::test]
async fn deleting_a_session_cascades_to_its_messages() {
    let backend = MockBackend::new().with_reply("reply one").with_reply("reply two");
    let app = test_app(backend).await;
    let user_id = register(&app, "g@example.com", "pw").await["user_id"]
        .as_i64()
        .unwrap();
    let session_id = create_session(&app, user_id, None).await["session_id"]
        .as_i64()
        .unwrap();

    for message in ["first", "second"] {
        request_json(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"message": message, "user_id": user_id, "session_id": session_id})),
        )
        .await;
    }

    let (status, deleted) =
        request_json(&app, "DELETE", &format!("/api/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], json!(true));

    let (_, listed) =
        request_json(&app, "GET", &format!("/api/sessions?user_id={user_id}"), None).await;
    assert!(listed["sessions"].as_array().unwrap().is_empty());

    let (_, messages) =
        request_json(&app, "GET", &format!("/api/messages/{session_id}"), None).await;
    assert!(messages["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rename_and_derive_title_from_first_message() {
    let long_message = "x".repeat(35);
    let backend = MockBackend::new().with_reply("noted");
    let app = test_app(backend).await;
    let user_id = register(&app, "h@example.com", "pw").await["user_id"]
        .as_i64()
        .unwrap();
    let session_id = create_session(&app, user_id, None).await["session_id"]
        .as_i64()
        .unwrap();

    // Deriving before any message exists reports failure.
    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/sessions/{session_id}/update-title"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    request_json(
        &app,
        "POST",
        "/api/chat",
        Some(json!({"message": long_message, "user_id": user_id, "session_id": session_id})),
    )
    .await;

    let (_, derived) = request_json(
        &app,
        "POST",
        &format!("/api/sessions/{session_id}/update-title"),
        None,
    )
    .await;
    assert_eq!(derived["success"], json!(true));
    assert_eq!(derived["title"], json!(format!("{}...", "x".repeat(30))));

    // Explicit rename overwrites unconditionally.
    let (_, renamed) = request_json(
        &app,
        "PUT",
        &format!("/api/sessions/{session_id}"),
        Some(json!({"title": "Renamed"})),
    )
    .await;
    assert_eq!(renamed["success"], json!(true));

    let (_, listed) =
        request_json(&app, "GET", &format!("/api/sessions?user_id={user_id}"), None).await;
    assert_eq!(listed["sessions"][0]["title"], json!("Renamed"));
}

#[tokio::test]
async fn upload_of_whitespace_only_text_file_reports_empty() {
    let app = test_app(MockBackend::new().with_reply("unused")).await;

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"blank.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n   \t  \r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["analysis"], json!("File appears to be empty"));
    assert_eq!(value["content"], json!(""));
}

#[tokio::test]
async fn upload_of_text_file_returns_analysis_and_content() {
    let app = test_app(MockBackend::new().with_reply("### Summary of notes")).await;

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nquarterly planning notes\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["analysis"], json!("### Summary of notes"));
    assert_eq!(value["content"], json!("quarterly planning notes"));
}

#[tokio::test]
async fn upload_without_file_field_reports_error_envelope() {
    let app = test_app(MockBackend::new()).await;

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["error"], json!("No file uploaded"));
}

#[tokio::test]
async fn health_endpoint_reports_version() {
    let app = test_app(MockBackend::new()).await;
    let (status, body) = request_json(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}
