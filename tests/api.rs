// HTTP surface: auth, game management permissions and error mapping.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::TestApp;
use quiz_backend::api::{router, AppState};

fn app(test: &TestApp) -> Router {
    router(AppState::new(test.quiz.clone(), test.identity.clone()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": name, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

fn new_game() -> Value {
    json!({
        "difficulty": 3,
        "number_of_questions": 1,
        "participants_number": 4,
        "topic_id": 1,
        "is_private": false
    })
}

#[tokio::test]
async fn test_health() {
    let test = TestApp::in_memory().await;
    let (status, body) = send(&app(&test), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let test = TestApp::in_memory().await;
    let app = app(&test);
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["global_points"], 0);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let test = TestApp::in_memory().await;
    let app = app(&test);
    let (status, body) = send(&app, "POST", "/api/games", None, Some(new_game())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/api/games", Some("bogus"), Some(new_game())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_join_and_author_checks() {
    let test = TestApp::in_memory().await;
    let app = app(&test);
    let host = register(&app, "host").await;
    let guest = register(&app, "guest").await;

    let (status, game) = send(&app, "POST", "/api/games", Some(&host), Some(new_game())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(game["participants"], 1);
    assert_eq!(game["status"], "WAITING");
    assert_eq!(game["difficulty"], "HARD");
    let id = game["id"].as_i64().unwrap();

    let (status, open) = send(&app, "GET", "/api/games/open?topic_id=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(open.as_array().unwrap().len(), 1);

    let (status, joined) = send(&app, "POST", &format!("/api/games/{id}/join"), Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["participants"], 2);

    let (status, _) = send(&app, "POST", &format!("/api/games/{id}/start"), Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/api/games/{id}"), Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, started) = send(&app, "POST", &format!("/api/games/{id}/start"), Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "ACTIVE");

    let (status, _) = send(&app, "POST", &format!("/api/games/{id}/start"), Some(&host), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, lobby) = send(&app, "GET", &format!("/api/games/{id}/lobby"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lobby["participants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_question_and_answer_flow() {
    let test = TestApp::in_memory().await;
    let app = app(&test);
    let host = register(&app, "host").await;

    let (_, game) = send(&app, "POST", "/api/games", Some(&host), Some(new_game())).await;
    let id = game["id"].as_i64().unwrap();
    send(&app, "POST", &format!("/api/games/{id}/start"), Some(&host), None).await;

    let questions = json!({
        "questions": [{
            "question_number": 1,
            "question_text": "2 + 2?",
            "answers": ["3", "4", "5", "22"],
            "right_answer_number": 2
        }]
    });
    let (status, loaded) = send(
        &app,
        "POST",
        &format!("/api/games/{id}/questions"),
        Some(&host),
        Some(questions),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loaded["loaded"], 1);

    let (status, q) = send(&app, "POST", &format!("/api/games/{id}/questions/next"), Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(q["question_text"], "2 + 2?");
    assert!(q.get("right_answer_number").is_none());

    let (status, _) = send(&app, "POST", &format!("/api/games/{id}/questions/next"), Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, answer) = send(
        &app,
        "GET",
        &format!("/api/games/{id}/questions/1/answer"),
        Some(&host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["right_answer_number"], 2);

    let (status, score) = send(
        &app,
        "POST",
        &format!("/api/games/{id}/answers"),
        Some(&host),
        Some(json!({ "question_number": 1, "answer_number": 2, "elapsed_seconds": 20.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["awarded"], 150);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/games/{id}/answers"),
        Some(&host),
        Some(json!({ "question_number": 1, "answer_number": 9, "elapsed_seconds": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, board) = send(&app, "GET", &format!("/api/games/{id}/leaderboard"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board[0]["points"], 150);

    let (status, _) = send(&app, "POST", &format!("/api/games/{id}/stop"), Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, history) = send(&app, "GET", "/api/users/me/games", Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["points"], 150);

    let (status, global) = send(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(global[0]["global_points"], 150);
}

#[tokio::test]
async fn test_missing_game_is_not_found() {
    let test = TestApp::in_memory().await;
    let app = app(&test);
    let (status, body) = send(&app, "GET", "/api/games/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}
