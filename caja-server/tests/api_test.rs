use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use caja_core::activities::register_builtins;
use caja_core::{ActivityRegistry, SessionService};
use caja_server::{router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let mut registry = ActivityRegistry::new();
    register_builtins(&mut registry).unwrap();

    let service = SessionService::new(Arc::new(registry));
    router(AppState::new(service))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn create_session(app: &Router) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/sessions",
        Some(serde_json::json!({"name": "Town Hall", "admin_name": "Alice"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_poll(app: &Router, session_id: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/activities"),
        Some(serde_json::json!({
            "type": "poll",
            "title": "Lunch poll",
            "configuration": {
                "question": "Lunch?",
                "options": ["Tacos", "Ramen"],
                "allow_multiple": false
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_create_and_fetch_session() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap();

    assert_eq!(session["name"], "Town Hall");
    assert_eq!(session["participants"].as_array().unwrap().len(), 1);
    assert_eq!(session["join_code"].as_str().unwrap().len(), 6);

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], session["id"]);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app();

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/sessions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_full_poll_lifecycle() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    // Participant joins
    let (status, participant) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/participants"),
        Some(serde_json::json!({"name": "Bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let participant_id = participant["id"].as_str().unwrap().to_string();

    // Plan a poll
    let activity = create_poll(&app, &session_id).await;
    let activity_id = activity["id"].as_str().unwrap().to_string();
    assert_eq!(activity["status"], "draft");

    // Activate it
    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}"),
        Some(serde_json::json!({"status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "active");

    // Submit a vote
    let (status, submitted) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/responses"),
        Some(serde_json::json!({
            "participant_id": participant_id,
            "response_data": {
                "type": "poll",
                "version": "1",
                "data": {"selected": ["Tacos"]},
                "metadata": null
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submitted["response_count"], 1);

    // Poll the snapshot
    let (status, snapshot) = send(
        &app,
        "GET",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["status"], "active");
    assert_eq!(snapshot["response_count"], 1);
    assert_eq!(snapshot["results"]["vote_counts"]["Tacos"], 1);
    assert_eq!(snapshot["results"]["percentages"]["Tacos"], 100.0);
    assert_eq!(
        snapshot["valid_transitions"],
        serde_json::json!(["completed", "cancelled"])
    );

    // Responses are listed
    let (status, responses) = send(
        &app,
        "GET",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/responses"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(responses.as_array().unwrap().len(), 1);

    // Session status reflects the running activity
    let (status, session_status) = send(
        &app,
        "GET",
        &format!("/api/v1/sessions/{session_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session_status["participant_count"], 2);
    assert_eq!(session_status["current_activity"]["title"], "Lunch poll");

    // Complete it
    let (status, completed) = send(
        &app,
        "PATCH",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}"),
        Some(serde_json::json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
}

#[tokio::test]
async fn test_invalid_config_save_is_422() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let activity = create_poll(&app, &session_id).await;
    let activity_id = activity["id"].as_str().unwrap().to_string();

    // One option: refused by the poll type's validation hook
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}"),
        Some(serde_json::json!({
            "configuration": {"question": "Lunch?", "options": ["Tacos"]}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("two options"));
}

#[tokio::test]
async fn test_submit_to_draft_activity_is_409() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();
    let admin_id = session["admin_id"].as_str().unwrap().to_string();

    let activity = create_poll(&app, &session_id).await;
    let activity_id = activity["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/responses"),
        Some(serde_json::json!({
            "participant_id": admin_id,
            "response_data": {"type": "poll", "data": {"selected": ["Tacos"]}}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_vote_is_422() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();
    let admin_id = session["admin_id"].as_str().unwrap().to_string();

    let activity = create_poll(&app, &session_id).await;
    let activity_id = activity["id"].as_str().unwrap().to_string();

    send(
        &app,
        "PATCH",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}"),
        Some(serde_json::json!({"status": "active"})),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/responses"),
        Some(serde_json::json!({
            "participant_id": admin_id,
            "response_data": {"type": "poll", "data": {"selected": ["Pizza"]}}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("unknown option"));
}

#[tokio::test]
async fn test_unregistered_type_can_be_planned() {
    let app = app();

    let session = create_session(&app).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let (status, activity) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{session_id}/activities"),
        Some(serde_json::json!({"type": "mystery", "title": "M"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let activity_id = activity["id"].as_str().unwrap().to_string();

    // Snapshot still works; results are null without a registered aggregator
    let (status, snapshot) = send(
        &app,
        "GET",
        &format!("/api/v1/sessions/{session_id}/activities/{activity_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot["results"].is_null());
}
