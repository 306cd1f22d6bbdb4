//! End-to-end smoke tests for the full roomrunnerd stack.
//!
//! Each test spins up the complete application (temp-dir JSON config
//! store, real executors, real room manager, real axum router) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot` — no TCP
//! port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use roomrunner_adapter_config_json::JsonRoomConfigStore;
use roomrunner_adapter_http_axum::router;
use roomrunner_adapter_http_axum::state::AppState;
use roomrunner_adapter_webhook_reqwest::ReqwestWebhookTransport;
use roomrunner_domain::event::{Effect, RoomEvent};
use roomrunner_domain::id::RoomId;
use roomrunner_engine::event_bus::InProcessEventBus;
use roomrunner_engine::executor::ExecutorRegistry;
use roomrunner_engine::manager::RoomManager;
use roomrunner_engine::ports::WebhookTransport;
use tokio::sync::broadcast;

/// Fully wired application plus the handles the tests observe.
struct TestApp {
    app: axum::Router,
    bus: Arc<InProcessEventBus>,
    room_id: RoomId,
    rooms_dir: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.rooms_dir);
    }
}

impl TestApp {
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.bus.subscribe()
    }
}

/// Build a fully-wired router backed by a unique temp-dir room store
/// holding one room document in the editor's JSON shape.
fn test_app() -> TestApp {
    let room_id = RoomId::new();
    let rooms_dir = std::env::temp_dir().join(format!("roomrunnerd-it-{room_id}"));
    std::fs::create_dir_all(&rooms_dir).expect("temp rooms dir should be writable");

    let document = serde_json::json!({
        "id": room_id,
        "name": "The Vault",
        "variables": [
            {"name": "door_open", "type": "boolean", "value": false},
            {"name": "puzzle_count", "type": "number", "value": 0}
        ],
        "triggers": [
            {
                "name": "Door Opens",
                "watchedVariable": "door_open",
                "condition": {"operator": "equals", "comparand": true},
                "actions": [
                    {"type": "play_sound", "sound": "creak"},
                    {"type": "show_message", "message": "The door creaks open", "duration_secs": 3}
                ]
            }
        ]
    });
    std::fs::write(
        rooms_dir.join(format!("{room_id}.json")),
        document.to_string(),
    )
    .expect("room document should be writable");

    let bus = Arc::new(InProcessEventBus::new(256));
    let transport: Arc<dyn WebhookTransport> = Arc::new(ReqwestWebhookTransport::new());
    let manager = Arc::new(RoomManager::new(
        JsonRoomConfigStore::new(rooms_dir.clone()),
        Arc::new(ExecutorRegistry::standard(transport)),
        Arc::clone(&bus),
    ));

    TestApp {
        app: router::build(AppState::new(manager)),
        bus,
        room_id,
        rooms_dir,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let test = test_app();
    let resp = test.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Room listing & activation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_list_persisted_rooms() {
    let test = test_app();

    let resp = test.app.clone().oneshot(get("/api/rooms")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let rooms = body.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "The Vault");
}

#[tokio::test]
async fn should_activate_room_and_expose_variables() {
    let test = test_app();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test
        .app
        .clone()
        .oneshot(get(&format!("/api/rooms/{}/variables", test.room_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"door_open"));
    assert!(names.contains(&"puzzle_count"));
    // System variables are seeded on activation.
    assert!(names.contains(&"timer_main"));
    assert!(names.contains(&"timer_main_remaining"));
}

#[tokio::test]
async fn should_return_not_found_when_activating_unknown_room() {
    let test = test_app();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", RoomId::new()),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_return_not_found_for_variables_of_inactive_room() {
    let test = test_app();

    let resp = test
        .app
        .clone()
        .oneshot(get(&format!("/api/rooms/{}/variables", test.room_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Variable writes fire triggers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_fire_trigger_effects_on_api_write() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let mut events = test.subscribe();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/variables/door_open", test.room_id),
            &serde_json::json!({"value": true}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["name"], "door_open");
    assert_eq!(body["value"], true);
    assert_eq!(body["version"], 1);

    // The bus carries the change, both effects, and the trigger firing.
    let mut effects = Vec::new();
    let mut fired = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            RoomEvent::Effect { effect, .. } => effects.push(effect),
            RoomEvent::TriggerFired { .. } => fired += 1,
            _ => {}
        }
    }
    assert_eq!(fired, 1);
    assert_eq!(effects.len(), 2);
    assert!(matches!(&effects[0], Effect::PlaySound { sound, .. } if sound == "creak"));
    assert!(matches!(&effects[1], Effect::ShowMessage { .. }));
}

#[tokio::test]
async fn should_not_refire_on_identical_write() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let uri = format!("/api/rooms/{}/variables/door_open", test.room_id);
    test.app
        .clone()
        .oneshot(post_json(&uri, &serde_json::json!({"value": true})))
        .await
        .unwrap();

    let mut events = test.subscribe();
    let resp = test
        .app
        .clone()
        .oneshot(post_json(&uri, &serde_json::json!({"value": true})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn should_reject_non_coercible_write_with_bad_request() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/variables/puzzle_count", test.room_id),
            &serde_json::json!({"value": "many"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("not coercible"));
}

#[tokio::test]
async fn should_reject_write_to_system_variable() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/variables/timer_main", test.room_id),
            &serde_json::json!({"value": "running"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_timer_and_mirror_system_variables() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/timer", test.room_id),
            &serde_json::json!({"command": "start", "duration_secs": 3600}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["changed"], true);

    let resp = test
        .app
        .clone()
        .oneshot(get(&format!("/api/rooms/{}/variables", test.room_id)))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let timer = body
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["name"] == "timer_main")
        .unwrap()
        .clone();
    assert_eq!(timer["value"], "running");
}

#[tokio::test]
async fn should_report_invalid_timer_transition_as_unchanged() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/timer", test.room_id),
            &serde_json::json!({"command": "pause"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["changed"], false);
}

// ---------------------------------------------------------------------------
// Trigger persistence (editor write-back)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_update_and_reload_triggers() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let replacement = serde_json::json!([{
        "name": "Door Closes",
        "watchedVariable": "door_open",
        "condition": {"operator": "equals", "comparand": false},
        "actions": [{"type": "show_message", "message": "The door slams shut"}]
    }]);

    let resp = test
        .app
        .clone()
        .oneshot(put_json(
            &format!("/api/rooms/{}/triggers", test.room_id),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test
        .app
        .clone()
        .oneshot(get(&format!("/api/rooms/{}/triggers", test.room_id)))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let triggers = body.as_array().unwrap();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0]["name"], "Door Closes");

    // The reloaded registry reacts to the new rule: door_open is already
    // false, so write true then false to cross the condition.
    let uri = format!("/api/rooms/{}/variables/door_open", test.room_id);
    test.app
        .clone()
        .oneshot(post_json(&uri, &serde_json::json!({"value": true})))
        .await
        .unwrap();

    let mut events = test.subscribe();
    test.app
        .clone()
        .oneshot(post_json(&uri, &serde_json::json!({"value": false})))
        .await
        .unwrap();

    let mut saw_message = false;
    while let Ok(event) = events.try_recv() {
        if let RoomEvent::Effect {
            effect: Effect::ShowMessage { message, .. },
            ..
        } = event
        {
            assert_eq!(message, "The door slams shut");
            saw_message = true;
        }
    }
    assert!(saw_message);
}

// ---------------------------------------------------------------------------
// Deactivation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_tear_down_room_on_deactivation() {
    let test = test_app();
    test.app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/activate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();

    let resp = test
        .app
        .clone()
        .oneshot(post_json(
            &format!("/api/rooms/{}/deactivate", test.room_id),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test
        .app
        .clone()
        .oneshot(get(&format!("/api/rooms/{}/variables", test.room_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
