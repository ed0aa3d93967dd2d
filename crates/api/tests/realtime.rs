//! Real-time channel: handshake auth and event fan-out to user rooms.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use axum::http::StatusCode;
use common::{body_json, get, post_json_auth};
use habitual_api::middleware::auth::AuthUser;
use habitual_api::notifications::NotificationRouter;
use habitual_api::router::build_app_router;
use habitual_api::state::AppState;
use habitual_api::ws::dispatch;
use habitual_events::HabitEventKind;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;

async fn next_frame(rx: &mut UnboundedReceiver<Message>) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("frame should arrive")
        .expect("channel open");
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upgrade_without_token_is_unauthorized(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/ws").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "AUTHENTICATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upgrade_with_bad_token_is_unauthorized(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/ws?token=forged").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_token_passes_auth(pool: PgPool) {
    let (_, token) = common::register(&pool, "ws@example.com").await;

    // A plain GET is not an upgrade, so it fails after authentication.
    let response = get(common::build_test_app(pool), &format!("/ws?token={token}")).await;
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn mutations_reach_only_the_owners_sessions(pool: PgPool) {
    let (owner_id, token) = common::register(&pool, "fan@example.com").await;
    let (other_id, _) = common::register(&pool, "quiet@example.com").await;

    let state = common::test_state(pool);
    let mut owner_rx = state.ws_manager.add("owner-tab".into(), owner_id).await;
    let mut other_rx = state.ws_manager.add("other-tab".into(), other_id).await;
    let router = NotificationRouter::new(Arc::clone(&state.ws_manager));
    tokio::spawn(router.run(state.event_bus.subscribe()));

    let app = build_app_router(state.clone(), &common::test_config());
    let created = post_json_auth(app.clone(), "/api/v1/habits", json!({ "name": "Live" }), &token)
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let habit_id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let frame = next_frame(&mut owner_rx).await;
    assert_eq!(frame["event"], "habit:created");
    assert_eq!(frame["data"]["habit"]["name"], "Live");
    assert_eq!(frame["data"]["habit"]["id"], habit_id);
    assert!(frame["data"]["timestamp"].is_string());

    let completed = post_json_auth(
        app,
        &format!("/api/v1/habits/{habit_id}/complete"),
        json!({ "date": "2024-08-01" }),
        &token,
    )
    .await;
    assert_eq!(completed.status(), StatusCode::CREATED);

    let frame = next_frame(&mut owner_rx).await;
    assert_eq!(frame["event"], "habit:completed");
    assert_eq!(frame["data"]["habitId"], habit_id);
    assert_eq!(frame["data"]["date"], "2024-08-01");
    assert_eq!(frame["data"]["streak"], 1);

    assert!(other_rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Client events
// ---------------------------------------------------------------------------

fn caller(user_id: i64) -> AuthUser {
    AuthUser {
        user_id,
        email: format!("user{user_id}@example.com"),
        role: "user".to_string(),
    }
}

async fn send(state: &AppState, user: &AuthUser, frame: Value) -> Option<Value> {
    dispatch(state, user, &frame.to_string())
        .await
        .map(|reply| serde_json::to_value(reply).unwrap())
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_frame_gets_validation_error(pool: PgPool) {
    let state = common::test_state(pool);

    let reply = dispatch(&state, &caller(1), "not json").await.unwrap();
    assert_eq!(reply.event, "error");
    assert_eq!(reply.data["code"], "VALIDATION_ERROR");

    let reply = send(&state, &caller(1), json!({ "event": "habit:complete", "data": {} }))
        .await
        .unwrap();
    assert_eq!(reply["data"]["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joining_own_room_is_acknowledged(pool: PgPool) {
    let (user_id, _) = common::register(&pool, "join@example.com").await;
    let state = common::test_state(pool);

    let reply = send(
        &state,
        &caller(user_id),
        json!({ "event": "join:user-room", "data": { "userId": user_id } }),
    )
    .await
    .unwrap();

    assert_eq!(reply["event"], "joined:user-room");
    assert_eq!(reply["data"]["userId"], user_id);
    assert!(reply["data"]["timestamp"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joining_another_users_room_is_refused(pool: PgPool) {
    let (user_id, _) = common::register(&pool, "nosy@example.com").await;
    let state = common::test_state(pool);

    let reply = send(
        &state,
        &caller(user_id),
        json!({ "event": "join:user-room", "data": { "userId": user_id + 1 } }),
    )
    .await
    .unwrap();

    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], "AUTHORIZATION_ERROR");
    assert_eq!(reply["data"]["message"], "Cannot join another user's room");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn socket_completion_publishes_and_duplicate_is_reported(pool: PgPool) {
    let (user_id, token) = common::register(&pool, "sock@example.com").await;
    let habit = common::create_habit(&pool, &token, json!({ "name": "Swim" })).await;
    let habit_id = habit["id"].as_i64().unwrap();

    let state = common::test_state(pool);
    let mut events = state.event_bus.subscribe();
    let user = caller(user_id);
    let complete = json!({
        "event": "habit:complete",
        "data": { "habitId": habit_id, "date": "2024-07-04" },
    });

    assert!(send(&state, &user, complete.clone()).await.is_none());
    let event = events.recv().await.unwrap();
    assert_eq!(event.kind, HabitEventKind::HabitCompleted);
    assert_eq!(event.payload["date"], "2024-07-04");
    assert_eq!(event.payload["streak"], 1);

    let reply = send(&state, &user, complete).await.unwrap();
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], "COMPLETION_ERROR");
    assert_eq!(reply["data"]["message"], "Habit already completed for this date");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn socket_uncompletion_failure_is_reported(pool: PgPool) {
    let (user_id, token) = common::register(&pool, "unsock@example.com").await;
    let habit = common::create_habit(&pool, &token, json!({ "name": "Nap" })).await;
    let habit_id = habit["id"].as_i64().unwrap();
    let state = common::test_state(pool);

    let reply = send(
        &state,
        &caller(user_id),
        json!({
            "event": "habit:uncomplete",
            "data": { "habitId": habit_id, "date": "2024-07-05" },
        }),
    )
    .await
    .unwrap();

    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], "UNCOMPLETION_ERROR");
}
