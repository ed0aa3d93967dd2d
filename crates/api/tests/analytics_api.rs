//! Analytics over REST and GraphQL.

mod common;

use axum::http::StatusCode;
use common::{body_json, complete, create_habit, get_auth, post_json, post_json_auth};
use habitual_core::dates::{format_date_key, today_utc};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// REST
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_for_new_user_is_empty(pool: PgPool) {
    let (_, token) = common::register(&pool, "empty@example.com").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/analytics/dashboard",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stats = &json["data"];
    assert_eq!(stats["totalHabits"], 0);
    assert_eq!(stats["activeStreaks"], 0);
    assert_eq!(stats["completionRate"], 0.0);
    assert_eq!(stats["weeklyCompletions"], json!([]));
    assert_eq!(stats["habitStats"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_summarises_habits(pool: PgPool) {
    let (_, token) = common::register(&pool, "dash@example.com").await;
    let done = create_habit(&pool, &token, json!({ "name": "Done" })).await;
    create_habit(&pool, &token, json!({ "name": "Idle" })).await;
    let today = format_date_key(today_utc());
    complete(&pool, &token, done["id"].as_i64().unwrap(), &today).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/analytics/dashboard",
        &token,
    )
    .await;
    let json = body_json(response).await;
    let stats = &json["data"];

    assert_eq!(stats["totalHabits"], 2);
    assert_eq!(stats["activeStreaks"], 1);
    // One of two expected completions on day one.
    assert_eq!(stats["completionRate"], 50.0);
    assert_eq!(stats["weeklyCompletions"], json!([{ "date": today, "count": 1 }]));

    let habit_stats = stats["habitStats"].as_array().unwrap();
    assert_eq!(habit_stats.len(), 2);
    let done_stat = habit_stats
        .iter()
        .find(|s| s["habitName"] == "Done")
        .unwrap();
    assert_eq!(done_stat["currentStreak"], 1);
    assert_eq!(done_stat["totalCompletions"], 1);
    assert_eq!(done_stat["lastCompletionDate"], today);
    let idle_stat = habit_stats
        .iter()
        .find(|s| s["habitName"] == "Idle")
        .unwrap();
    assert_eq!(idle_stat["totalCompletions"], 0);
    assert!(idle_stat["lastCompletionDate"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn habit_analytics_reconstructs_runs_and_months(pool: PgPool) {
    let (_, token) = common::register(&pool, "hist@example.com").await;
    let habit = create_habit(&pool, &token, json!({ "name": "History" })).await;
    let id = habit["id"].as_i64().unwrap();
    for date in ["2024-01-30", "2024-01-31", "2024-02-01", "2024-02-05"] {
        complete(&pool, &token, id, date).await;
    }

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/analytics/habits/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let view = &json["data"];

    assert_eq!(view["habitId"], id);
    assert_eq!(view["completionsByDate"].as_array().unwrap().len(), 4);
    assert_eq!(
        view["streakHistory"],
        json!([
            { "startDate": "2024-01-30", "endDate": "2024-02-01", "length": 3 },
            { "startDate": "2024-02-05", "endDate": "2024-02-05", "length": 1 },
        ])
    );
    assert_eq!(
        view["monthlyStats"],
        json!([
            { "month": "2024-01", "completions": 2, "days": 2 },
            { "month": "2024-02", "completions": 2, "days": 2 },
        ])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn habit_analytics_of_foreign_habit_is_not_found(pool: PgPool) {
    let (_, owner) = common::register(&pool, "o@example.com").await;
    let (_, other) = common::register(&pool, "x@example.com").await;
    let habit = create_habit(&pool, &owner, json!({ "name": "Mine" })).await;

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/analytics/habits/{}", habit["id"]),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// GraphQL
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn graphql_without_token_fails_in_resolver(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/graphql",
        json!({ "query": "{ dashboard { totalHabits } }" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["message"], "Authentication required");
    assert_eq!(json["errors"][0]["extensions"]["code"], "AUTHENTICATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn graphql_matches_rest_payloads(pool: PgPool) {
    let (_, token) = common::register(&pool, "gql@example.com").await;
    let habit = create_habit(&pool, &token, json!({ "name": "Graph" })).await;
    let id = habit["id"].as_i64().unwrap();
    complete(&pool, &token, id, "2024-06-01").await;
    complete(&pool, &token, id, "2024-06-02").await;

    let query = format!(
        "{{ dashboard {{ totalHabits habitStats {{ habitName longestStreak totalCompletions }} }} \
           habitAnalytics(habitId: {id}) {{ streakHistory {{ startDate endDate length }} \
           monthlyStats {{ month completions days }} }} }}"
    );
    let response = post_json_auth(
        common::build_test_app(pool),
        "/graphql",
        json!({ "query": query }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json.get("errors").is_none(), "unexpected errors: {json}");

    let data = &json["data"];
    assert_eq!(data["dashboard"]["totalHabits"], 1);
    assert_eq!(data["dashboard"]["habitStats"][0]["habitName"], "Graph");
    assert_eq!(data["dashboard"]["habitStats"][0]["longestStreak"], 2);
    assert_eq!(data["dashboard"]["habitStats"][0]["totalCompletions"], 2);
    assert_eq!(
        data["habitAnalytics"]["streakHistory"],
        json!([{ "startDate": "2024-06-01", "endDate": "2024-06-02", "length": 2 }])
    );
    assert_eq!(
        data["habitAnalytics"]["monthlyStats"],
        json!([{ "month": "2024-06", "completions": 2, "days": 2 }])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn graphql_foreign_habit_reports_not_found_code(pool: PgPool) {
    let (_, owner) = common::register(&pool, "go@example.com").await;
    let (_, other) = common::register(&pool, "gx@example.com").await;
    let habit = create_habit(&pool, &owner, json!({ "name": "Hidden" })).await;

    let query = format!("{{ habitAnalytics(habitId: {}) {{ habitId }} }}", habit["id"]);
    let response = post_json_auth(
        common::build_test_app(pool),
        "/graphql",
        json!({ "query": query }),
        &other,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["extensions"]["code"], "NOT_FOUND");
}
