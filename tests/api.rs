mod common;

use common::test_server::TestServer;
use serde_json::{Value, json};

const STARTED_AT: &str = "2025-01-27T09:00:00Z";

async fn create_workout(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
) -> i64 {
    let resp = client
        .post(format!("{}/api/v1/workouts", base_url))
        .bearer_auth(token)
        .json(&json!({"name": name, "started_at": STARTED_AT}))
        .send()
        .await
        .expect("create workout");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse workout");
    body["data"]["id"].as_i64().expect("workout id")
}

async fn add_exercise_by_name(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    workout_id: i64,
    name: &str,
) -> Value {
    let resp = client
        .post(format!("{}/api/v1/workouts/{}/exercises", base_url, workout_id))
        .bearer_auth(token)
        .json(&json!({"exercise_name": name}))
        .send()
        .await
        .expect("add exercise");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse link");
    body["data"].clone()
}

async fn create_set(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    workout_id: i64,
    workout_exercise_id: i64,
    reps: i64,
) -> Value {
    let resp = client
        .post(format!(
            "{}/api/v1/workout-exercises/{}/sets",
            base_url, workout_exercise_id
        ))
        .bearer_auth(token)
        .json(&json!({"workout_id": workout_id, "reps": reps, "weight": "100.00"}))
        .send()
        .await
        .expect("create set");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse set");
    body["data"].clone()
}

#[tokio::test]
async fn test_workout_crud_and_ownership() {
    let server = TestServer::start().await;
    let alice = server.mint_token("alice");
    let bob = server.mint_token("bob");
    let client = reqwest::Client::new();

    let workout_id = create_workout(&client, &server.base_url, &alice, "Push Day").await;

    // Owner sees the row
    let resp = client
        .get(format!("{}/api/v1/workouts/{}", server.base_url, workout_id))
        .bearer_auth(&alice)
        .send()
        .await
        .expect("get workout");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["name"], "Push Day");

    // Anyone else gets the same answer as for a missing row
    let resp = client
        .get(format!("{}/api/v1/workouts/{}", server.base_url, workout_id))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("get workout as bob");
    assert_eq!(resp.status(), 404);

    let update = json!({
        "name": "Pull Day",
        "started_at": "2025-01-27T10:30:00Z",
        "notes": "rings today"
    });
    let resp = client
        .put(format!("{}/api/v1/workouts/{}", server.base_url, workout_id))
        .bearer_auth(&bob)
        .json(&update)
        .send()
        .await
        .expect("update as bob");
    assert_eq!(resp.status(), 404);

    let resp = client
        .put(format!("{}/api/v1/workouts/{}", server.base_url, workout_id))
        .bearer_auth(&alice)
        .json(&update)
        .send()
        .await
        .expect("update as alice");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["name"], "Pull Day");
    assert_eq!(body["data"]["notes"], "rings today");
}

#[tokio::test]
async fn test_day_view_lists_workouts_with_summaries() {
    let server = TestServer::start().await;
    let alice = server.mint_token("alice");
    let client = reqwest::Client::new();

    let workout_id = create_workout(&client, &server.base_url, &alice, "Push Day").await;
    add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "Bench Press").await;
    add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "Dips").await;

    // Query with the same instant the workout was created at, so both
    // fall on the same local calendar day regardless of server time zone
    let resp = client
        .get(format!("{}/api/v1/workouts", server.base_url))
        .query(&[("date", STARTED_AT)])
        .bearer_auth(&alice)
        .send()
        .await
        .expect("list workouts");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");

    let day = body["data"].as_array().expect("day view array");
    assert_eq!(day.len(), 1);
    let names: Vec<&str> = day[0]["exercises"]
        .as_array()
        .expect("summaries")
        .iter()
        .map(|e| e["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Bench Press", "Dips"]);

    // Two days later is a different local day everywhere
    let resp = client
        .get(format!("{}/api/v1/workouts", server.base_url))
        .query(&[("date", "2025-01-29T09:00:00Z")])
        .bearer_auth(&alice)
        .send()
        .await
        .expect("list other day");
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"].as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn test_exercise_linking_and_set_numbering() {
    let server = TestServer::start().await;
    let alice = server.mint_token("alice");
    let bob = server.mint_token("bob");
    let client = reqwest::Client::new();

    let workout_id = create_workout(&client, &server.base_url, &alice, "Push Day").await;

    // Same name in a different casing resolves to the same catalog row
    let first = add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "Bench Press").await;
    let second = add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "bench press").await;
    assert_eq!(first["exercise_id"], second["exercise_id"]);
    assert_eq!(first["position"], 0);
    assert_eq!(second["position"], 1);

    let link_id = first["id"].as_i64().expect("link id");

    // Sets number from 1 and never reuse a freed number
    let mut set_ids = Vec::new();
    for (i, reps) in [5, 5, 3].iter().enumerate() {
        let set = create_set(&client, &server.base_url, &alice, workout_id, link_id, *reps).await;
        assert_eq!(set["set_number"], i as i64 + 1);
        set_ids.push(set["id"].as_i64().expect("set id"));
    }

    let resp = client
        .delete(format!("{}/api/v1/sets/{}", server.base_url, set_ids[1]))
        .query(&[("workout_id", workout_id)])
        .bearer_auth(&alice)
        .send()
        .await
        .expect("delete set");
    assert_eq!(resp.status(), 204);

    let fourth = create_set(&client, &server.base_url, &alice, workout_id, link_id, 8).await;
    assert_eq!(fourth["set_number"], 4);

    // Update replaces both fields; omitting weight clears it
    let resp = client
        .put(format!("{}/api/v1/sets/{}", server.base_url, set_ids[0]))
        .bearer_auth(&alice)
        .json(&json!({"workout_id": workout_id, "reps": 10}))
        .send()
        .await
        .expect("update set");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["reps"], 10);
    assert!(body["data"].get("weight").is_none());

    // Bob cannot reach any of it through the ownership chain
    let resp = client
        .get(format!(
            "{}/api/v1/workouts/{}/exercises",
            server.base_url, workout_id
        ))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("list as bob");
    assert_eq!(resp.status(), 404);

    let resp = client
        .put(format!("{}/api/v1/sets/{}", server.base_url, set_ids[0]))
        .bearer_auth(&bob)
        .json(&json!({"workout_id": workout_id, "reps": 1}))
        .send()
        .await
        .expect("update set as bob");
    assert_eq!(resp.status(), 404);

    // Removing the link cascades to its sets
    let resp = client
        .delete(format!(
            "{}/api/v1/workout-exercises/{}",
            server.base_url, link_id
        ))
        .bearer_auth(&alice)
        .send()
        .await
        .expect("remove exercise");
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!(
            "{}/api/v1/workouts/{}/exercises",
            server.base_url, workout_id
        ))
        .bearer_auth(&alice)
        .send()
        .await
        .expect("list exercises");
    let body: Value = resp.json().await.expect("parse");
    let remaining = body["data"].as_array().expect("array");
    assert_eq!(remaining.len(), 1, "only the second link remains");
    assert_eq!(remaining[0]["position"], 1);
    assert_eq!(remaining[0]["sets"].as_array().expect("sets").len(), 0);
}

#[tokio::test]
async fn test_validation_and_auth_outcomes() {
    let server = TestServer::start().await;
    let alice = server.mint_token("alice");
    let client = reqwest::Client::new();

    // No token
    let resp = client
        .get(format!("{}/api/v1/exercises", server.base_url))
        .send()
        .await
        .expect("unauthenticated");
    assert_eq!(resp.status(), 401);

    // Garbage token
    let resp = client
        .get(format!("{}/api/v1/exercises", server.base_url))
        .bearer_auth("liftlog_00000000_000000000000000000000000")
        .send()
        .await
        .expect("bad token");
    assert_eq!(resp.status(), 401);

    // First violated constraint comes back as the message
    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&alice)
        .json(&json!({"name": "  ", "started_at": STARTED_AT}))
        .send()
        .await
        .expect("blank name");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["error"], "Workout name is required");

    let resp = client
        .post(format!("{}/api/v1/workouts", server.base_url))
        .bearer_auth(&alice)
        .json(&json!({"name": "Push Day", "started_at": "not-a-time"}))
        .send()
        .await
        .expect("bad timestamp");
    assert_eq!(resp.status(), 400);

    let workout_id = create_workout(&client, &server.base_url, &alice, "Push Day").await;
    let link = add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "Bench Press").await;
    let link_id = link["id"].as_i64().expect("link id");

    for bad in [
        json!({"workout_id": workout_id, "reps": -1}),
        json!({"workout_id": workout_id, "weight": "1.234"}),
        json!({"workout_id": workout_id, "weight": "12345678901"}),
        json!({"workout_id": workout_id, "weight": "abc"}),
    ] {
        let resp = client
            .post(format!(
                "{}/api/v1/workout-exercises/{}/sets",
                server.base_url, link_id
            ))
            .bearer_auth(&alice)
            .json(&bad)
            .send()
            .await
            .expect("invalid set");
        assert_eq!(resp.status(), 400, "rejected: {bad}");
    }

    // Must name exactly one of id or name
    let resp = client
        .post(format!(
            "{}/api/v1/workouts/{}/exercises",
            server.base_url, workout_id
        ))
        .bearer_auth(&alice)
        .json(&json!({}))
        .send()
        .await
        .expect("ambiguous add");
    assert_eq!(resp.status(), 400);

    // Dangling exercise id is a plain not-found
    let resp = client
        .post(format!(
            "{}/api/v1/workouts/{}/exercises",
            server.base_url, workout_id
        ))
        .bearer_auth(&alice)
        .json(&json!({"exercise_id": 999_999}))
        .send()
        .await
        .expect("dangling exercise");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_catalog_is_shared_across_users() {
    let server = TestServer::start().await;
    let alice = server.mint_token("alice");
    let bob = server.mint_token("bob");
    let client = reqwest::Client::new();

    let workout_id = create_workout(&client, &server.base_url, &alice, "Push Day").await;
    add_exercise_by_name(&client, &server.base_url, &alice, workout_id, "Bench Press").await;

    // Bob can see (and reuse) the catalog entry alice created
    let resp = client
        .get(format!("{}/api/v1/exercises", server.base_url))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("list catalog");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Bench Press"]);
}
