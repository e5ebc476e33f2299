// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal lifecycle and folder tests.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;

async fn create_folder(app: &axum::Router, token: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/folders",
            token,
            Some(serde_json::json!({ "name": name })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    common::body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_goal(app: &axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(common::authed_request("POST", "/api/goals", token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    common::body_json(response).await
}

#[tokio::test]
async fn test_goal_target_speed_is_derived() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let goal = create_goal(
        &app,
        &token,
        serde_json::json!({
            "name": "Sub-25 5k",
            "target_distance": 5.0,
            "target_duration_seconds": 1500,
        }),
    )
    .await;

    // 5 km in 25 minutes: 12 km/h, derived, not supplied
    assert_eq!(goal["target_speed"], 12.0);
    assert_eq!(goal["target_duration_display"], "25m 0s");
    assert_eq!(goal["completed"], false);
    assert!(goal["completed_at"].is_null());
}

#[tokio::test]
async fn test_goal_complete_and_reopen_transitions() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let goal = create_goal(
        &app,
        &token,
        serde_json::json!({ "name": "10k", "target_distance": 10.0 }),
    )
    .await;
    let id = goal["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            &format!("/api/goals/{id}/complete"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["completed"], true);
    let completed_at = body["completed_at"].as_str().unwrap().to_string();

    // Completing again keeps the original timestamp
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            &format!("/api/goals/{id}/complete"),
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["completed_at"].as_str().unwrap(), completed_at);

    // Reopening clears the timestamp
    let response = app
        .oneshot(common::authed_request(
            "POST",
            &format!("/api/goals/{id}/reopen"),
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["completed"], false);
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn test_goal_rejects_missing_folder() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/goals",
            &token,
            Some(serde_json::json!({
                "name": "Orphan",
                "target_distance": 5.0,
                "folder_id": "00000000-0000-0000-0000-000000000001",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_folder_listing_and_goal_filter() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let folder_id = create_folder(&app, &token, "Spring races").await;
    create_goal(
        &app,
        &token,
        serde_json::json!({ "name": "10k", "target_distance": 10.0, "folder_id": folder_id }),
    )
    .await;
    create_goal(
        &app,
        &token,
        serde_json::json!({ "name": "Parkrun", "target_distance": 5.0 }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(common::authed_request("GET", "/api/folders", &token, None))
        .await
        .unwrap();
    let folders = common::body_json(response).await;
    assert_eq!(folders[0]["name"], "Spring races");
    assert_eq!(folders[0]["goal_count"], 1);

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            &format!("/api/goals?folder={folder_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    let goals = common::body_json(response).await;
    assert_eq!(goals.as_array().unwrap().len(), 1);
    assert_eq!(goals[0]["name"], "10k");
}

#[tokio::test]
async fn test_moving_goal_between_folders() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let spring = create_folder(&app, &token, "Spring").await;
    let autumn = create_folder(&app, &token, "Autumn").await;
    let goal = create_goal(
        &app,
        &token,
        serde_json::json!({ "name": "10k", "target_distance": 10.0, "folder_id": spring }),
    )
    .await;
    let id = goal["id"].as_str().unwrap();

    let response = app
        .oneshot(common::authed_request(
            "PUT",
            &format!("/api/goals/{id}"),
            &token,
            Some(serde_json::json!({
                "name": "10k",
                "target_distance": 10.0,
                "folder_id": autumn,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["folder_id"].as_str().unwrap(), autumn);
}

#[tokio::test]
async fn test_deleting_folder_reparents_goals() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let folder_id = create_folder(&app, &token, "Spring races").await;
    for name in ["10k", "Half marathon"] {
        create_goal(
            &app,
            &token,
            serde_json::json!({
                "name": name,
                "target_distance": 10.0,
                "folder_id": folder_id,
            }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "DELETE",
            &format!("/api/folders/{folder_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["reparented_goals"], 2);

    // No goal references the deleted folder
    let response = app
        .oneshot(common::authed_request("GET", "/api/goals", &token, None))
        .await
        .unwrap();
    let goals = common::body_json(response).await;
    assert_eq!(goals.as_array().unwrap().len(), 2);
    for goal in goals.as_array().unwrap() {
        assert!(goal["folder_id"].is_null(), "goal still references folder");
    }
}

#[tokio::test]
async fn test_goal_validation() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    // Empty name
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/goals",
            &token,
            Some(serde_json::json!({ "name": "", "target_distance": 5.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-positive target distance
    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/goals",
            &token,
            Some(serde_json::json!({ "name": "10k", "target_distance": 0.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
