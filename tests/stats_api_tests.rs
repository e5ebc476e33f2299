// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics endpoint tests.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;

async fn seed_run(app: &axum::Router, token: &str, date: &str, distance: f64, duration: u32) {
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/runs",
            token,
            Some(serde_json::json!({
                "date": date,
                "distance": distance,
                "duration_seconds": duration,
                "unit": "km",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_run_summary() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    // 5 km at 12 km/h and 10 km at 15 km/h
    seed_run(&app, &token, "2024-03-01T08:00:00Z", 5.0, 1500).await;
    seed_run(&app, &token, "2024-03-03T08:00:00Z", 10.0, 2400).await;

    let response = app
        .oneshot(common::authed_request("GET", "/api/stats/runs", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["total_runs"], 2);
    assert_eq!(body["total_distance"], 15.0);
    assert_eq!(body["average_speed"], 13.5);
    assert_eq!(body["average_pace"], 4.5);
    assert_eq!(body["average_pace_display"], "4:30/km");
}

#[tokio::test]
async fn test_empty_summary_has_no_averages() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    let response = app
        .oneshot(common::authed_request("GET", "/api/stats/runs", &token, None))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["total_runs"], 0);
    assert!(body["average_speed"].is_null());
    assert!(body["average_pace"].is_null());
}

#[tokio::test]
async fn test_timeline_zero_fills_empty_months() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    seed_run(&app, &token, "2024-02-10T08:00:00Z", 5.0, 1500).await;
    seed_run(&app, &token, "2024-04-02T08:00:00Z", 6.0, 1800).await;

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/timeline?granularity=month&from=2024-02-01&to=2024-04-30",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    let buckets = body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 3);
    // March has no runs but still gets a bucket
    assert_eq!(buckets[1]["label"], "March 2024");
    assert_eq!(buckets[1]["count"], 0);
    assert_eq!(buckets[1]["total_distance"], 0.0);

    assert_eq!(buckets[0]["label"], "February 2024");
    assert_eq!(buckets[0]["count"], 1);
    assert_eq!(buckets[0]["total_distance"], 5.0);
    assert_eq!(buckets[2]["label"], "April 2024");
    assert_eq!(buckets[2]["count"], 1);
}

#[tokio::test]
async fn test_timeline_weekly_buckets_start_monday() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    // A Sunday and the following Monday land in different weeks
    seed_run(&app, &token, "2024-03-10T08:00:00Z", 5.0, 1500).await;
    seed_run(&app, &token, "2024-03-11T08:00:00Z", 5.0, 1500).await;

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/timeline?granularity=week&from=2024-03-04&to=2024-03-17",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;

    let buckets = body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["label"], "Week of 2024-03-04");
    assert_eq!(buckets[0]["count"], 1);
    assert_eq!(buckets[1]["label"], "Week of 2024-03-11");
    assert_eq!(buckets[1]["count"], 1);
}

#[tokio::test]
async fn test_timeline_rejects_bad_ranges() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    // Missing bounds
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/timeline?granularity=day",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Inverted bounds
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/timeline?granularity=day&from=2024-04-01&to=2024-03-01",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Range producing too many day buckets
    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/timeline?granularity=day&from=2000-01-01&to=2024-12-31",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_distance_bands_use_config_and_override() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    for (date, distance) in [
        ("2024-03-01T08:00:00Z", 3.0),
        ("2024-03-02T08:00:00Z", 4.0),
        ("2024-03-03T08:00:00Z", 5.5),
        ("2024-03-04T08:00:00Z", 10.0),
    ] {
        seed_run(&app, &token, date, distance, 1800).await;
    }

    // Default config breakpoints: 4, 5, 6, 7
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/distance-bands",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    let bands = body["bands"].as_array().unwrap();
    assert_eq!(bands.len(), 5);
    assert_eq!(bands[0]["label"], "0 - 4");
    assert_eq!(bands[0]["count"], 2); // 3.0 and the boundary 4.0
    assert_eq!(bands[2]["count"], 1); // 5.5
    assert_eq!(bands[4]["label"], "> 7");
    assert_eq!(bands[4]["count"], 1); // 10.0

    // Caller-supplied breakpoints
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/distance-bands?breakpoints=5,10",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    let bands = body["bands"].as_array().unwrap();
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[0]["count"], 3);
    assert_eq!(bands[1]["count"], 1);
    assert_eq!(bands[2]["count"], 0);

    // Invalid breakpoints
    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/distance-bands?breakpoints=7,4",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_counts_include_run_projections() {
    let (app, _, _tmp) = common::create_test_app().await;
    let (token, _) = common::register_user(&app, "runner@example.com").await;

    // A run today counts as cardio in the current week and month
    let today = chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    seed_run(&app, &token, &today, 5.0, 1500).await;

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(serde_json::json!({
                "date": today,
                "kind": "strength",
                "duration_minutes": 45,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/stats/activities",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["week"]["cardio"], 1);
    assert_eq!(body["week"]["strength"], 1);
    assert_eq!(body["month"]["cardio"], 1);
    assert_eq!(body["month"]["strength"], 1);
}
