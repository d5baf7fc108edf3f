//! Room inventory and availability endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_booking, create_room, get, post_empty, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_room() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 120.0).await;

    let response = get(&app, &format!("/api/v1/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["room_number"], "101");
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["amenities"], json!(["wifi", "onsen access"]));
}

#[tokio::test]
async fn duplicate_room_number_is_conflict() {
    let app = common::build_test_app().router;
    create_room(&app, "101", 2, 120.0).await;

    let response = post_json(
        &app,
        "/api/v1/rooms",
        json!({
            "room_number": "101",
            "room_type": "single",
            "capacity": 1,
            "price_per_night": 80.0,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_room_fields_are_rejected() {
    let app = common::build_test_app().router;

    let response = post_json(
        &app,
        "/api/v1/rooms",
        json!({
            "room_number": "102",
            "room_type": "single",
            "capacity": 0,
            "price_per_night": 0.0,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("capacity"));
}

#[tokio::test]
async fn update_replaces_fields() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 120.0).await;

    let response = put_json(
        &app,
        &format!("/api/v1/rooms/{id}"),
        json!({
            "room_number": "101A",
            "room_type": "suite",
            "capacity": 4,
            "price_per_night": 300.0,
            "description": "Corner suite",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["room_number"], "101A");
    assert_eq!(json["data"]["capacity"], 4);
    assert_eq!(json["data"]["amenities"], json!([]));

    let missing = put_json(
        &app,
        "/api/v1/rooms/999",
        json!({
            "room_number": "X",
            "room_type": "suite",
            "capacity": 1,
            "price_per_night": 1.0,
        }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn room_types_lists_each_type_once() {
    let app = common::build_test_app().router;
    for (number, room_type) in [("101", "Japanese-style"), ("102", "double"), ("103", "Japanese-style")] {
        let response = post_json(
            &app,
            "/api/v1/rooms",
            json!({
                "room_number": number,
                "room_type": room_type,
                "capacity": 2,
                "price_per_night": 90.0,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Must not be captured by `/rooms/{id}`.
    let response = get(&app, "/api/v1/rooms/types").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!(["Japanese-style", "double"]));
}

#[tokio::test]
async fn list_filters_by_status_and_capacity() {
    let app = common::build_test_app().router;
    let small = create_room(&app, "101", 1, 80.0).await;
    let large = create_room(&app, "201", 4, 200.0).await;
    let closed = create_room(&app, "301", 4, 200.0).await;
    post_empty(&app, &format!("/api/v1/rooms/{closed}/deactivate")).await;

    let json = body_json(get(&app, "/api/v1/rooms?status=active&min_capacity=2").await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![large]);

    let json = body_json(get(&app, "/api/v1/rooms").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"][0]["id"], small);
}

// ---------------------------------------------------------------------------
// Deactivation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deactivate_blocked_by_future_booking() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 100.0).await;
    let booking = create_booking(&app, id, "aoi@example.com", "2025-06-01", "2025-06-03").await;
    assert_eq!(booking.status(), StatusCode::CREATED);

    let response = post_empty(&app, &format!("/api/v1/rooms/{id}/deactivate")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn deactivate_then_activate() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 100.0).await;

    let response = post_empty(&app, &format!("/api/v1/rooms/{id}/deactivate")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    // Inactive rooms take no bookings.
    let booking = create_booking(&app, id, "aoi@example.com", "2025-06-01", "2025-06-03").await;
    assert_eq!(booking.status(), StatusCode::CONFLICT);

    let response = post_empty(&app, &format!("/api/v1/rooms/{id}/activate")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "active");
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn available_rooms_excludes_booked_and_small_rooms() {
    let app = common::build_test_app().router;
    let booked = create_room(&app, "101", 2, 100.0).await;
    let free = create_room(&app, "102", 2, 100.0).await;
    create_room(&app, "103", 1, 60.0).await;
    create_booking(&app, booked, "aoi@example.com", "2025-06-01", "2025-06-05").await;

    let json = body_json(
        get(
            &app,
            "/api/v1/rooms/available?check_in=2025-06-04&check_out=2025-06-06&guests=2",
        )
        .await,
    )
    .await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![free]);
}

#[tokio::test]
async fn single_room_availability_allows_back_to_back() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 100.0).await;
    create_booking(&app, id, "aoi@example.com", "2025-06-01", "2025-06-05").await;

    let overlapping = body_json(
        get(
            &app,
            &format!("/api/v1/rooms/{id}/availability?check_in=2025-06-04&check_out=2025-06-06"),
        )
        .await,
    )
    .await;
    assert_eq!(overlapping["data"]["available"], false);

    let adjacent = body_json(
        get(
            &app,
            &format!("/api/v1/rooms/{id}/availability?check_in=2025-06-05&check_out=2025-06-07"),
        )
        .await,
    )
    .await;
    assert_eq!(adjacent["data"]["available"], true);
}

#[tokio::test]
async fn zero_night_availability_query_is_bad_request() {
    let app = common::build_test_app().router;
    let id = create_room(&app, "101", 2, 100.0).await;

    let response = get(
        &app,
        &format!("/api/v1/rooms/{id}/availability?check_in=2025-06-04&check_out=2025-06-04"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_DATE_RANGE");
}
