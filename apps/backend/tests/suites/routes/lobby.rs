use actix_web::test;
use serde_json::{json, Value};
use tycoon_test_support::unique_helpers::{unique_guest_id, unique_user_id};

use super::{guest, join, open_room, post_as};
use crate::common::assert_problem;
use crate::support::app_builder::create_test_app;
use crate::support::test_state::memory_state;

#[actix_web::test]
async fn create_room_seats_the_host_in_slot_one() {
    let (state, repo) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_user_id();

    let req = test::TestRequest::post()
        .uri("/api/rooms")
        .insert_header(("X-User-Id", host.as_str()))
        .set_json(json!({ "turn_seconds": 45, "max_rounds": 30 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slot"], 1);
    assert_eq!(body["version"], 1);
    assert_eq!(body["join_code"].as_str().unwrap().len(), 6);
    let snapshot = &body["snapshot"];
    assert_eq!(snapshot["status"], "waiting");
    assert_eq!(snapshot["host"], 1);
    assert_eq!(snapshot["settings"]["turn_seconds"], 45);
    assert_eq!(snapshot["settings"]["max_rounds"], 30);
    assert_eq!(snapshot["players"][0]["user_id"], host.as_str());
    assert_eq!(snapshot["players"][0]["is_guest"], false);
    assert_eq!(repo.len(), 1);
}

#[actix_web::test]
async fn guest_ids_never_appear_in_snapshots() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();

    let req = guest(test::TestRequest::post().uri("/api/rooms"), &host)
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(!text.contains(&host));

    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["snapshot"]["players"][0]["is_guest"], true);
    assert!(parsed["snapshot"]["players"][0]["user_id"].is_null());
}

#[actix_web::test]
async fn create_room_rejects_out_of_range_settings() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();

    let resp = post_as(&app, "/api/rooms", &host, json!({ "turn_seconds": 5 })).await;
    assert_problem(resp, 422, "VALIDATION_ERROR").await;

    let resp = post_as(&app, "/api/rooms", &host, json!({ "max_rounds": 0 })).await;
    assert_problem(resp, 422, "VALIDATION_ERROR").await;

    let resp = post_as(&app, "/api/rooms", &host, json!({ "colour": "red" })).await;
    assert_problem(resp, 400, "BAD_REQUEST").await;
}

#[actix_web::test]
async fn identity_is_required_and_unambiguous() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;

    let req = test::TestRequest::post()
        .uri("/api/rooms")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 401, "UNAUTHORIZED").await;

    let req = test::TestRequest::post()
        .uri("/api/rooms")
        .insert_header(("X-User-Id", "u-1"))
        .insert_header(("X-Guest-Id", "g-1"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 400, "INVALID_HEADER").await;
}

#[actix_web::test]
async fn join_by_code_takes_the_next_slot() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let opened = open_room(&app, &unique_guest_id()).await;
    let second = unique_guest_id();

    // Codes are matched case-insensitively.
    let resp = join(&app, &opened.join_code.to_lowercase(), &second).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slot"], 2);
    assert_eq!(body["version"], 2);
    assert_eq!(body["room_id"], opened.room_id.as_str());

    // Joining again is idempotent.
    let resp = join(&app, &opened.join_code, &second).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slot"], 2);
    assert_eq!(body["version"], 2);
}

#[actix_web::test]
async fn fifth_player_is_turned_away() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let opened = open_room(&app, &unique_guest_id()).await;

    for _ in 0..3 {
        let resp = join(&app, &opened.join_code, &unique_guest_id()).await;
        assert_eq!(resp.status().as_u16(), 200);
    }
    let resp = join(&app, &opened.join_code, &unique_guest_id()).await;
    assert_problem(resp, 409, "ROOM_FULL").await;
}

#[actix_web::test]
async fn bad_and_unknown_join_codes() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let who = unique_guest_id();

    let resp = join(&app, "nope", &who).await;
    assert_problem(resp, 400, "INVALID_JOIN_CODE").await;

    let resp = join(&app, "ZZZZZZ", &who).await;
    assert_problem(resp, 404, "JOIN_CODE_NOT_FOUND").await;
}

#[actix_web::test]
async fn only_the_host_starts_and_only_with_company() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let opened = open_room(&app, &host).await;
    let start = format!("/api/rooms/{}/start", opened.room_id);

    let resp = post_as(&app, &start, &host, json!({})).await;
    assert_problem(resp, 422, "NOT_ENOUGH_PLAYERS").await;

    join(&app, &opened.join_code, &other).await;
    let resp = post_as(&app, &start, &other, json!({})).await;
    assert_problem(resp, 403, "NOT_HOST").await;

    let resp = post_as(&app, &start, &host, json!({})).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = join(&app, &opened.join_code, &unique_guest_id()).await;
    assert_problem(resp, 422, "GAME_ALREADY_STARTED").await;
}

#[actix_web::test]
async fn characters_are_unique_within_a_room() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let opened = open_room(&app, &host).await;
    join(&app, &opened.join_code, &other).await;

    let uri = format!("/api/rooms/{}/character", opened.room_id);
    let snapshot = super::get_snapshot(&app, &opened.room_id).await;
    let hosts = snapshot["players"][0]["character"].clone();

    let resp = post_as(&app, &uri, &other, json!({ "character": hosts })).await;
    assert_problem(resp, 422, "CHARACTER_TAKEN").await;

    let resp = post_as(&app, &uri, &unique_guest_id(), json!({ "character": hosts })).await;
    assert_problem(resp, 403, "NOT_A_MEMBER").await;
}

#[actix_web::test]
async fn leaving_the_lobby_hands_over_the_host_seat() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let opened = open_room(&app, &host).await;
    join(&app, &opened.join_code, &other).await;

    let uri = format!("/api/rooms/{}/leave", opened.room_id);
    let resp = post_as(&app, &uri, &host, json!({})).await;
    assert_eq!(resp.status().as_u16(), 200);

    let snapshot = super::get_snapshot(&app, &opened.room_id).await;
    assert_eq!(snapshot["host"], 2);
    assert_eq!(snapshot["players"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["status"], "waiting");

    let resp = post_as(&app, &uri, &other, json!({})).await;
    assert_eq!(resp.status().as_u16(), 200);
    let snapshot = super::get_snapshot(&app, &opened.room_id).await;
    assert_eq!(snapshot["status"], "abandoned");
}
