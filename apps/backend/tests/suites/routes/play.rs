use actix_web::http::header::{ETAG, IF_MATCH};
use actix_web::test;
use serde_json::{json, Value};
use tycoon_test_support::unique_helpers::unique_guest_id;

use super::{get_snapshot, guest, post_as, started_game};
use crate::common::assert_problem;
use crate::support::app_builder::create_test_app;
use crate::support::test_state::memory_state;

fn actions(room_id: &str) -> String {
    format!("/api/rooms/{room_id}/actions")
}

#[actix_web::test]
async fn roll_then_skip_passes_the_turn() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let room_id = started_game(&app, &host, &other).await;

    let snapshot = get_snapshot(&app, &room_id).await;
    assert_eq!(snapshot["status"], "playing");
    assert_eq!(snapshot["current_slot"], 1);
    assert_eq!(snapshot["phase"]["name"], "ROLL_DICE");
    assert_eq!(snapshot["players"][0]["cash"], 15_000);

    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "rollDice" })).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers().contains_key(ETAG));
    let ack: Value = test::read_body_json(resp).await;
    assert_eq!(ack["slot"], 1);

    let snapshot = get_snapshot(&app, &room_id).await;
    assert_eq!(snapshot["version"], ack["version"]);
    assert_eq!(snapshot["players"][0]["position"], 4);
    assert_eq!(snapshot["last_dice"], json!({ "d1": 1, "d2": 3 }));
    assert_eq!(snapshot["phase"], json!({ "name": "AWAITING_ACTION", "cell": 4 }));

    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "skipBuy" })).await;
    assert_eq!(resp.status().as_u16(), 200);

    let snapshot = get_snapshot(&app, &room_id).await;
    assert_eq!(snapshot["current_slot"], 2);
    assert_eq!(snapshot["phase"]["name"], "ROLL_DICE");
}

#[actix_web::test]
async fn buying_the_landed_cell() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let room_id = started_game(&app, &host, &unique_guest_id()).await;

    post_as(&app, &actions(&room_id), &host, json!({ "type": "rollDice" })).await;
    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "buyProperty" })).await;
    assert_eq!(resp.status().as_u16(), 200);

    let snapshot = get_snapshot(&app, &room_id).await;
    let me = &snapshot["players"][0];
    assert_eq!(me["holdings"][0]["cell"], 4);
    assert!(me["cash"].as_i64().unwrap() < 15_000);
}

#[actix_web::test]
async fn out_of_turn_and_wrong_phase_are_rejected() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let room_id = started_game(&app, &host, &other).await;
    let before = get_snapshot(&app, &room_id).await;

    let resp = post_as(&app, &actions(&room_id), &other, json!({ "type": "rollDice" })).await;
    assert_problem(resp, 422, "OUT_OF_TURN").await;

    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "skipBuy" })).await;
    assert_problem(resp, 422, "PHASE_MISMATCH").await;

    let after = get_snapshot(&app, &room_id).await;
    assert_eq!(before, after);
}

#[actix_web::test]
async fn outsiders_and_garbage_bodies() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let room_id = started_game(&app, &host, &unique_guest_id()).await;

    let resp = post_as(
        &app,
        &actions(&room_id),
        &unique_guest_id(),
        json!({ "type": "rollDice" }),
    )
    .await;
    assert_problem(resp, 403, "NOT_A_MEMBER").await;

    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "teleport" })).await;
    assert_problem(resp, 400, "INVALID_ACTION").await;
}

#[actix_web::test]
async fn if_match_guards_against_stale_views() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let room_id = started_game(&app, &host, &unique_guest_id()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/rooms/{room_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let etag = resp.headers().get(ETAG).unwrap().to_str().unwrap().to_string();

    let req = guest(test::TestRequest::post().uri(&actions(&room_id)), &host)
        .insert_header((IF_MATCH, etag.clone()))
        .set_json(json!({ "type": "rollDice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    // Same precondition again: the room has moved on.
    let req = guest(test::TestRequest::post().uri(&actions(&room_id)), &host)
        .insert_header((IF_MATCH, etag))
        .set_json(json!({ "type": "skipBuy" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 409, "OPTIMISTIC_LOCK").await;

    let req = guest(test::TestRequest::post().uri(&actions(&room_id)), &host)
        .insert_header((IF_MATCH, "\"garbage\""))
        .set_json(json!({ "type": "skipBuy" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, 400, "INVALID_HEADER").await;
}

#[actix_web::test]
async fn leaving_a_running_game_surrenders() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let other = unique_guest_id();
    let room_id = started_game(&app, &host, &other).await;

    let resp = post_as(
        &app,
        &format!("/api/rooms/{room_id}/leave"),
        &other,
        json!({}),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 200);

    let snapshot = get_snapshot(&app, &room_id).await;
    assert_eq!(snapshot["status"], "finished");
    assert_eq!(snapshot["players"][1]["eliminated"], "surrendered");
    assert_eq!(snapshot["winner"]["slot"], 1);
    assert_eq!(snapshot["winner"]["reason"], "last_standing");

    let resp = post_as(&app, &actions(&room_id), &host, json!({ "type": "rollDice" })).await;
    assert_problem(resp, 422, "GAME_NOT_ACTIVE").await;
}
