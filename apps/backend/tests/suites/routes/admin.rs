use actix_web::test;
use serde_json::json;
use tycoon_test_support::problem_details::assert_problem_details_from_service_response;
use tycoon_test_support::unique_helpers::unique_guest_id;

use super::{get_snapshot, post_as, started_game};
use crate::support::app_builder::create_test_app;
use crate::support::test_state::{memory_state, ADMIN_TOKEN};

fn pin(room_id: &str, token: Option<&str>, body: serde_json::Value) -> actix_http::Request {
    let mut req = test::TestRequest::post()
        .uri(&format!("/api/admin/rooms/{room_id}/dice"))
        .set_json(body);
    if let Some(token) = token {
        req = req.insert_header(("x-admin-token", token));
    }
    req.to_request()
}

#[actix_web::test]
async fn pinned_dice_drive_the_next_roll() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let host = unique_guest_id();
    let room_id = started_game(&app, &host, &unique_guest_id()).await;

    let req = pin(&room_id, Some(ADMIN_TOKEN), json!({ "slot": 1, "d1": 2, "d2": 6 }));
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    post_as(
        &app,
        &format!("/api/rooms/{room_id}/actions"),
        &host,
        json!({ "type": "rollDice" }),
    )
    .await;
    let snapshot = get_snapshot(&app, &room_id).await;
    assert_eq!(snapshot["last_dice"], json!({ "d1": 2, "d2": 6 }));
    assert_eq!(snapshot["players"][0]["position"], 8);
}

#[actix_web::test]
async fn admin_token_is_enforced() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let room_id = started_game(&app, &unique_guest_id(), &unique_guest_id()).await;
    let body = json!({ "slot": 1, "d1": 2, "d2": 5 });

    let resp = test::call_service(&app, pin(&room_id, None, body.clone())).await;
    assert_problem_details_from_service_response(
        resp,
        "UNAUTHORIZED",
        actix_web::http::StatusCode::UNAUTHORIZED,
        None,
    )
    .await;

    let resp = test::call_service(&app, pin(&room_id, Some("wrong"), body)).await;
    assert_problem_details_from_service_response(
        resp,
        "FORBIDDEN",
        actix_web::http::StatusCode::FORBIDDEN,
        Some("invalid admin token"),
    )
    .await;
}

#[actix_web::test]
async fn dice_and_slots_are_validated() {
    let (state, _) = memory_state().await;
    let app = create_test_app(state).build().await;
    let room_id = started_game(&app, &unique_guest_id(), &unique_guest_id()).await;

    let req = pin(&room_id, Some(ADMIN_TOKEN), json!({ "slot": 1, "d1": 7, "d2": 1 }));
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "INVALID_DICE",
        actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
        None,
    )
    .await;

    let req = pin(&room_id, Some(ADMIN_TOKEN), json!({ "slot": 4, "d1": 1, "d2": 1 }));
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "PLAYER_NOT_FOUND",
        actix_web::http::StatusCode::NOT_FOUND,
        None,
    )
    .await;
}

#[actix_web::test]
async fn hooks_are_closed_without_a_configured_token() {
    let state = backend::infra::state::build_state().build().await.unwrap();
    let app = create_test_app(state).build().await;
    let room_id = started_game(&app, &unique_guest_id(), &unique_guest_id()).await;

    let req = pin(&room_id, Some("anything"), json!({ "slot": 1, "d1": 1, "d2": 1 }));
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "FORBIDDEN",
        actix_web::http::StatusCode::FORBIDDEN,
        Some("disabled"),
    )
    .await;
}
