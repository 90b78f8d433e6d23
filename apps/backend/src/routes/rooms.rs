//! Lobby and game routes under `/api/rooms`.

use actix_web::http::header::ETAG;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::abilities::Character;
use crate::domain::actions::PlayerAction;
use crate::domain::rules::Slot;
use crate::domain::snapshot::{snapshot, RoomSnapshot};
use crate::domain::state::RoomId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::identity::Caller;
use crate::extractors::room_id::RoomPath;
use crate::extractors::validated_json::ValidatedJson;
use crate::http::etag::{expected_version, not_modified, room_etag};
use crate::rooms::Ack;
use crate::state::app_state::AppState;
use crate::utils::join_code::normalize_join_code;

const TURN_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 10..=300;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateRoomRequest {
    pub abilities_enabled: Option<bool>,
    pub max_rounds: Option<u32>,
    pub turn_seconds: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CreatedRoom {
    room_id: String,
    join_code: String,
    slot: Slot,
    version: i32,
    snapshot: RoomSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CharacterRequest {
    pub character: Character,
}

#[derive(Debug, Serialize)]
struct AckResponse {
    room_id: String,
    slot: Slot,
    version: i32,
}

fn ack_response(status: StatusCode, room_id: &RoomId, ack: Ack) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((ETAG, room_etag(room_id, ack.version)))
        .json(AckResponse {
            room_id: room_id.to_string(),
            slot: ack.slot,
            version: ack.version,
        })
}

/// POST /api/rooms
async fn create_room(
    caller: Caller,
    body: ValidatedJson<CreateRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let mut settings = app_state.game().room_settings();
    if let Some(enabled) = req.abilities_enabled {
        settings.abilities_enabled = enabled;
    }
    if let Some(turn_seconds) = req.turn_seconds {
        if !TURN_SECONDS_RANGE.contains(&turn_seconds) {
            return Err(AppError::invalid(
                ErrorCode::ValidationError,
                format!(
                    "turn_seconds must be between {} and {}",
                    TURN_SECONDS_RANGE.start(),
                    TURN_SECONDS_RANGE.end()
                ),
            ));
        }
        settings.turn_seconds = turn_seconds;
    }
    if req.max_rounds == Some(0) {
        return Err(AppError::invalid(
            ErrorCode::ValidationError,
            "max_rounds must be positive",
        ));
    }
    settings.max_rounds = req.max_rounds;

    let (_, room) = app_state
        .rooms()
        .create_room(caller.into_inner(), settings)
        .await?;
    info!(room_id = %room.id, "Room opened over HTTP");

    Ok(HttpResponse::Created()
        .insert_header((ETAG, room_etag(&room.id, room.version)))
        .json(CreatedRoom {
            room_id: room.id.to_string(),
            join_code: room.join_code.clone(),
            slot: room.host,
            version: room.version,
            snapshot: snapshot(&room),
        }))
}

/// POST /api/rooms/join
async fn join_room(
    caller: Caller,
    body: ValidatedJson<JoinRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let code = normalize_join_code(&body.code).ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidJoinCode, "join codes are 6 characters")
    })?;
    let handle = app_state.rooms().find_by_join_code(&code).await?;
    let ack = handle.join(caller.into_inner()).await?;
    Ok(ack_response(StatusCode::OK, handle.id(), ack))
}

/// POST /api/rooms/{room_id}/character
async fn select_character(
    room: RoomPath,
    caller: Caller,
    body: ValidatedJson<CharacterRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let handle = app_state.rooms().get(&room.0).await?;
    let ack = handle
        .select_character(caller.into_inner(), body.character)
        .await?;
    Ok(ack_response(StatusCode::OK, handle.id(), ack))
}

/// POST /api/rooms/{room_id}/leave
async fn leave_room(
    room: RoomPath,
    caller: Caller,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let handle = app_state.rooms().get(&room.0).await?;
    let ack = handle.leave(caller.into_inner()).await?;
    Ok(ack_response(StatusCode::OK, handle.id(), ack))
}

/// POST /api/rooms/{room_id}/start
async fn start_game(
    room: RoomPath,
    caller: Caller,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let handle = app_state.rooms().get(&room.0).await?;
    let ack = handle.start(caller.into_inner()).await?;
    Ok(ack_response(StatusCode::OK, handle.id(), ack))
}

/// POST /api/rooms/{room_id}/actions
///
/// `If-Match` with the snapshot's ETag makes the action conditional on the
/// room not having moved since.
async fn submit_action(
    http_req: HttpRequest,
    room: RoomPath,
    caller: Caller,
    body: ValidatedJson<PlayerAction>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let expected = expected_version(&http_req)?;
    let handle = app_state.rooms().get(&room.0).await?;
    let ack = handle
        .act(caller.into_inner(), body.into_inner(), expected)
        .await?;
    Ok(ack_response(StatusCode::OK, handle.id(), ack))
}

/// GET /api/rooms/{room_id}
///
/// Public snapshot. Answers `304 Not Modified` when `If-None-Match` holds
/// the current ETag.
async fn get_snapshot(
    http_req: HttpRequest,
    room: RoomPath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let handle = app_state.rooms().get(&room.0).await?;
    let snapshot = handle.snapshot().await?;
    let etag = room_etag(handle.id(), snapshot.version);

    if not_modified(&http_req, &etag) {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .finish());
    }
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag))
        .json(snapshot))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_room)))
        .service(web::resource("/join").route(web::post().to(join_room)))
        .service(web::resource("/{room_id}").route(web::get().to(get_snapshot)))
        .service(web::resource("/{room_id}/character").route(web::post().to(select_character)))
        .service(web::resource("/{room_id}/leave").route(web::post().to(leave_room)))
        .service(web::resource("/{room_id}/start").route(web::post().to(start_game)))
        .service(web::resource("/{room_id}/actions").route(web::post().to(submit_action)));
}
