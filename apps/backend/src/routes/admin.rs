//! Operator hooks. Closed unless `TYCOON_ADMIN_TOKEN` is set.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::warn;

use crate::domain::dice::DiceRoll;
use crate::domain::rules::Slot;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::room_id::RoomPath;
use crate::extractors::validated_json::ValidatedJson;
use crate::state::app_state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Deserialize)]
pub struct PinDiceRequest {
    pub slot: Slot,
    pub d1: u8,
    pub d2: u8,
}

fn require_admin(req: &HttpRequest, app_state: &AppState) -> Result<(), AppError> {
    let Some(expected) = app_state.admin_token() else {
        return Err(AppError::forbidden(
            ErrorCode::Forbidden,
            "admin hooks are disabled",
        ));
    };
    let presented = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing admin token"))?;

    if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        warn!(path = %req.path(), "Rejected admin token");
        return Err(AppError::forbidden(ErrorCode::Forbidden, "invalid admin token"));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// POST /api/admin/rooms/{room_id}/dice
///
/// Queue the next roll for a slot. Consumed by that slot's next roll only.
async fn pin_dice(
    http_req: HttpRequest,
    room: RoomPath,
    body: ValidatedJson<PinDiceRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_admin(&http_req, &app_state)?;
    let roll = DiceRoll::new(body.d1, body.d2)?;
    let handle = app_state.rooms().get(&room.0).await?;
    handle.pin_dice(body.slot, roll).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/rooms/{room_id}/dice").route(web::post().to(pin_dice)));
}
