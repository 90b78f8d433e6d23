use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use ulid::Ulid;

use crate::domain::state::RoomId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Room id from the `{room_id}` path segment. Only the shape is checked;
/// whether the room exists is the registry's call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPath(pub RoomId);

impl RoomPath {
    pub fn into_inner(self) -> RoomId {
        self.0
    }
}

pub fn parse_room_id(raw: &str) -> Result<RoomId, AppError> {
    Ulid::from_string(raw)
        .map(|ulid| RoomId(ulid.to_string()))
        .map_err(|_| AppError::bad_request(ErrorCode::InvalidRoomId, format!("invalid room id: {raw}")))
}

impl FromRequest for RoomPath {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let parsed = match req.match_info().get("room_id") {
            Some(raw) => parse_room_id(raw).map(RoomPath),
            None => Err(AppError::bad_request(
                ErrorCode::InvalidRoomId,
                "missing room_id parameter",
            )),
        };
        ready(parsed)
    }
}
