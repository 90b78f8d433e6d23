//! ETags for room snapshots.
//!
//! The tag carries the room version, so `If-None-Match` lets clients poll
//! cheaply and `If-Match` on an action becomes the orchestrator's expected
//! version.

use actix_web::http::header::{IF_MATCH, IF_NONE_MATCH};
use actix_web::HttpRequest;

use crate::domain::state::RoomId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Format: `"room-{id}-v{version}"`, quotes included.
///
/// ```
/// # use backend::domain::state::RoomId;
/// # use backend::http::etag::room_etag;
/// let id = RoomId("01ARZ3NDEKTSV4RRFFQ69G5FAV".into());
/// assert_eq!(room_etag(&id, 7), r#""room-01ARZ3NDEKTSV4RRFFQ69G5FAV-v7""#);
/// ```
pub fn room_etag(id: &RoomId, version: i32) -> String {
    format!(r#""room-{id}-v{version}""#)
}

/// Version encoded in a room ETag. Weak tags (`W/"..."`) are accepted.
pub fn parse_room_version(raw: &str) -> Result<i32, AppError> {
    let tag = raw.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');
    let invalid = || {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("expected an ETag like \"room-{{id}}-v{{version}}\", got {raw}"),
        )
    };
    if !tag.starts_with("room-") {
        return Err(invalid());
    }
    let (_, version) = tag.rsplit_once("-v").ok_or_else(invalid)?;
    version.parse::<i32>().map_err(|_| invalid())
}

/// `If-Match` as an expected version, if the client sent one.
pub fn expected_version(req: &HttpRequest) -> Result<Option<i32>, AppError> {
    let Some(raw) = req.headers().get(IF_MATCH) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|_| AppError::bad_request(ErrorCode::InvalidHeader, "If-Match is not ASCII"))?;
    if raw.trim() == "*" {
        return Ok(None);
    }
    parse_room_version(raw).map(Some)
}

/// Whether any tag in `If-None-Match` matches `etag`.
pub fn not_modified(req: &HttpRequest, etag: &str) -> bool {
    req.headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|raw| {
            raw.split(',').any(|candidate| {
                let candidate = candidate.trim();
                candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
            })
        })
}
