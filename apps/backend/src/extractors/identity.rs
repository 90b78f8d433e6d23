//! Caller identity.
//!
//! Authentication lives outside this service. A fronting gateway (or the
//! dev client) states who the caller is with exactly one of `X-User-Id` or
//! `X-Guest-Id`. Browsers cannot set headers on a WebSocket upgrade, so the
//! same values are also accepted as `user_id` / `guest_id` query parameters.

use std::collections::HashMap;
use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::domain::state::PlayerIdentity;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;

pub const USER_HEADER: &str = "x-user-id";
pub const GUEST_HEADER: &str = "x-guest-id";

const MAX_ID_LEN: usize = 128;

/// Resolves who is making a request.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, req: &HttpRequest) -> Result<PlayerIdentity, AppError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderIdentityResolver;

impl IdentityResolver for HeaderIdentityResolver {
    fn resolve(&self, req: &HttpRequest) -> Result<PlayerIdentity, AppError> {
        let mut user = header_value(req, USER_HEADER)?;
        let mut guest = header_value(req, GUEST_HEADER)?;

        if user.is_none() && guest.is_none() {
            let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
                .map(web::Query::into_inner)
                .unwrap_or_default();
            user = query.get("user_id").cloned();
            guest = query.get("guest_id").cloned();
        }

        match (user, guest) {
            (Some(_), Some(_)) => Err(AppError::bad_request(
                ErrorCode::InvalidHeader,
                "send either a user id or a guest id, not both",
            )),
            (Some(id), None) => Ok(PlayerIdentity::User(validate_id(id)?)),
            (None, Some(id)) => Ok(PlayerIdentity::Guest(validate_id(id)?)),
            (None, None) => Err(AppError::unauthorized("missing caller identity")),
        }
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Result<Option<String>, AppError> {
    let Some(raw) = req.headers().get(name) else {
        return Ok(None);
    };
    let value = raw.to_str().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidHeader, format!("{name} is not ASCII"))
    })?;
    Ok(Some(value.to_string()))
}

fn validate_id(raw: String) -> Result<String, AppError> {
    let id = raw.trim();
    let ok = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '@'));
    if !ok {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            "caller id must be 1-128 characters of [A-Za-z0-9-_.:@]",
        ));
    }
    Ok(id.to_string())
}

/// The resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub PlayerIdentity);

impl Caller {
    pub fn into_inner(self) -> PlayerIdentity {
        self.0
    }
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.identity().resolve(req),
            None => HeaderIdentityResolver.resolve(req),
        };
        ready(resolved.map(Caller))
    }
}
