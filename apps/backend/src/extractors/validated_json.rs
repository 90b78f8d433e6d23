use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::web::BytesMut;
use actix_web::{FromRequest, HttpRequest};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::debug;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// Request bodies above this are rejected before parsing.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON body whose parse failures become problem-details 400s carrying a
/// stable code instead of actix's plain-text errors.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();
        let path = req.path().to_string();

        Box::pin(async move {
            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|_| {
                    AppError::bad_request(ErrorCode::BadRequest, "failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        "request body too large",
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            serde_json::from_slice::<T>(&body)
                .map(ValidatedJson)
                .map_err(|e| {
                    debug!(
                        trace_id = %trace_ctx::trace_id(),
                        path = %path,
                        error = %e,
                        body_size = body.len(),
                        "JSON body rejected"
                    );
                    AppError::bad_request(body_error_code(&path), describe_json_error(&e))
                })
        })
    }
}

/// Action bodies get their own code so clients can tell a bad action from
/// a bad lobby request.
fn body_error_code(path: &str) -> ErrorCode {
    if path.ends_with("/actions") {
        ErrorCode::InvalidAction
    } else {
        ErrorCode::BadRequest
    }
}

fn describe_json_error(error: &serde_json::Error) -> String {
    match error.classify() {
        Category::Syntax => format!("invalid JSON at line {}", error.line()),
        Category::Eof => "invalid JSON: unexpected end of input".to_string(),
        Category::Data => format!("invalid body: {error}"),
        Category::Io => "invalid JSON: could not read body".to_string(),
    }
}
