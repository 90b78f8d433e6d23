//! Per-request span plus one structured completion log line.
//!
//! Must be wrapped inside `RequestTrace` (registered before it) so the
//! trace id is already in the request extensions. Requests addressed to a
//! room carry its id on the span, so room actor logs and HTTP logs join up.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, info_span, warn, Instrument};

use super::request_trace::TraceId;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let room_id = room_in_path(&path).unwrap_or("-").to_string();

        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %method,
            path = %path,
            room_id = %room_id
        );
        let fut = self.service.call(req).instrument(span.clone());

        Box::pin(
            async move {
                let result = fut.await;
                let status = match &result {
                    Ok(res) => res.status(),
                    Err(err) => err.as_response_error().status_code(),
                };
                let duration_us = start.elapsed().as_micros() as u64;
                let status_code = status.as_u16();

                if status.is_server_error() {
                    error!(status_code, duration_us, "Request completed");
                } else if status.is_client_error() {
                    warn!(status_code, duration_us, "Request completed");
                } else {
                    info!(status_code, duration_us, "Request completed");
                }
                result
            }
            .instrument(span),
        )
    }
}

/// Room id segment of `/api/rooms/{id}/..`, `/api/admin/rooms/{id}/..` and
/// `/api/ws/rooms/{id}`.
fn room_in_path(path: &str) -> Option<&str> {
    let rest = path
        .strip_prefix("/api/rooms/")
        .or_else(|| path.strip_prefix("/api/admin/rooms/"))
        .or_else(|| path.strip_prefix("/api/ws/rooms/"))?;
    let id = rest.split('/').next()?;
    (!id.is_empty() && id != "join").then_some(id)
}
