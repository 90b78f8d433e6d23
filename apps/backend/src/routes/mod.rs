use actix_web::web;

pub mod admin;
pub mod health;
pub mod realtime;
pub mod rooms;

/// Every route the server exposes. `main.rs` adds the middleware stack on
/// top; tests call this directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // /health
    cfg.configure(health::configure_routes);

    // /api/rooms/**
    cfg.service(web::scope("/api/rooms").configure(rooms::configure_routes));

    // /api/admin/**
    cfg.service(web::scope("/api/admin").configure(admin::configure_routes));

    // /api/ws/**
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
