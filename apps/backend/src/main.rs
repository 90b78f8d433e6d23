use actix_web::{web, App, HttpServer};
use backend::config::{GameConfig, ServerConfig};
use backend::infra::state::build_state;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_trace::RequestTrace;
use backend::middleware::structured_logger::StructuredLogger;
use backend::routes;
use backend::AppError;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let (server, game) = match load_config() {
        Ok(configs) => configs,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_server(&server)
        .with_game(game)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %server.host,
        port = server.port,
        turn_seconds = game.turn_seconds,
        admin_hooks = server.admin_token.is_some(),
        "Starting Tycoon backend"
    );

    let data = web::Data::new(app_state);
    let origins = server.cors_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}

fn load_config() -> Result<(ServerConfig, GameConfig), AppError> {
    Ok((ServerConfig::from_env()?, GameConfig::from_env()?))
}
