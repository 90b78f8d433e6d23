use std::env;
use std::time::Duration;

use serial_test::serial;

use super::{GameConfig, ServerConfig};

const VARS: &[&str] = &[
    "TYCOON_HOST",
    "TYCOON_PORT",
    "TYCOON_DATABASE_URL",
    "TYCOON_ADMIN_TOKEN",
    "TYCOON_TURN_SECONDS",
    "TYCOON_CARD_EXTENSION_MS",
    "TYCOON_CARD_DISPLAY_MS",
    "TYCOON_NEGOTIATION_SECONDS",
    "TYCOON_DISCONNECT_GRACE_SECONDS",
    "CORS_ALLOWED_ORIGINS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_apply_without_env() {
    clear_env();
    assert_eq!(ServerConfig::from_env().unwrap(), ServerConfig::default());

    let game = GameConfig::from_env().unwrap();
    assert_eq!(game, GameConfig::default());
    assert_eq!(game.turn_seconds, 30);
    assert_eq!(game.card_extension, Duration::from_millis(4_000));
    assert_eq!(game.disconnect_grace, Duration::from_secs(60));
}

#[test]
#[serial]
fn values_are_read_from_env() {
    clear_env();
    env::set_var("TYCOON_PORT", "8080");
    env::set_var("TYCOON_ADMIN_TOKEN", "  s3cret ");
    env::set_var("TYCOON_DATABASE_URL", "");
    env::set_var("TYCOON_TURN_SECONDS", "45");
    env::set_var("TYCOON_NEGOTIATION_SECONDS", "90");
    env::set_var(
        "CORS_ALLOWED_ORIGINS",
        "https://play.example.com/, null, ftp://nope, http://localhost:5173",
    );

    let server = ServerConfig::from_env().unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(server.admin_token.as_deref(), Some("s3cret"));
    assert_eq!(server.database_url, None);
    assert_eq!(
        server.cors_origins,
        vec!["https://play.example.com", "http://localhost:5173"]
    );

    let game = GameConfig::from_env().unwrap();
    assert_eq!(game.turn_seconds, 45);
    assert_eq!(game.room_settings().turn_seconds, 45);
    assert_eq!(game.timer_durations().negotiation, Duration::from_secs(90));
    clear_env();
}

#[test]
#[serial]
fn invalid_values_are_config_errors() {
    clear_env();
    env::set_var("TYCOON_PORT", "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("TYCOON_PORT"));
    clear_env();

    env::set_var("TYCOON_TURN_SECONDS", "0");
    let err = GameConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("TYCOON_TURN_SECONDS"));
    clear_env();
}
