use super::env::{optional_var, parse_var};
use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// Process-level settings: where to listen and which store to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Without a URL rooms live in memory only.
    pub database_url: Option<String>,
    /// Without a token the admin dice hook is closed.
    pub admin_token: Option<String>,
    /// Browser origins allowed by CORS; empty means localhost only.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            admin_token: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: optional_var("TYCOON_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var("TYCOON_PORT", DEFAULT_PORT)?,
            database_url: optional_var("TYCOON_DATABASE_URL"),
            admin_token: optional_var("TYCOON_ADMIN_TOKEN"),
            cors_origins: optional_var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

/// Comma-separated origins; blanks, `null`, and non-http entries are dropped.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
