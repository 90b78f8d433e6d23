//! Start-up configuration read from `TYCOON_*` environment variables.

mod env;
pub mod game;
pub mod server;

pub use game::GameConfig;
pub use server::ServerConfig;

#[cfg(test)]
mod tests_config;
