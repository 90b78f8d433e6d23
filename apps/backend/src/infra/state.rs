use std::sync::Arc;

use tracing::info;

use crate::adapters::{MemoryRoomRepo, SeaRoomRepo};
use crate::config::{GameConfig, ServerConfig};
use crate::error::AppError;
use crate::extractors::identity::{HeaderIdentityResolver, IdentityResolver};
use crate::infra::db::connect_db;
use crate::infra::schema_guard::ensure_schema_ready;
use crate::repos::rooms::RoomRepo;
use crate::rooms::{Broadcaster, DiceFactory, RoomRegistry, RoomRuntime};
use crate::state::app_state::AppState;
use crate::ws::hub::WsHub;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    game: GameConfig,
    database_url: Option<String>,
    repo: Option<Arc<dyn RoomRepo>>,
    identity: Arc<dyn IdentityResolver>,
    dice: Option<DiceFactory>,
    rng_seed: Option<u64>,
    admin_token: Option<String>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            game: GameConfig::default(),
            database_url: None,
            repo: None,
            identity: Arc::new(HeaderIdentityResolver),
            dice: None,
            rng_seed: None,
            admin_token: None,
        }
    }

    /// Database URL and admin token from the server config.
    pub fn with_server(mut self, server: &ServerConfig) -> Self {
        self.database_url = server.database_url.clone();
        self.admin_token = server.admin_token.clone();
        self
    }

    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Persist rooms in this database; the `rooms` table is created if missing.
    pub fn with_database(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Use an existing store. Takes precedence over a database URL.
    pub fn with_repo(mut self, repo: Arc<dyn RoomRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_dice(mut self, dice: DiceFactory) -> Self {
        self.dice = Some(dice);
        self
    }

    /// Deterministic deck shuffles for every room.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let repo: Arc<dyn RoomRepo> = match (self.repo, self.database_url) {
            (Some(repo), _) => repo,
            (None, Some(url)) => {
                let db = connect_db(&url).await?;
                ensure_schema_ready(&db).await?;
                Arc::new(SeaRoomRepo::new(db))
            }
            (None, None) => Arc::new(MemoryRoomRepo::new()),
        };
        info!(store = repo.kind(), "Room store ready");

        let hub = Arc::new(WsHub::new());
        let mut runtime = RoomRuntime::new(repo, hub.clone() as Arc<dyn Broadcaster>);
        runtime.durations = self.game.timer_durations();
        runtime.rng_seed = self.rng_seed;
        if let Some(dice) = self.dice {
            runtime.dice = dice;
        }

        Ok(AppState::new(
            Arc::new(RoomRegistry::new(runtime)),
            hub,
            self.identity,
            self.game,
            self.admin_token,
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
