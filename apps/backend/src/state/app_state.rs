use std::sync::Arc;

use crate::config::GameConfig;
use crate::extractors::identity::IdentityResolver;
use crate::rooms::RoomRegistry;
use crate::ws::hub::WsHub;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    rooms: Arc<RoomRegistry>,
    hub: Arc<WsHub>,
    identity: Arc<dyn IdentityResolver>,
    game: GameConfig,
    /// Admin hooks are disabled when unset.
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        hub: Arc<WsHub>,
        identity: Arc<dyn IdentityResolver>,
        game: GameConfig,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            rooms,
            hub,
            identity,
            game,
            admin_token,
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn hub(&self) -> Arc<WsHub> {
        self.hub.clone()
    }

    pub fn identity(&self) -> &dyn IdentityResolver {
        self.identity.as_ref()
    }

    pub fn game(&self) -> &GameConfig {
        &self.game
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }
}
