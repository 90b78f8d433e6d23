use std::sync::Arc;

use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::actor::spawn_room;
use super::broadcast::Broadcaster;
use super::handle::RoomHandle;
use crate::domain::dice::{CryptoDice, Dice};
use crate::domain::state::{PlayerIdentity, Room, RoomId, RoomSettings};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::rooms::RoomRepo;
use crate::services::game_flow::{GameFlowService, NewRoom, TimerDurations};
use crate::utils::join_code::{generate_join_code, normalize_join_code};

const JOIN_CODE_ATTEMPTS: usize = 8;

/// Builds the dice each new room actor rolls with.
pub type DiceFactory = Arc<dyn Fn() -> Box<dyn Dice> + Send + Sync>;

/// Collaborators shared by every room actor.
#[derive(Clone)]
pub struct RoomRuntime {
    pub repo: Arc<dyn RoomRepo>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub durations: TimerDurations,
    pub dice: DiceFactory,
    /// Fixed seed for deck shuffles; `None` seeds each room from the OS.
    pub rng_seed: Option<u64>,
}

impl RoomRuntime {
    pub fn new(repo: Arc<dyn RoomRepo>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            repo,
            broadcaster,
            durations: TimerDurations::default(),
            dice: Arc::new(|| Box::new(CryptoDice::new()) as Box<dyn Dice>),
            rng_seed: None,
        }
    }
}

/// Live room actors, keyed by room id. Rooms not in memory are loaded from
/// the store on first use.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
    runtime: RoomRuntime,
}

impl RoomRegistry {
    pub fn new(runtime: RoomRuntime) -> Self {
        Self {
            rooms: DashMap::new(),
            runtime,
        }
    }

    pub fn runtime(&self) -> &RoomRuntime {
        &self.runtime
    }

    /// Rooms with a live actor.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Open a room with `host` in slot 1, persist it, and start its actor.
    pub async fn create_room(
        &self,
        host: PlayerIdentity,
        settings: RoomSettings,
    ) -> Result<(RoomHandle, Room), DomainError> {
        let join_code = self.fresh_join_code().await?;
        let created = GameFlowService.create_room(NewRoom {
            id: RoomId::generate(),
            join_code,
            host,
            settings,
            now: OffsetDateTime::now_utc(),
        });
        self.runtime.repo.save(&created.room).await?;

        let room = created.room;
        let handle = spawn_room(room.clone(), &self.runtime);
        self.rooms.insert(room.id.clone(), handle.clone());
        Ok((handle, room))
    }

    async fn fresh_join_code(&self) -> Result<String, DomainError> {
        for _ in 0..JOIN_CODE_ATTEMPTS {
            let code = generate_join_code();
            if self.runtime.repo.load_by_join_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!(join_code = %code, "Join code collision; drawing another");
        }
        Err(DomainError::conflict(
            ConflictKind::JoinCodeConflict,
            "could not find a free join code",
        ))
    }

    /// Address of the room's actor, spawning it from the store if needed.
    pub async fn get(&self, id: &RoomId) -> Result<RoomHandle, DomainError> {
        if let Some(handle) = self.rooms.get(id) {
            if !handle.is_closed() {
                return Ok(handle.clone());
            }
        }
        self.rooms.remove_if(id, |_, h| h.is_closed());

        let room = self.runtime.repo.load(id).await?.ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Room, format!("room {id} not found"))
        })?;
        let handle = self
            .rooms
            .entry(id.clone())
            .or_insert_with(|| {
                info!(room_id = %id, "Room loaded from store");
                spawn_room(room, &self.runtime)
            })
            .clone();
        Ok(handle)
    }

    /// Resolve a user-typed join code.
    pub async fn find_by_join_code(&self, code: &str) -> Result<RoomHandle, DomainError> {
        let not_found = || {
            DomainError::not_found(NotFoundKind::JoinCode, format!("no room with code {code}"))
        };
        let code = normalize_join_code(code).ok_or_else(not_found)?;
        let room = self
            .runtime
            .repo
            .load_by_join_code(&code)
            .await?
            .ok_or_else(not_found)?;
        self.get(&room.id).await
    }
}
