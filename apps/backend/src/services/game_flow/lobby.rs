use time::OffsetDateTime;
use tracing::info;

use super::mutation::MutationResult;
use super::{Flow, GameFlowService};
use crate::domain::abilities::Character;
use crate::domain::cards::{shuffled_deck, DeckKind};
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::{Slot, MIN_PLAYERS, STARTING_CASH};
use crate::domain::state::{
    Decks, EliminationReason, Player, PlayerIdentity, Room, RoomId, RoomSettings, RoomStatus,
};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Everything needed to open a room.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub id: RoomId,
    pub join_code: String,
    pub host: PlayerIdentity,
    pub settings: RoomSettings,
    pub now: OffsetDateTime,
}

impl GameFlowService {
    /// Open a room with its creator seated in slot 1 as host.
    pub fn create_room(&self, new: NewRoom) -> MutationResult {
        let mut room = Room::new(new.id, new.join_code, new.settings, new.now);
        let user_id = new.host.public_user_id().map(str::to_string);
        room.players.push(Player::new(1, new.host, Character::ALL[0]));
        room.host = 1;
        room.version = 1;
        info!(room_id = %room.id, join_code = %room.join_code, "Room created");
        MutationResult {
            room,
            old_version: 0,
            events: vec![GameEvent::PlayerJoined { slot: 1, user_id }],
        }
    }
}

impl Flow<'_, '_> {
    /// Seat `identity` in the lowest free slot. Joining twice is a no-op.
    pub fn join(&mut self, identity: PlayerIdentity) -> Result<(), DomainError> {
        if self.room.player_by_identity(&identity).is_some() {
            return Ok(());
        }
        if self.room.status != RoomStatus::Waiting {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                format!("room is {}", self.room.status.as_str()),
            ));
        }
        let slot = self
            .room
            .first_free_slot()
            .ok_or_else(|| DomainError::conflict(ConflictKind::RoomFull, "all seats are taken"))?;
        let character = Character::ALL
            .into_iter()
            .find(|c| !self.room.players.iter().any(|p| p.character == *c))
            .unwrap_or(Character::ALL[0]);

        let user_id = identity.public_user_id().map(str::to_string);
        self.room.players.push(Player::new(slot, identity, character));
        self.room.players.sort_by_key(|p| p.slot);
        info!(room_id = %self.room.id, slot, "Player joined");
        self.emit(GameEvent::PlayerJoined { slot, user_id });
        Ok(())
    }

    pub fn select_character(&mut self, slot: Slot, character: Character) -> Result<(), DomainError> {
        self.ensure_waiting()?;
        let taken = self
            .room
            .players
            .iter()
            .any(|p| p.slot != slot && p.character == character);
        if taken {
            return Err(DomainError::validation(
                ValidationKind::CharacterTaken,
                format!("{character:?} is already taken"),
            ));
        }
        self.player_mut(slot)?.character = character;
        self.emit(GameEvent::CharacterSelected { slot, character });
        Ok(())
    }

    /// Leaving the lobby frees the seat; leaving a running game surrenders.
    pub fn leave(&mut self, slot: Slot) -> Result<(), DomainError> {
        match self.room.status {
            RoomStatus::Waiting => self.remove_from_lobby(slot),
            RoomStatus::Playing => self.eliminate(slot, EliminationReason::Surrendered),
            RoomStatus::Finished | RoomStatus::Abandoned => Err(DomainError::validation(
                ValidationKind::GameNotActive,
                format!("room is {}", self.room.status.as_str()),
            )),
        }
    }

    /// Host starts the game: decks are shuffled, cash handed out and the
    /// lowest slot rolls first.
    pub fn start(&mut self, slot: Slot) -> Result<(), DomainError> {
        self.ensure_waiting()?;
        if slot != self.room.host {
            return Err(DomainError::validation(
                ValidationKind::NotHost,
                "only the host can start the game",
            ));
        }
        if self.room.players.len() < MIN_PLAYERS {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                format!("at least {MIN_PLAYERS} players are needed"),
            ));
        }

        self.room.decks = Decks {
            luck: shuffled_deck(DeckKind::Luck, &mut *self.ctx.rng),
            opportunity: shuffled_deck(DeckKind::Opportunity, &mut *self.ctx.rng),
        };
        for player in &mut self.room.players {
            player.cash = STARTING_CASH;
            player.position = 0;
        }
        let first = self.room.active_slots().first().copied().unwrap_or(1);
        self.room.status = RoomStatus::Playing;
        self.room.round = 1;
        self.room.current_slot = first;
        self.room.set_phase(Phase::RollDice);
        info!(
            room_id = %self.room.id,
            players = self.room.players.len(),
            "Game started"
        );
        Ok(())
    }

    pub fn set_presence(&mut self, slot: Slot, connected: bool) -> Result<(), DomainError> {
        let player = self.player_mut(slot)?;
        if player.connected != connected {
            player.connected = connected;
            self.emit(GameEvent::PresenceChanged { slot, connected });
        }
        Ok(())
    }

    /// Grace window over. Players who came back in time are left alone.
    pub fn expire_disconnect(&mut self, slot: Slot) -> Result<(), DomainError> {
        let Some(player) = self.room.player(slot) else {
            return Ok(());
        };
        if player.connected || !player.is_active() {
            return Ok(());
        }
        match self.room.status {
            RoomStatus::Waiting => self.remove_from_lobby(slot)?,
            RoomStatus::Playing => {
                self.eliminate(slot, EliminationReason::Disconnected)?;
                let everyone_gone =
                    self.room.status == RoomStatus::Playing && self.room.active_players().all(|p| !p.connected);
                if everyone_gone {
                    self.abandon();
                }
            }
            RoomStatus::Finished | RoomStatus::Abandoned => {}
        }
        Ok(())
    }

    fn remove_from_lobby(&mut self, slot: Slot) -> Result<(), DomainError> {
        if self.room.player(slot).is_none() {
            return Ok(());
        }
        self.room.players.retain(|p| p.slot != slot);
        self.emit(GameEvent::PlayerLeft { slot });

        let Some(next_host) = self.room.players.iter().map(|p| p.slot).min() else {
            self.abandon();
            return Ok(());
        };
        if self.room.host == slot {
            self.room.host = next_host;
            self.emit(GameEvent::HostChanged { slot: next_host });
        }
        Ok(())
    }

    fn abandon(&mut self) {
        info!(room_id = %self.room.id, "Room abandoned");
        self.room.status = RoomStatus::Abandoned;
        self.room.negotiation = None;
    }

    fn ensure_waiting(&self) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Waiting {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                format!("room is {}", self.room.status.as_str()),
            ));
        }
        Ok(())
    }
}
