use tokio::sync::{mpsc, oneshot};

use super::commands::{Ack, Presence, Reply, RoomCommand};
use crate::domain::abilities::Character;
use crate::domain::actions::PlayerAction;
use crate::domain::dice::DiceRoll;
use crate::domain::rules::Slot;
use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::{PlayerIdentity, Room, RoomId};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Cloneable address of a running room actor.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: RoomId,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(super) fn new(id: RoomId, tx: mpsc::Sender<RoomCommand>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The actor has exited and will not answer again.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| self.unavailable())?;
        rx.await.map_err(|_| self.unavailable())?
    }

    fn unavailable(&self) -> DomainError {
        DomainError::infra(
            InfraErrorKind::RoomUnavailable,
            format!("room {} is not accepting commands", self.id),
        )
    }

    pub async fn act(
        &self,
        identity: PlayerIdentity,
        action: PlayerAction,
        expected_version: Option<i32>,
    ) -> Result<Ack, DomainError> {
        self.request(|reply| RoomCommand::Act {
            identity,
            action,
            expected_version,
            reply,
        })
        .await
    }

    pub async fn join(&self, identity: PlayerIdentity) -> Result<Ack, DomainError> {
        self.request(|reply| RoomCommand::Join { identity, reply })
            .await
    }

    pub async fn select_character(
        &self,
        identity: PlayerIdentity,
        character: Character,
    ) -> Result<Ack, DomainError> {
        self.request(|reply| RoomCommand::SelectCharacter {
            identity,
            character,
            reply,
        })
        .await
    }

    pub async fn leave(&self, identity: PlayerIdentity) -> Result<Ack, DomainError> {
        self.request(|reply| RoomCommand::Leave { identity, reply })
            .await
    }

    pub async fn start(&self, identity: PlayerIdentity) -> Result<Ack, DomainError> {
        self.request(|reply| RoomCommand::Start { identity, reply })
            .await
    }

    /// Queue `roll` as `slot`'s next roll.
    pub async fn pin_dice(&self, slot: Slot, roll: DiceRoll) -> Result<(), DomainError> {
        self.request(|reply| RoomCommand::PinDice { slot, roll, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, DomainError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Full server-side document, deck order included.
    pub async fn document(&self) -> Result<Room, DomainError> {
        self.request(|reply| RoomCommand::Document { reply }).await
    }

    pub async fn connect(&self, identity: PlayerIdentity) -> Result<Presence, DomainError> {
        self.request(|reply| RoomCommand::Connect { identity, reply })
            .await
    }

    /// Fire-and-forget; a closed room has nobody left to tell.
    pub async fn disconnect(&self, slot: Slot) {
        let _ = self.tx.send(RoomCommand::Disconnect { slot }).await;
    }
}
