use tokio::sync::oneshot;

use super::timers::TimerFired;
use crate::domain::abilities::Character;
use crate::domain::actions::PlayerAction;
use crate::domain::dice::DiceRoll;
use crate::domain::rules::Slot;
use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::{PlayerIdentity, Room};
use crate::errors::domain::DomainError;

pub(super) type Reply<T> = oneshot::Sender<Result<T, DomainError>>;

/// Acknowledgement for an accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub version: i32,
    pub slot: Slot,
}

/// A registered connection. Spectators get no slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub slot: Option<Slot>,
}

pub(super) enum RoomCommand {
    Act {
        identity: PlayerIdentity,
        action: PlayerAction,
        expected_version: Option<i32>,
        reply: Reply<Ack>,
    },
    Join {
        identity: PlayerIdentity,
        reply: Reply<Ack>,
    },
    SelectCharacter {
        identity: PlayerIdentity,
        character: Character,
        reply: Reply<Ack>,
    },
    Leave {
        identity: PlayerIdentity,
        reply: Reply<Ack>,
    },
    Start {
        identity: PlayerIdentity,
        reply: Reply<Ack>,
    },
    PinDice {
        slot: Slot,
        roll: DiceRoll,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<RoomSnapshot>,
    },
    Document {
        reply: Reply<Room>,
    },
    Connect {
        identity: PlayerIdentity,
        reply: Reply<Presence>,
    },
    Disconnect {
        slot: Slot,
    },
    Timer(TimerFired),
}
