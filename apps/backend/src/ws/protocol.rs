use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::events::GameEvent;
use crate::domain::rules::Slot;
use crate::domain::snapshot::RoomSnapshot;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    Action {
        action: PlayerAction,
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        expected_version: Option<i32>,
    },
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        room_id: String,
        /// `None` for spectators.
        slot: Option<Slot>,
    },

    Snapshot {
        version: i32,
        snapshot: RoomSnapshot,
    },

    Events {
        version: i32,
        events: Vec<GameEvent>,
        snapshot: RoomSnapshot,
    },

    Ack {
        request_id: Option<String>,
        version: i32,
    },

    Error {
        code: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

/// Frame-level failures that are not domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    BadProtocol,
    BadRequest,
    HelloRequired,
    Spectator,
}

impl ProtocolError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolError::BadProtocol => "BAD_PROTOCOL",
            ProtocolError::BadRequest => "BAD_REQUEST",
            ProtocolError::HelloRequired => "HELLO_REQUIRED",
            ProtocolError::Spectator => "NOT_A_MEMBER",
        }
    }
}
