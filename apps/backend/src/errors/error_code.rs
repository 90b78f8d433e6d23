//! Error codes for the tycoon backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses and WebSocket error frames.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity & Access
    /// Identity headers missing or malformed
    Unauthorized,
    /// Access denied
    Forbidden,
    /// Caller is not seated in the room
    NotAMember,
    /// Only the host may do this
    NotHost,

    // Request Validation
    /// General bad request error
    BadRequest,
    /// Invalid or missing HTTP header
    InvalidHeader,
    /// Invalid room id
    InvalidRoomId,
    /// Invalid join code
    InvalidJoinCode,
    /// Malformed action payload
    InvalidAction,
    /// General validation error
    ValidationError,

    // Turn Rules
    /// Not the caller's turn
    OutOfTurn,
    /// Action not permitted in the current phase
    PhaseMismatch,
    /// Room is not playing
    GameNotActive,
    /// Caller has been eliminated
    PlayerEliminated,
    /// Not enough cash
    InsufficientFunds,
    /// Caller does not own the cell
    NotOwner,
    /// Cell already has an owner
    AlreadyOwned,
    /// Cell cannot be bought
    NotBuyable,
    /// Full color group required
    GroupIncomplete,
    /// Sibling cells must be built up first
    EvenBuild,
    /// Cell already has four houses
    MaxHouses,
    /// Hotel needs exactly four houses
    HotelRequiresFourHouses,
    /// Cell already has a hotel
    HotelExists,
    /// Cell is outside the current build group
    NotInBuildGroup,
    /// Buying is blocked this turn
    BuyBlocked,
    /// Invalid board cell
    InvalidCell,
    /// Invalid choice target
    InvalidTarget,
    /// Invalid sell selection
    InvalidSelection,
    /// Dice values out of range
    InvalidDice,
    /// No escape card held
    NoEscapeCard,
    /// Negotiation is not open yet
    NegotiateTooEarly,
    /// Requester is cooling down
    NegotiationCooldown,
    /// Offer is addressed to another player
    NotOfferTarget,
    /// No offer is pending
    NoPendingOffer,
    /// Abilities are disabled for the room
    AbilitiesDisabled,
    /// Ability is cooling down
    AbilityOnCooldown,
    /// Ability already used this turn
    AbilityAlreadyUsed,
    /// At least two players are required
    NotEnoughPlayers,
    /// Room is no longer waiting
    GameAlreadyStarted,
    /// Character already chosen by another player
    CharacterTaken,
    /// Invalid player slot
    InvalidSlot,

    // Resource Not Found
    /// Room not found
    RoomNotFound,
    /// No room for the join code
    JoinCodeNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// All four slots are taken
    RoomFull,
    /// Another offer is pending
    NegotiationPending,
    /// Optimistic lock conflict
    OptimisticLock,
    /// Join code already exists
    JoinCodeConflict,
    /// Timer no longer matches the phase
    StaleTimer,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Database timeout (gateway timeout)
    DbTimeout,
    /// Room actor is not reachable
    RoomUnavailable,
    /// Internal server error
    Internal,
    /// Internal server error (explicit problem code)
    InternalError,
    /// Configuration error
    ConfigError,
    /// Data corruption detected
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Identity & Access
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotAMember => "NOT_A_MEMBER",
            Self::NotHost => "NOT_HOST",

            // Request Validation
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidRoomId => "INVALID_ROOM_ID",
            Self::InvalidJoinCode => "INVALID_JOIN_CODE",
            Self::InvalidAction => "INVALID_ACTION",
            Self::ValidationError => "VALIDATION_ERROR",

            // Turn Rules
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::GameNotActive => "GAME_NOT_ACTIVE",
            Self::PlayerEliminated => "PLAYER_ELIMINATED",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::NotOwner => "NOT_OWNER",
            Self::AlreadyOwned => "ALREADY_OWNED",
            Self::NotBuyable => "NOT_BUYABLE",
            Self::GroupIncomplete => "GROUP_INCOMPLETE",
            Self::EvenBuild => "EVEN_BUILD",
            Self::MaxHouses => "MAX_HOUSES",
            Self::HotelRequiresFourHouses => "HOTEL_REQUIRES_FOUR_HOUSES",
            Self::HotelExists => "HOTEL_EXISTS",
            Self::NotInBuildGroup => "NOT_IN_BUILD_GROUP",
            Self::BuyBlocked => "BUY_BLOCKED",
            Self::InvalidCell => "INVALID_CELL",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::InvalidSelection => "INVALID_SELECTION",
            Self::InvalidDice => "INVALID_DICE",
            Self::NoEscapeCard => "NO_ESCAPE_CARD",
            Self::NegotiateTooEarly => "NEGOTIATE_TOO_EARLY",
            Self::NegotiationCooldown => "NEGOTIATION_COOLDOWN",
            Self::NotOfferTarget => "NOT_OFFER_TARGET",
            Self::NoPendingOffer => "NO_PENDING_OFFER",
            Self::AbilitiesDisabled => "ABILITIES_DISABLED",
            Self::AbilityOnCooldown => "ABILITY_ON_COOLDOWN",
            Self::AbilityAlreadyUsed => "ABILITY_ALREADY_USED",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::CharacterTaken => "CHARACTER_TAKEN",
            Self::InvalidSlot => "INVALID_SLOT",

            // Resource Not Found
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::JoinCodeNotFound => "JOIN_CODE_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Business Logic Conflicts
            Self::RoomFull => "ROOM_FULL",
            Self::NegotiationPending => "NEGOTIATION_PENDING",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            Self::StaleTimer => "STALE_TIMER",
            Self::Conflict => "CONFLICT",

            // System Errors
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::RoomUnavailable => "ROOM_UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
