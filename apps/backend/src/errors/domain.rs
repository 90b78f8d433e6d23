//! Domain-level error type used by the pure game layers, the orchestrator,
//! and the persistence adapters.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert with the provided
//! `From<DomainError> for AppError`.

use thiserror::Error;

/// Rule or input violations. Every variant maps to a stable error code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    OutOfTurn,
    PhaseMismatch,
    GameNotActive,
    PlayerEliminated,
    InsufficientFunds,
    NotOwner,
    AlreadyOwned,
    NotBuyable,
    GroupIncomplete,
    EvenBuild,
    MaxHouses,
    HotelRequiresFourHouses,
    HotelExists,
    NotInBuildGroup,
    BuyBlocked,
    InvalidCell,
    InvalidTarget,
    InvalidSelection,
    InvalidDice,
    NoEscapeCard,
    NegotiateTooEarly,
    NegotiationCooldown,
    NotOfferTarget,
    NoPendingOffer,
    AbilitiesDisabled,
    AbilityOnCooldown,
    AbilityAlreadyUsed,
    NotHost,
    NotEnoughPlayers,
    GameAlreadyStarted,
    CharacterTaken,
    InvalidSlot,
    NotAMember,
    Other(String),
}

/// Domain-level not found entities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    JoinCode,
    Player,
    Other(String),
}

/// Domain-level conflict kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    RoomFull,
    NegotiationPending,
    OptimisticLock,
    JoinCodeConflict,
    StaleTimer,
    Other(String),
}

/// Infra error kinds to distinguish operational failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    RoomUnavailable,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    #[error("validation error {0:?}: {1}")]
    Validation(ValidationKind, String),
    /// Semantic conflict
    #[error("conflict {0:?}: {1}")]
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    #[error("infra {0:?}: {1}")]
    Infra(InfraErrorKind, String),
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// The validation kind, if this is a validation error.
    pub fn validation_kind(&self) -> Option<&ValidationKind> {
        match self {
            Self::Validation(kind, _) => Some(kind),
            _ => None,
        }
    }

    /// Infra failures are the only errors that can leave work half-done.
    pub fn is_infra(&self) -> bool {
        matches!(self, Self::Infra(_, _))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e {
            sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
                DomainError::infra(InfraErrorKind::DbUnavailable, e.to_string())
            }
            other => DomainError::infra(
                InfraErrorKind::Other("DB".to_string()),
                other.to_string(),
            ),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::infra(InfraErrorKind::DataCorruption, e.to_string())
    }
}
