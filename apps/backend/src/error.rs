use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        detail: String,
        status: StatusCode,
    },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Timeout: {detail}")]
    Timeout { code: ErrorCode, detail: String },
    #[error("Unavailable: {detail}")]
    Unavailable { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Timeout { code, .. }
            | AppError::Unavailable { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Unauthorized { detail }
            | AppError::Forbidden { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Timeout { detail, .. }
            | AppError::Unavailable { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn unavailable(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn validation_code(kind: &ValidationKind) -> ErrorCode {
    match kind {
        ValidationKind::OutOfTurn => ErrorCode::OutOfTurn,
        ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
        ValidationKind::GameNotActive => ErrorCode::GameNotActive,
        ValidationKind::PlayerEliminated => ErrorCode::PlayerEliminated,
        ValidationKind::InsufficientFunds => ErrorCode::InsufficientFunds,
        ValidationKind::NotOwner => ErrorCode::NotOwner,
        ValidationKind::AlreadyOwned => ErrorCode::AlreadyOwned,
        ValidationKind::NotBuyable => ErrorCode::NotBuyable,
        ValidationKind::GroupIncomplete => ErrorCode::GroupIncomplete,
        ValidationKind::EvenBuild => ErrorCode::EvenBuild,
        ValidationKind::MaxHouses => ErrorCode::MaxHouses,
        ValidationKind::HotelRequiresFourHouses => ErrorCode::HotelRequiresFourHouses,
        ValidationKind::HotelExists => ErrorCode::HotelExists,
        ValidationKind::NotInBuildGroup => ErrorCode::NotInBuildGroup,
        ValidationKind::BuyBlocked => ErrorCode::BuyBlocked,
        ValidationKind::InvalidCell => ErrorCode::InvalidCell,
        ValidationKind::InvalidTarget => ErrorCode::InvalidTarget,
        ValidationKind::InvalidSelection => ErrorCode::InvalidSelection,
        ValidationKind::InvalidDice => ErrorCode::InvalidDice,
        ValidationKind::NoEscapeCard => ErrorCode::NoEscapeCard,
        ValidationKind::NegotiateTooEarly => ErrorCode::NegotiateTooEarly,
        ValidationKind::NegotiationCooldown => ErrorCode::NegotiationCooldown,
        ValidationKind::NotOfferTarget => ErrorCode::NotOfferTarget,
        ValidationKind::NoPendingOffer => ErrorCode::NoPendingOffer,
        ValidationKind::AbilitiesDisabled => ErrorCode::AbilitiesDisabled,
        ValidationKind::AbilityOnCooldown => ErrorCode::AbilityOnCooldown,
        ValidationKind::AbilityAlreadyUsed => ErrorCode::AbilityAlreadyUsed,
        ValidationKind::NotHost => ErrorCode::NotHost,
        ValidationKind::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
        ValidationKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
        ValidationKind::CharacterTaken => ErrorCode::CharacterTaken,
        ValidationKind::InvalidSlot => ErrorCode::InvalidSlot,
        ValidationKind::NotAMember => ErrorCode::NotAMember,
        ValidationKind::Other(_) => ErrorCode::ValidationError,
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = validation_code(&kind);
                match kind {
                    ValidationKind::NotHost | ValidationKind::NotAMember => {
                        AppError::forbidden(code, detail)
                    }
                    _ => AppError::invalid(code, detail),
                }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::RoomFull => ErrorCode::RoomFull,
                    ConflictKind::NegotiationPending => ErrorCode::NegotiationPending,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::JoinCodeConflict => ErrorCode::JoinCodeConflict,
                    ConflictKind::StaleTimer => ErrorCode::StaleTimer,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Room => ErrorCode::RoomNotFound,
                    NotFoundKind::JoinCode => ErrorCode::JoinCodeNotFound,
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Timeout {
                    code: ErrorCode::DbTimeout,
                    detail,
                },
                InfraErrorKind::DbUnavailable => {
                    AppError::unavailable(ErrorCode::DbUnavailable, detail)
                }
                InfraErrorKind::RoomUnavailable => {
                    AppError::unavailable(ErrorCode::RoomUnavailable, detail)
                }
                InfraErrorKind::DataCorruption => {
                    AppError::internal(ErrorCode::DataCorruption, detail)
                }
                InfraErrorKind::Other(_) => AppError::internal(ErrorCode::InternalError, detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::from(e).into()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str().to_string();
        let detail = self.detail();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://tycoon.game/errors/{code}"),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail,
            code,
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
