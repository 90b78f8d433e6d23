// Error mapping checks: pure domain errors to boundary errors, no HTTP server involved.
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_rule_violations_to_422() {
    let de = DomainError::validation(ValidationKind::EvenBuild, "sibling has fewer houses");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::EvenBuild);
    assert_eq!(app.status().as_u16(), 422);

    let de = DomainError::validation(ValidationKind::Other("misc".into()), "bad field");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_not_host_to_403() {
    let app: AppError = DomainError::validation(ValidationKind::NotHost, "host only").into();
    assert_eq!(app.status().as_u16(), 403);
    assert_eq!(app.code().as_str(), "NOT_HOST");
}

#[test]
fn maps_conflicts() {
    let full: AppError = DomainError::conflict(ConflictKind::RoomFull, "full").into();
    assert_eq!(full.code().as_str(), "ROOM_FULL");
    assert_eq!(full.status().as_u16(), 409);

    let other: AppError =
        DomainError::conflict(ConflictKind::Other("x".into()), "generic").into();
    assert_eq!(other.code().as_str(), "CONFLICT");
}

#[test]
fn maps_not_found() {
    let app: AppError = DomainError::not_found(NotFoundKind::Room, "no room").into();
    assert_eq!(app.code().as_str(), "ROOM_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_infra() {
    let app: AppError = DomainError::infra(InfraErrorKind::Timeout, "timeout").into();
    assert_eq!(app.code().as_str(), "DB_TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let app: AppError = DomainError::infra(InfraErrorKind::DbUnavailable, "down").into();
    assert_eq!(app.status().as_u16(), 503);

    let app: AppError = DomainError::infra(InfraErrorKind::DataCorruption, "bad").into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn constructor_helpers() {
    let v = DomainError::validation(ValidationKind::OutOfTurn, "wait");
    assert_eq!(v.validation_kind(), Some(&ValidationKind::OutOfTurn));
    assert!(!v.is_infra());

    let i = DomainError::infra(InfraErrorKind::Other("io".into()), "boom");
    assert!(i.is_infra());
    assert!(i.validation_kind().is_none());
}
