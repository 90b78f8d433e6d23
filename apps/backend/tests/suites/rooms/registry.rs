use backend::domain::state::{Room, RoomId};
use backend::errors::domain::{DomainError, NotFoundKind};
use backend::repos::rooms::RoomRepo;
use time::OffsetDateTime;

use super::{fixture, guest, settings};

#[tokio::test]
async fn unknown_rooms_and_codes() {
    let fx = fixture();

    let err = fx.registry.get(&RoomId::generate()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Room, _)));

    let err = fx.registry.find_by_join_code("??").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::JoinCode, _)));

    let err = fx.registry.find_by_join_code("ZZZZZZ").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::JoinCode, _)));
    assert!(fx.registry.is_empty());
}

#[tokio::test]
async fn every_lookup_reaches_the_same_actor() {
    let fx = fixture();
    let (created, room) = fx
        .registry
        .create_room(guest(), settings(30))
        .await
        .unwrap();

    let by_id = fx.registry.get(&room.id).await.unwrap();
    let by_code = fx
        .registry
        .find_by_join_code(&room.join_code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(by_code.id(), &room.id);

    by_id.join(guest()).await.unwrap();
    assert_eq!(created.snapshot().await.unwrap().players.len(), 2);
    assert_eq!(by_code.snapshot().await.unwrap().version, 2);
    assert_eq!(fx.registry.len(), 1);
}

#[tokio::test]
async fn stored_rooms_are_spawned_once() {
    let fx = fixture();
    let room = Room::new(
        RoomId::generate(),
        "STR123".into(),
        settings(30),
        OffsetDateTime::now_utc(),
    );
    fx.repo.save(&room).await.unwrap();

    let (a, b) = tokio::join!(fx.registry.get(&room.id), fx.registry.get(&room.id));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(fx.registry.len(), 1);

    a.join(guest()).await.unwrap();
    assert_eq!(b.snapshot().await.unwrap().players.len(), 1);
}
