use backend::adapters::rooms_sea::{row_from_room, upsert};
use backend::domain::abilities::Character;
use backend::domain::state::{Player, PlayerIdentity, Room, RoomId, RoomSettings, RoomStatus};
use backend::errors::domain::{DomainError, InfraErrorKind};
use backend::infra::schema_guard::ensure_schema_ready;
use backend::infra::state::build_state;
use backend::repos::rooms::RoomRepo;
use sea_orm::Set;
use time::OffsetDateTime;
use tycoon_test_support::unique_helpers::unique_guest_id;

use super::{sea_repo, sqlite_url};

fn lobby_room(code: &str) -> Room {
    let mut room = Room::new(
        RoomId::generate(),
        code.to_string(),
        RoomSettings::default(),
        OffsetDateTime::now_utc(),
    );
    room.players.push(Player::new(
        1,
        PlayerIdentity::Guest(unique_guest_id()),
        Character::Banker,
    ));
    room.version = 1;
    room
}

#[tokio::test]
async fn saved_rooms_load_by_id_and_join_code() {
    let repo = sea_repo().await;
    let room = lobby_room("ABC123");
    repo.save(&room).await.unwrap();

    let by_id = repo.load(&room.id).await.unwrap().unwrap();
    assert_eq!(by_id, room);
    let by_code = repo.load_by_join_code("ABC123").await.unwrap().unwrap();
    assert_eq!(by_code.id, room.id);

    assert!(repo.load(&RoomId::generate()).await.unwrap().is_none());
    assert!(repo.load_by_join_code("ZZZZZZ").await.unwrap().is_none());
    assert_eq!(repo.kind(), "database");
}

#[tokio::test]
async fn saving_again_overwrites_the_document() {
    let repo = sea_repo().await;
    let mut room = lobby_room("QWE456");
    repo.save(&room).await.unwrap();

    room.status = RoomStatus::Abandoned;
    room.version = 9;
    room.players.clear();
    repo.save(&room).await.unwrap();

    let loaded = repo.load(&room.id).await.unwrap().unwrap();
    assert_eq!(loaded.version, 9);
    assert_eq!(loaded.status, RoomStatus::Abandoned);
    assert!(loaded.players.is_empty());
}

#[tokio::test]
async fn schema_setup_is_idempotent() {
    let repo = sea_repo().await;
    ensure_schema_ready(repo.connection()).await.unwrap();
    repo.save(&lobby_room("ZXC789")).await.unwrap();
}

#[tokio::test]
async fn a_document_filed_under_the_wrong_id_is_corruption() {
    let repo = sea_repo().await;
    let room = lobby_room("MNB246");
    let mut row = row_from_room(&room).unwrap();
    let other = RoomId::generate();
    row.id = Set(other.to_string());
    upsert(repo.connection(), row).await.unwrap();

    let err = repo.load(&other).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Infra(InfraErrorKind::DataCorruption, _)
    ));
}

#[tokio::test]
async fn state_built_with_a_database_persists_rooms() {
    let url = sqlite_url();
    let state = build_state().with_database(&url).build().await.unwrap();
    assert_eq!(state.rooms().runtime().repo.kind(), "database");

    let (_, room) = state
        .rooms()
        .create_room(
            PlayerIdentity::User("user-1".into()),
            RoomSettings::default(),
        )
        .await
        .unwrap();

    let restarted = build_state().with_database(&url).build().await.unwrap();
    let handle = restarted.rooms().get(&room.id).await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.players[0].user_id.as_deref(), Some("user-1"));
    assert_eq!(snap.version, 1);
}
