use std::time::Duration;

use backend::domain::events::GameEvent;
use backend::domain::state::{EliminationReason, RoomStatus};
use tokio::time::sleep;

use super::{fixture, guest, settings, started};

#[tokio::test(start_paused = true)]
async fn spectators_get_no_slot() {
    let fx = fixture();
    let (handle, host, _) = started(&fx, 300).await;

    assert_eq!(handle.connect(guest()).await.unwrap().slot, None);
    assert_eq!(handle.connect(host).await.unwrap().slot, Some(1));
}

#[tokio::test(start_paused = true)]
async fn a_player_who_stays_away_is_eliminated() {
    let fx = fixture();
    let (handle, _, other) = started(&fx, 300).await;

    handle.connect(other).await.unwrap();
    handle.disconnect(2).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(!snap.players[1].connected);
    assert!(fx
        .sink
        .events()
        .contains(&GameEvent::PresenceChanged { slot: 2, connected: false }));

    sleep(Duration::from_secs(61)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.players[1].eliminated, Some(EliminationReason::Disconnected));
    assert_eq!(snap.status, RoomStatus::Finished);
    assert_eq!(snap.winner.map(|w| w.slot), Some(1));
}

#[tokio::test(start_paused = true)]
async fn coming_back_within_the_grace_window_keeps_the_seat() {
    let fx = fixture();
    let (handle, _, other) = started(&fx, 300).await;

    handle.connect(other.clone()).await.unwrap();
    handle.disconnect(2).await;
    sleep(Duration::from_secs(30)).await;
    handle.connect(other).await.unwrap();

    sleep(Duration::from_secs(61)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, RoomStatus::Playing);
    assert!(snap.players[1].connected);
    assert_eq!(snap.players[1].eliminated, None);
}

#[tokio::test(start_paused = true)]
async fn a_second_tab_keeps_the_player_connected() {
    let fx = fixture();
    let (handle, _, other) = started(&fx, 300).await;

    handle.connect(other.clone()).await.unwrap();
    handle.connect(other).await.unwrap();
    handle.disconnect(2).await;

    sleep(Duration::from_secs(61)).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.players[1].connected);
    assert_eq!(snap.status, RoomStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn lobby_seats_are_freed_after_the_grace_window() {
    let fx = fixture();
    let host = guest();
    let other = guest();
    let (handle, _) = fx
        .registry
        .create_room(host, settings(30))
        .await
        .unwrap();
    handle.join(other.clone()).await.unwrap();

    handle.connect(other).await.unwrap();
    handle.disconnect(2).await;
    sleep(Duration::from_secs(61)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, RoomStatus::Waiting);
    assert_eq!(snap.players.len(), 1);
    assert!(fx.sink.events().contains(&GameEvent::PlayerLeft { slot: 2 }));
}
