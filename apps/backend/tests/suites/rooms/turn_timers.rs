use std::time::Duration;

use backend::domain::actions::PlayerAction;
use backend::domain::events::GameEvent;
use backend::domain::phase::Phase;
use backend::domain::state::RoomStatus;
use tokio::time::sleep;

use super::{fixture, started};

#[tokio::test(start_paused = true)]
async fn idle_turns_get_their_defaults_applied() {
    let fx = fixture();
    let (handle, _, _) = started(&fx, 10).await;

    sleep(Duration::from_secs(11)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.players[0].position, 4);
    assert_eq!(snap.phase, Phase::AwaitingAction { cell: 4 });
    assert!(fx
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::TimeoutApplied { slot: 1, .. })));

    // The buy decision times out as a skip and the turn passes.
    sleep(Duration::from_secs(11)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.current_slot, 2);
    assert_eq!(snap.phase, Phase::RollDice);
    assert!(snap.players[0].holdings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn acting_before_the_deadline_restarts_the_clock() {
    let fx = fixture();
    let (handle, host, _) = started(&fx, 10).await;

    sleep(Duration::from_secs(8)).await;
    handle.act(host, PlayerAction::RollDice, None).await.unwrap();

    // 16s after start but only 8s into the new phase.
    sleep(Duration::from_secs(8)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::AwaitingAction { cell: 4 });
    assert!(!fx
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::TimeoutApplied { .. })));

    sleep(Duration::from_secs(3)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.current_slot, 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_timeouts_mark_a_player_afk_until_they_act() {
    let fx = fixture();
    let (handle, host, _) = started(&fx, 10).await;

    let mut marked = false;
    for _ in 0..12 {
        sleep(Duration::from_secs(11)).await;
        if handle.snapshot().await.unwrap().players[0].afk {
            marked = true;
            break;
        }
    }
    assert!(marked, "slot 1 should have been marked AFK");
    assert!(fx
        .sink
        .events()
        .contains(&GameEvent::AfkChanged { slot: 1, afk: true }));

    // Wait for slot 1's turn and act by hand.
    let mut acted = false;
    for _ in 0..60 {
        let snap = handle.snapshot().await.unwrap();
        if snap.status != RoomStatus::Playing {
            break;
        }
        if snap.current_slot == 1 && snap.phase == Phase::RollDice {
            handle
                .act(host.clone(), PlayerAction::RollDice, None)
                .await
                .unwrap();
            acted = true;
            break;
        }
        sleep(Duration::from_secs(1)).await;
    }
    assert!(acted, "slot 1 never got another turn");
    assert!(!handle.snapshot().await.unwrap().players[0].afk);
}

#[tokio::test(start_paused = true)]
async fn lobby_rooms_arm_no_turn_timer() {
    let fx = fixture();
    let (handle, _) = fx
        .registry
        .create_room(super::guest(), super::settings(10))
        .await
        .unwrap();

    sleep(Duration::from_secs(120)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, RoomStatus::Waiting);
    assert_eq!(snap.version, 1);
    assert_eq!(fx.sink.count(), 0);
}
