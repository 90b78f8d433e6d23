use std::time::Duration;

use backend::domain::abilities::Character;
use backend::domain::events::GameEvent;
use backend::domain::phase::Phase;
use backend::domain::rules::STARTING_CASH;
use backend::domain::state::{NegotiationOffer, Player, Room, RoomId, RoomStatus};
use backend::repos::rooms::RoomRepo;
use time::OffsetDateTime;
use tokio::time::sleep;

use super::{fixture, guest, settings};

/// A late-game room with an offer from slot 1 to slot 2 already pending.
fn room_with_offer(offer_id: u64) -> Room {
    let now = OffsetDateTime::now_utc();
    let mut room = Room::new(RoomId::generate(), "NGT001".into(), settings(300), now);
    for (slot, character) in [(1, Character::Banker), (2, Character::Landlord)] {
        let mut player = Player::new(slot, guest(), character);
        player.cash = STARTING_CASH;
        room.players.push(player);
    }
    room.host = 1;
    room.status = RoomStatus::Playing;
    room.round = 20;
    room.current_slot = 1;
    room.set_phase(Phase::RollDice);
    room.negotiation = Some(NegotiationOffer {
        id: offer_id,
        from: 1,
        to: 2,
        cell: 4,
        price: 3_000,
        created_at: now,
    });
    room.next_offer_id = offer_id + 1;
    room.version = 12;
    room
}

#[tokio::test(start_paused = true)]
async fn unanswered_offers_expire() {
    let fx = fixture();
    let room = room_with_offer(7);
    fx.repo.save(&room).await.unwrap();

    let handle = fx.registry.get(&room.id).await.unwrap();
    sleep(Duration::from_secs(30)).await;
    assert!(handle.snapshot().await.unwrap().negotiation.is_some());

    sleep(Duration::from_secs(31)).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.negotiation.is_none());
    assert_eq!(snap.version, 13);
    assert!(fx
        .sink
        .events()
        .contains(&GameEvent::NegotiationExpired { id: 7 }));

    let stored = fx.repo.load(&room.id).await.unwrap().unwrap();
    assert!(stored.negotiation.is_none());
}
