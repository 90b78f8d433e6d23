mod negotiation;
mod presence;
mod registry;
mod turn_timers;

use std::sync::{Arc, Mutex};

use backend::adapters::MemoryRoomRepo;
use backend::domain::events::GameEvent;
use backend::domain::state::{PlayerIdentity, RoomSettings};
use backend::rooms::{Broadcaster, EventBatch, RoomHandle, RoomRegistry, RoomRuntime};
use tycoon_test_support::unique_helpers::unique_guest_id;

use crate::support::test_state::fixed_dice;

/// Keeps every published batch for inspection.
#[derive(Default)]
pub struct RecordingBroadcaster {
    batches: Mutex<Vec<Arc<EventBatch>>>,
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, batch: Arc<EventBatch>) {
        self.batches.lock().unwrap().push(batch);
    }
}

impl RecordingBroadcaster {
    pub fn batches(&self) -> Vec<Arc<EventBatch>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.batches()
            .iter()
            .flat_map(|b| b.events.iter().cloned())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

pub struct Fixture {
    pub registry: RoomRegistry,
    pub repo: Arc<MemoryRoomRepo>,
    pub sink: Arc<RecordingBroadcaster>,
}

/// Registry over an in-memory store with default timer lengths and
/// non-double dice.
pub fn fixture() -> Fixture {
    let repo = Arc::new(MemoryRoomRepo::new());
    let sink = Arc::new(RecordingBroadcaster::default());
    let mut runtime = RoomRuntime::new(repo.clone(), sink.clone());
    runtime.dice = fixed_dice(1, 3);
    runtime.rng_seed = Some(11);
    Fixture {
        registry: RoomRegistry::new(runtime),
        repo,
        sink,
    }
}

pub fn guest() -> PlayerIdentity {
    PlayerIdentity::Guest(unique_guest_id())
}

pub fn settings(turn_seconds: u32) -> RoomSettings {
    RoomSettings {
        turn_seconds,
        ..RoomSettings::default()
    }
}

/// Two players, game started, slot 1 to roll.
pub async fn started(
    fx: &Fixture,
    turn_seconds: u32,
) -> (RoomHandle, PlayerIdentity, PlayerIdentity) {
    let host = guest();
    let other = guest();
    let (handle, _) = fx
        .registry
        .create_room(host.clone(), settings(turn_seconds))
        .await
        .unwrap();
    handle.join(other.clone()).await.unwrap();
    handle.start(host.clone()).await.unwrap();
    (handle, host, other)
}
