//! Room runtime: one single-writer actor per room, the timers it owns, and
//! the registry that finds or spawns actors.
//!
//! Every room mutation goes through the actor's inbox, so actions from
//! different players are serialized without locks. The actor saves before
//! it broadcasts, and re-arms timers after every commit.

mod actor;
pub mod broadcast;
mod commands;
mod handle;
pub mod registry;
pub mod timers;


pub use broadcast::{Broadcaster, EventBatch, NoopBroadcaster};
pub use commands::{Ack, Presence};
pub use handle::RoomHandle;
pub use registry::{DiceFactory, RoomRegistry, RoomRuntime};
pub use timers::{TimerFired, TimerKey};
