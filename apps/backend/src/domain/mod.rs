//! Domain layer: board, economy, cards, abilities, and the room document.
//! Everything here is pure; the orchestrator in `services::game_flow` drives it.

pub mod abilities;
pub mod actions;
pub mod board;
pub mod card_effects;
pub mod cards;
pub mod deltas;
pub mod dice;
pub mod economy;
pub mod events;
pub mod game_transition;
pub mod phase;
pub mod rules;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod test_prelude;
#[cfg(test)]
pub(crate) mod test_state_helpers;
#[cfg(test)]
mod tests_economy;
#[cfg(test)]
mod tests_props_cards;

// Re-exports for ergonomics
pub use actions::{EscapeMethod, PlayerAction, SellSelection};
pub use dice::{Dice, DiceOverrides, DiceRoll};
pub use events::GameEvent;
pub use phase::Phase;
pub use rules::{CellIndex, Money, Slot};
pub use state::{PlayerIdentity, Room, RoomId, RoomStatus};
