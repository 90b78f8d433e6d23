//! Application services that sit between the room actors and the pure domain.

pub mod game_flow;
