use std::sync::Arc;

use backend::adapters::MemoryRoomRepo;
use backend::domain::dice::{Dice, DiceRoll, FixedDice, ScriptedDice};
use backend::infra::state::build_state;
use backend::rooms::DiceFactory;
use backend::state::app_state::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Every room rolls `(d1, d2)` forever.
pub fn fixed_dice(d1: u8, d2: u8) -> DiceFactory {
    Arc::new(move || Box::new(FixedDice(DiceRoll { d1, d2 })) as Box<dyn Dice>)
}

/// Every room replays the same script.
pub fn scripted_dice(rolls: Vec<(u8, u8)>) -> DiceFactory {
    Arc::new(move || Box::new(ScriptedDice::new(rolls.clone())) as Box<dyn Dice>)
}

/// In-memory state with non-double dice so turns always pass.
pub async fn memory_state() -> (AppState, Arc<MemoryRoomRepo>) {
    memory_state_with(fixed_dice(1, 3)).await
}

pub async fn memory_state_with(dice: DiceFactory) -> (AppState, Arc<MemoryRoomRepo>) {
    let repo = Arc::new(MemoryRoomRepo::new());
    let state = build_state()
        .with_repo(repo.clone())
        .with_dice(dice)
        .with_rng_seed(7)
        .with_admin_token(ADMIN_TOKEN)
        .build()
        .await
        .expect("memory state should build");
    (state, repo)
}
