//! Dice capability and board movement.
//!
//! Production rolls come from `CryptoDice` (ChaCha20 seeded from the OS).
//! Tests script rolls with `ScriptedDice`; admins pin a player's next roll
//! through `DiceOverrides`, which always take precedence.

use std::collections::{BTreeMap, VecDeque};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::rules::{CellIndex, Slot, BOARD_SIZE};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub d1: u8,
    pub d2: u8,
}

impl DiceRoll {
    pub fn new(d1: u8, d2: u8) -> Result<Self, DomainError> {
        if !(1..=6).contains(&d1) || !(1..=6).contains(&d2) {
            return Err(DomainError::validation(
                ValidationKind::InvalidDice,
                format!("dice must be within 1..=6, got ({d1}, {d2})"),
            ));
        }
        Ok(Self { d1, d2 })
    }

    pub fn total(&self) -> u8 {
        self.d1 + self.d2
    }

    pub fn is_double(&self) -> bool {
        self.d1 == self.d2
    }
}

/// Source of dice rolls.
pub trait Dice: Send {
    fn roll(&mut self) -> DiceRoll;
}

pub struct CryptoDice {
    rng: ChaCha20Rng,
}

impl CryptoDice {
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_os_rng(),
        }
    }
}

impl Default for CryptoDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for CryptoDice {
    fn roll(&mut self) -> DiceRoll {
        DiceRoll {
            d1: self.rng.random_range(1..=6),
            d2: self.rng.random_range(1..=6),
        }
    }
}

/// Always returns the same roll.
#[derive(Debug, Clone, Copy)]
pub struct FixedDice(pub DiceRoll);

impl Dice for FixedDice {
    fn roll(&mut self) -> DiceRoll {
        self.0
    }
}

/// Replays a script, then repeats the fallback roll.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: VecDeque<DiceRoll>,
    fallback: DiceRoll,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            script: rolls.into_iter().map(|(d1, d2)| DiceRoll { d1, d2 }).collect(),
            fallback: DiceRoll { d1: 1, d2: 2 },
        }
    }

    pub fn push(&mut self, d1: u8, d2: u8) {
        self.script.push_back(DiceRoll { d1, d2 });
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> DiceRoll {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

/// Per-slot pinned rolls, consumed on that slot's next roll.
#[derive(Debug, Clone, Default)]
pub struct DiceOverrides {
    pinned: BTreeMap<Slot, VecDeque<DiceRoll>>,
}

impl DiceOverrides {
    pub fn pin(&mut self, slot: Slot, roll: DiceRoll) {
        self.pinned.entry(slot).or_default().push_back(roll);
    }

    pub fn take(&mut self, slot: Slot) -> Option<DiceRoll> {
        let queue = self.pinned.get_mut(&slot)?;
        let roll = queue.pop_front();
        if queue.is_empty() {
            self.pinned.remove(&slot);
        }
        roll
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }
}

/// Roll for `slot`, preferring a pinned override.
pub fn roll_for(slot: Slot, overrides: &mut DiceOverrides, dice: &mut dyn Dice) -> DiceRoll {
    overrides.take(slot).unwrap_or_else(|| dice.roll())
}

/// Move forward. `passed_go` is set when the move wraps past the last cell.
pub fn advance(position: CellIndex, steps: u8) -> (CellIndex, bool) {
    let raw = u16::from(position) + u16::from(steps);
    let new = (raw % u16::from(BOARD_SIZE)) as CellIndex;
    (new, raw >= u16::from(BOARD_SIZE))
}

/// A deterministic rng for tests and replays.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}
