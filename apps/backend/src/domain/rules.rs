//! Game constants and round-scaling arithmetic.

pub type Money = i64;
pub type Slot = u8;
pub type CellIndex = u8;

pub const BOARD_SIZE: u8 = 36;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

pub const STARTING_CASH: Money = 15_000;
pub const GO_SALARY: Money = 2_000;
pub const GO_LANDING_BONUS: Money = 1_000;
/// Chance, in percent, that landing exactly on GO grants a free building.
pub const FREE_BUILDING_CHANCE_PERCENT: u32 = 30;

pub const STATION_PRICE: Money = 2_000;
pub const UTILITY_PRICE: Money = 2_000;
pub const STATION_BASE_RENT: Money = 250;
pub const UTILITY_BASE_RENT: Money = 250;
/// Per completed round, rents on stations and utilities grow by this percentage.
pub const ROUND_SCALE_PERCENT: i64 = 8;

pub const TAX_MINIMUM: Money = 500;
pub const TAX_PERCENT: i64 = 10;

pub const ISLAND_FEE: Money = 1_000;
pub const ISLAND_TURNS: u8 = 3;
pub const MAX_CONSECUTIVE_DOUBLES: u8 = 3;

pub const MAX_HOUSES: u8 = 4;
/// Building level reported for a hotel in even-build comparisons.
pub const HOTEL_LEVEL: u8 = 5;

pub const FESTIVAL_BASE_MULTIPLIER: u8 = 2;
pub const FESTIVAL_MAX_MULTIPLIER: u8 = 4;
pub const FREEZE_TURNS: u8 = 4;

pub const BUYBACK_PERCENT: i64 = 110;

pub const NEGOTIATION_MIN_ROUND: u32 = 20;
pub const NEGOTIATION_COOLDOWN_ROUNDS: u32 = 3;

pub const AFK_STRIKE_LIMIT: u8 = 3;

/// Rounds fully played before the current one.
pub fn completed_rounds(round: u32) -> u32 {
    round.saturating_sub(1)
}

fn scale_denominator(round: u32) -> i64 {
    100 + ROUND_SCALE_PERCENT * i64::from(completed_rounds(round))
}

/// Integer division rounding half away from zero, for non-negative inputs.
pub fn div_round_half_up(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// `base × (1 + 0.08 × completedRounds)`, half-up.
pub fn round_scaled(base: Money, round: u32) -> Money {
    div_round_half_up(base * scale_denominator(round), 100)
}

/// `base / (1 + 0.08 × completedRounds)`, half-up.
pub fn round_decayed(base: Money, round: u32) -> Money {
    div_round_half_up(base * 100, scale_denominator(round))
}

/// `value × percent / 100`, half-up.
pub fn percent_of(value: Money, percent: i64) -> Money {
    if value < 0 {
        return -percent_of(-value, percent);
    }
    div_round_half_up(value * percent, 100)
}

/// `ceil(value × percent / 100)` for non-negative values.
pub fn percent_of_ceil(value: Money, percent: i64) -> Money {
    (value * percent + 99) / 100
}
