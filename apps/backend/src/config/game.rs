use std::time::Duration;

use super::env::{ensure_range, parse_var};
use crate::domain::state::RoomSettings;
use crate::error::AppError;
use crate::services::game_flow::TimerDurations;

/// Turn timing shared by every room on this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub turn_seconds: u32,
    pub card_extension: Duration,
    pub card_display: Duration,
    pub negotiation: Duration,
    pub disconnect_grace: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        let timers = TimerDurations::default();
        Self {
            turn_seconds: RoomSettings::default().turn_seconds,
            card_extension: timers.card_extension,
            card_display: timers.card_display,
            negotiation: timers.negotiation,
            disconnect_grace: timers.disconnect_grace,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let secs = |d: Duration| d.as_secs();
        let millis = |d: Duration| d.as_millis() as u64;

        let turn_seconds = ensure_range(
            "TYCOON_TURN_SECONDS",
            parse_var("TYCOON_TURN_SECONDS", u64::from(defaults.turn_seconds))?,
            600,
        )?;
        let card_extension = ensure_range(
            "TYCOON_CARD_EXTENSION_MS",
            parse_var("TYCOON_CARD_EXTENSION_MS", millis(defaults.card_extension))?,
            60_000,
        )?;
        let card_display = ensure_range(
            "TYCOON_CARD_DISPLAY_MS",
            parse_var("TYCOON_CARD_DISPLAY_MS", millis(defaults.card_display))?,
            60_000,
        )?;
        let negotiation = ensure_range(
            "TYCOON_NEGOTIATION_SECONDS",
            parse_var("TYCOON_NEGOTIATION_SECONDS", secs(defaults.negotiation))?,
            3_600,
        )?;
        let disconnect_grace = ensure_range(
            "TYCOON_DISCONNECT_GRACE_SECONDS",
            parse_var(
                "TYCOON_DISCONNECT_GRACE_SECONDS",
                secs(defaults.disconnect_grace),
            )?,
            3_600,
        )?;

        Ok(Self {
            turn_seconds: turn_seconds as u32,
            card_extension: Duration::from_millis(card_extension),
            card_display: Duration::from_millis(card_display),
            negotiation: Duration::from_secs(negotiation),
            disconnect_grace: Duration::from_secs(disconnect_grace),
        })
    }

    /// Settings a new room starts with unless the creator overrides them.
    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            turn_seconds: self.turn_seconds,
            ..RoomSettings::default()
        }
    }

    pub fn timer_durations(&self) -> TimerDurations {
        TimerDurations {
            card_extension: self.card_extension,
            card_display: self.card_display,
            negotiation: self.negotiation,
            disconnect_grace: self.disconnect_grace,
            ..TimerDurations::default()
        }
    }
}
