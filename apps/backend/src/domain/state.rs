//! The room document: every piece of game state the actor owns and persists.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::domain::abilities::Character;
use crate::domain::cards::{DeckKind, DeckState};
use crate::domain::dice::DiceRoll;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Money, Slot, HOTEL_LEVEL, MAX_PLAYERS};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a player is. Registered users and guests never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlayerIdentity {
    User(String),
    Guest(String),
}

impl PlayerIdentity {
    /// Registered user id, safe to show to other players. Guest ids act as
    /// bearer credentials and are never published.
    pub fn public_user_id(&self) -> Option<&str> {
        match self {
            PlayerIdentity::User(id) => Some(id),
            PlayerIdentity::Guest(_) => None,
        }
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerIdentity::User(id) => write!(f, "user:{id}"),
            PlayerIdentity::Guest(id) => write!(f, "guest:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
    Abandoned,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
            RoomStatus::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Finished | RoomStatus::Abandoned)
    }
}

/// Buildings on an owned cell. A hotel replaces the four houses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub houses: u8,
    pub hotel: bool,
}

impl Holding {
    /// Houses, or 5 for a hotel.
    pub fn level(&self) -> u8 {
        if self.hotel {
            HOTEL_LEVEL
        } else {
            self.houses
        }
    }

    pub fn has_buildings(&self) -> bool {
        self.hotel || self.houses > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    Bankrupt,
    Surrendered,
    Disconnected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffs {
    pub skip_next_turn: bool,
    pub rent_immunity: bool,
    pub double_rent_turns: u8,
    pub buy_blocked_turns: u8,
    /// Set at the start of a turn that a buy block covers.
    #[serde(default)]
    pub buying_blocked_now: bool,
    pub consecutive_doubles: u8,
    pub pending_travel: bool,
}

impl Buffs {
    /// Blocked for the rest of the turn the block was drawn in and for the
    /// next `buy_blocked_turns` turns of this player.
    pub fn buying_blocked(&self) -> bool {
        self.buying_blocked_now || self.buy_blocked_turns > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityState {
    pub cooldown: u8,
    pub used_this_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub slot: Slot,
    pub identity: PlayerIdentity,
    pub character: Character,
    pub cash: Money,
    pub position: CellIndex,
    pub holdings: BTreeMap<CellIndex, Holding>,
    pub held_cards: Vec<String>,
    pub eliminated: Option<EliminationReason>,
    pub connected: bool,
    pub afk: bool,
    pub afk_strikes: u8,
    pub island_turns: u8,
    pub buffs: Buffs,
    pub ability: AbilityState,
}

impl Player {
    pub fn new(slot: Slot, identity: PlayerIdentity, character: Character) -> Self {
        Self {
            slot,
            identity,
            character,
            cash: 0,
            position: 0,
            holdings: BTreeMap::new(),
            held_cards: Vec::new(),
            eliminated: None,
            connected: true,
            afk: false,
            afk_strikes: 0,
            island_turns: 0,
            buffs: Buffs::default(),
            ability: AbilityState::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.eliminated.is_none()
    }

    pub fn owns(&self, cell: CellIndex) -> bool {
        self.holdings.contains_key(&cell)
    }

    pub fn is_confined(&self) -> bool {
        self.island_turns > 0
    }

    pub fn holds_card(&self, card_id: &str) -> bool {
        self.held_cards.iter().any(|c| c == card_id)
    }

    /// Removes one copy of a held card; false if none was held.
    pub fn take_card(&mut self, card_id: &str) -> bool {
        match self.held_cards.iter().position(|c| c == card_id) {
            Some(i) => {
                self.held_cards.remove(i);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Festival {
    pub owner: Slot,
    pub cell: CellIndex,
    pub multiplier: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenRent {
    pub cell: CellIndex,
    pub remaining_turns: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationOffer {
    pub id: u64,
    pub from: Slot,
    pub to: Slot,
    pub cell: CellIndex,
    pub price: Money,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    LastStanding,
    RoundCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub slot: Slot,
    pub net_worth: Money,
    pub reason: WinReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    pub abilities_enabled: bool,
    pub max_rounds: Option<u32>,
    pub turn_seconds: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            abilities_enabled: true,
            max_rounds: None,
            turn_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decks {
    pub luck: DeckState,
    pub opportunity: DeckState,
}

impl Decks {
    pub fn get(&self, kind: DeckKind) -> &DeckState {
        match kind {
            DeckKind::Luck => &self.luck,
            DeckKind::Opportunity => &self.opportunity,
        }
    }

    pub fn get_mut(&mut self, kind: DeckKind) -> &mut DeckState {
        match kind {
            DeckKind::Luck => &mut self.luck,
            DeckKind::Opportunity => &mut self.opportunity,
        }
    }
}

/// Per-turn scratch state, reset whenever the turn passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    pub rolled_doubles: bool,
    pub extra_turn: bool,
    pub via_card: bool,
    pub pending_card_display: Option<String>,
    /// Steps still owed when a forced island fee sent the player to sell.
    #[serde(default)]
    pub pending_walk: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub join_code: String,
    pub host: Slot,
    pub status: RoomStatus,
    pub players: Vec<Player>,
    pub phase: Phase,
    /// Bumped on every phase entry; timers carry the value they were armed for.
    pub phase_seq: u64,
    /// Whether the current phase was entered through a card.
    pub phase_via_card: bool,
    pub current_slot: Slot,
    pub round: u32,
    pub last_dice: Option<DiceRoll>,
    pub decks: Decks,
    pub festival: Option<Festival>,
    pub frozen_rent: Vec<FrozenRent>,
    pub negotiation: Option<NegotiationOffer>,
    pub negotiation_cooldowns: BTreeMap<Slot, u32>,
    pub next_offer_id: u64,
    pub winner: Option<Winner>,
    pub settings: RoomSettings,
    pub turn: TurnContext,
    pub version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Room {
    pub fn new(
        id: RoomId,
        join_code: String,
        settings: RoomSettings,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            join_code,
            host: 1,
            status: RoomStatus::Waiting,
            players: Vec::with_capacity(MAX_PLAYERS),
            phase: Phase::Lobby,
            phase_seq: 0,
            phase_via_card: false,
            current_slot: 0,
            round: 1,
            last_dice: None,
            decks: Decks::default(),
            festival: None,
            frozen_rent: Vec::new(),
            negotiation: None,
            negotiation_cooldowns: BTreeMap::new(),
            next_offer_id: 1,
            winner: None,
            settings,
            turn: TurnContext::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn player(&self, slot: Slot) -> Option<&Player> {
        self.players.iter().find(|p| p.slot == slot)
    }

    pub fn player_mut(&mut self, slot: Slot) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.slot == slot)
    }

    pub fn player_by_identity(&self, identity: &PlayerIdentity) -> Option<&Player> {
        self.players.iter().find(|p| &p.identity == identity)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current_slot)
    }

    /// Non-eliminated players in slot order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn active_slots(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self.active_players().map(|p| p.slot).collect();
        slots.sort_unstable();
        slots
    }

    pub fn owner_of(&self, cell: CellIndex) -> Option<Slot> {
        self.players
            .iter()
            .find(|p| p.owns(cell))
            .map(|p| p.slot)
    }

    pub fn holding(&self, cell: CellIndex) -> Option<(Slot, Holding)> {
        self.players
            .iter()
            .find_map(|p| p.holdings.get(&cell).map(|h| (p.slot, *h)))
    }

    pub fn is_frozen(&self, cell: CellIndex) -> bool {
        self.frozen_rent
            .iter()
            .any(|f| f.cell == cell && f.remaining_turns > 0)
    }

    /// Enter a phase and bump the generation.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_seq += 1;
        self.phase_via_card = false;
    }

    pub fn first_free_slot(&self) -> Option<Slot> {
        (1..=MAX_PLAYERS as Slot).find(|s| self.player(*s).is_none())
    }
}
