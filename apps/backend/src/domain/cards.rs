//! Card definitions, deck state, shuffling, and drawing.
//!
//! Decks are plain id lists plus a cursor so they persist inside the room
//! document. Drawing never fails: a corrupted deck is rebuilt from the
//! canonical list before the draw.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::board::{FESTIVAL_CELL, GO_CELL, TRAVEL_CELL};
use crate::domain::rules::{CellIndex, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckKind {
    Luck,
    Opportunity,
}

impl DeckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeckKind::Luck => "luck",
            DeckKind::Opportunity => "opportunity",
        }
    }
}

/// Declarative effect of a card. Resolution lives in `card_effects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardEffect {
    GainPoints { amount: Money },
    LosePoints { amount: Money },
    LosePercent { percent: u8 },
    MoveTo { cell: CellIndex },
    MoveRelative { steps: i8 },
    MoveToNearestStation,
    MoveToNearestUtility,
    GainFromEach { amount: Money },
    LoseToEach { amount: Money },
    GoToIsland,
    SwapPosition,
    StealProperty,
    TeleportAll,
    ChooseDestination,
    ForcedTrade,
    RentFreeze,
    EminentDomain,
    UnderdogBoost { amount: Money },
    WealthTransfer { amount: Money },
    GainPerGroup { amount: Money },
    GainPerProperty { amount: Money },
    PayPerBuilding { house: Money, hotel: Money },
    ExtraTurn,
    SkipNextTurn,
    EscapeIsland,
    RentShield,
    DoubleRent { turns: u8 },
    BlockBuying { turns: u8 },
    DemolishBuilding,
    FreeUpgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardDef {
    pub id: &'static str,
    pub deck: DeckKind,
    pub title: &'static str,
    pub effect: CardEffect,
    pub min_round: Option<u32>,
    pub holdable: bool,
}

const fn card(id: &'static str, deck: DeckKind, title: &'static str, effect: CardEffect) -> CardDef {
    CardDef {
        id,
        deck,
        title,
        effect,
        min_round: None,
        holdable: false,
    }
}

const fn gated(mut def: CardDef, round: u32) -> CardDef {
    def.min_round = Some(round);
    def
}

const fn holdable(mut def: CardDef) -> CardDef {
    def.holdable = true;
    def
}

use CardEffect as E;
use DeckKind::{Luck as L, Opportunity as O};

pub static LUCK_CARDS: [CardDef; 16] = [
    card("L01", L, "Lottery win", E::GainPoints { amount: 1000 }),
    card("L02", L, "Utility inspection", E::MoveToNearestUtility),
    card("L03", L, "Back to the start", E::MoveTo { cell: GO_CELL }),
    card("L04", L, "Wrong turn", E::MoveRelative { steps: -3 }),
    card("L05", L, "Birthday party", E::GainFromEach { amount: 300 }),
    card("L06", L, "Shipwrecked", E::GoToIsland),
    card("L07", L, "Body double", E::SwapPosition),
    gated(card("L08", L, "Cat burglar", E::StealProperty), 5),
    card("L09", L, "Earthquake", E::TeleportAll),
    card("L10", L, "Free ticket", E::ChooseDestination),
    card("L11", L, "Second wind", E::ExtraTurn),
    card("L12", L, "Food poisoning", E::SkipNextTurn),
    holdable(card("L13", L, "Rescue boat", E::EscapeIsland)),
    card("L14", L, "Carnival invitation", E::MoveTo { cell: FESTIVAL_CELL }),
    card("L15", L, "Tourist season", E::DoubleRent { turns: 2 }),
    card("L16", L, "Express train", E::MoveToNearestStation),
];

pub static OPPORTUNITY_CARDS: [CardDef; 16] = [
    card("O01", O, "Property dividend", E::GainPerProperty { amount: 150 }),
    card("O02", O, "Audit", E::LosePoints { amount: 1200 }),
    card("O03", O, "Charity gala", E::LoseToEach { amount: 250 }),
    gated(card("O04", O, "Land swap", E::ForcedTrade), 5),
    card("O05", O, "Rent strike", E::RentFreeze),
    gated(card("O06", O, "Compulsory purchase", E::EminentDomain), 8),
    card("O07", O, "Underdog grant", E::UnderdogBoost { amount: 2000 }),
    card("O08", O, "Wealth tax", E::WealthTransfer { amount: 1500 }),
    card("O09", O, "Monopoly bonus", E::GainPerGroup { amount: 800 }),
    card("O10", O, "Repairs", E::PayPerBuilding { house: 100, hotel: 400 }),
    holdable(card("O11", O, "Rent shield", E::RentShield)),
    card("O12", O, "Zoning freeze", E::BlockBuying { turns: 1 }),
    card("O13", O, "Wrecking ball", E::DemolishBuilding),
    card("O14", O, "Road trip", E::MoveTo { cell: TRAVEL_CELL }),
    card("O15", O, "Market crash", E::LosePercent { percent: 10 }),
    card("O16", O, "Renovation grant", E::FreeUpgrade),
];

pub fn deck_cards(deck: DeckKind) -> &'static [CardDef] {
    match deck {
        DeckKind::Luck => &LUCK_CARDS,
        DeckKind::Opportunity => &OPPORTUNITY_CARDS,
    }
}

pub fn card_by_id(id: &str) -> Option<&'static CardDef> {
    LUCK_CARDS
        .iter()
        .chain(OPPORTUNITY_CARDS.iter())
        .find(|c| c.id == id)
}

pub fn canonical_ids(deck: DeckKind) -> Vec<String> {
    deck_cards(deck).iter().map(|c| c.id.to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckState {
    pub cards: Vec<String>,
    pub cursor: usize,
}

/// Fisher–Yates over the given rng.
pub fn shuffle_ids<R: Rng + ?Sized>(ids: &mut [String], rng: &mut R) {
    for i in (1..ids.len()).rev() {
        let j = rng.random_range(0..=i);
        ids.swap(i, j);
    }
}

pub fn shuffled_deck<R: Rng + ?Sized>(deck: DeckKind, rng: &mut R) -> DeckState {
    let mut cards = canonical_ids(deck);
    shuffle_ids(&mut cards, rng);
    DeckState { cards, cursor: 0 }
}

/// Whether the stored deck can be drawn from as-is.
pub fn is_intact(state: &DeckState, deck: DeckKind) -> bool {
    !state.cards.is_empty()
        && state.cursor < state.cards.len()
        && state
            .cards
            .iter()
            .all(|id| card_by_id(id).is_some_and(|c| c.deck == deck))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub card: &'static CardDef,
    pub reshuffled: bool,
    pub repaired: bool,
}

/// Id at the cursor; advances and reshuffles in place on wrap.
fn draw_one<R: Rng + ?Sized>(state: &mut DeckState, rng: &mut R) -> (Option<&'static CardDef>, bool) {
    let card = state.cards.get(state.cursor).and_then(|id| card_by_id(id));
    state.cursor += 1;
    let mut reshuffled = false;
    if state.cursor >= state.cards.len() {
        shuffle_ids(&mut state.cards, rng);
        state.cursor = 0;
        reshuffled = true;
    }
    (card, reshuffled)
}

/// Draws the next card, skipping cards whose minimum round has not been
/// reached. Scans at most one full lap; if every card is gated the card at
/// the original cursor is returned regardless.
pub fn draw_card<R: Rng + ?Sized>(
    state: &mut DeckState,
    deck: DeckKind,
    round: u32,
    rng: &mut R,
) -> Draw {
    let repaired = if is_intact(state, deck) {
        false
    } else {
        *state = shuffled_deck(deck, rng);
        true
    };

    let lap = state.cards.len();
    let mut reshuffled = false;
    let mut first = None;
    for _ in 0..lap {
        let (card, wrapped) = draw_one(state, rng);
        reshuffled |= wrapped;
        let Some(card) = card else { continue };
        first.get_or_insert(card);
        if card.min_round.map_or(true, |min| round >= min) {
            return Draw {
                card,
                reshuffled,
                repaired,
            };
        }
    }

    let fallback = first.unwrap_or(&deck_cards(deck)[0]);
    Draw {
        card: fallback,
        reshuffled,
        repaired,
    }
}
