//! Property tests for card draws and card money.
//!
//! Properties tested:
//! - Drawing a freshly shuffled deck 16 times yields every id exactly once
//! - GainFromEach moves exactly `amount` from each active opponent

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::card_effects::resolve_card;
use crate::domain::cards::{card_by_id, draw_card, shuffled_deck, DeckKind};
use crate::domain::deltas::StateDelta;
use crate::domain::dice::seeded_rng;
use crate::domain::state::EliminationReason;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::playing_room;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_shuffle_then_draw_cycles_every_card(seed in any::<u64>(), luck in any::<bool>()) {
        let deck = if luck { DeckKind::Luck } else { DeckKind::Opportunity };
        let mut rng = seeded_rng(seed);
        let mut state = shuffled_deck(deck, &mut rng);
        let mut seen = HashSet::new();
        // Round 99 lifts every minimum-round gate.
        for _ in 0..16 {
            let draw = draw_card(&mut state, deck, 99, &mut rng);
            prop_assert!(!draw.repaired);
            prop_assert!(seen.insert(draw.card.id));
        }
        prop_assert_eq!(seen.len(), 16);
    }

    #[test]
    fn prop_gain_from_each_is_exact(
        players in 2u8..=4,
        drawer_pick in 0u8..4,
        eliminated_pick in proptest::option::of(0u8..4),
    ) {
        let mut room = playing_room(players);
        let drawer = drawer_pick % players + 1;
        if let Some(e) = eliminated_pick.map(|e| e % players + 1) {
            if e != drawer {
                room.player_mut(e).unwrap().eliminated = Some(EliminationReason::Bankrupt);
            }
        }
        let others = room.active_players().filter(|p| p.slot != drawer).count() as i64;

        let card = card_by_id("L05").unwrap();
        let res = resolve_card(&room, drawer, card, &mut seeded_rng(0));

        let mut balance = std::collections::BTreeMap::new();
        for d in &res.deltas {
            if let StateDelta::Transfer { from, to, amount, .. } = d {
                *balance.entry(*from).or_insert(0i64) -= amount;
                *balance.entry(*to).or_insert(0i64) += amount;
            }
        }
        prop_assert_eq!(balance.get(&drawer).copied().unwrap_or(0), 300 * others);
        for p in room.active_players().filter(|p| p.slot != drawer) {
            prop_assert_eq!(balance.get(&p.slot).copied(), Some(-300));
        }
    }
}
