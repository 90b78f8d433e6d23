use crate::domain::abilities::Character;
use crate::domain::economy::{
    asset_value, buyback_price, calculate_rent, check_build_hotel, check_build_house,
    free_upgrade_candidates, go_landing_bonus, net_worth, sell_price_table, sellable_value,
    tax_due,
};
use crate::domain::state::{Festival, FrozenRent};
use crate::domain::test_state_helpers::{give, playing_room, set_cash, with_abilities};
use crate::errors::domain::ValidationKind;

#[test]
fn rent_is_zero_for_unowned_and_self_owned() {
    let mut room = playing_room(2);
    assert_eq!(calculate_rent(&room, 1, 1), 0);
    give(&mut room, 1, 1, 0, false);
    assert_eq!(calculate_rent(&room, 1, 1), 0);
    assert_eq!(calculate_rent(&room, 1, 2), 40);
}

#[test]
fn full_group_doubles_base_rent() {
    let mut room = playing_room(2);
    give(&mut room, 1, 1, 0, false);
    give(&mut room, 1, 3, 0, false);
    assert_eq!(calculate_rent(&room, 1, 2), 80);
    give(&mut room, 1, 3, 3, false);
    assert_eq!(calculate_rent(&room, 3, 2), 1200);
}

#[test]
fn eliminated_owner_and_frozen_cells_collect_nothing() {
    let mut room = playing_room(3);
    give(&mut room, 2, 4, 0, false);
    room.frozen_rent.push(FrozenRent {
        cell: 4,
        remaining_turns: 2,
    });
    assert_eq!(calculate_rent(&room, 4, 1), 0);
    room.frozen_rent.clear();
    assert_eq!(calculate_rent(&room, 4, 1), 60);
    room.player_mut(2).unwrap().eliminated =
        Some(crate::domain::state::EliminationReason::Bankrupt);
    assert_eq!(calculate_rent(&room, 4, 1), 0);
}

#[test]
fn stations_scale_with_count_and_round() {
    let mut room = playing_room(2);
    give(&mut room, 2, 5, 0, false);
    assert_eq!(calculate_rent(&room, 5, 1), 250);
    give(&mut room, 2, 23, 0, false);
    assert_eq!(calculate_rent(&room, 5, 1), 500);
    room.round = 6; // five completed rounds: ×1.40
    assert_eq!(calculate_rent(&room, 23, 1), 700);
}

#[test]
fn double_rent_and_festival_stack() {
    let mut room = playing_room(2);
    give(&mut room, 2, 10, 0, false);
    room.player_mut(2).unwrap().buffs.double_rent_turns = 1;
    assert_eq!(calculate_rent(&room, 10, 1), 160);
    room.festival = Some(Festival {
        owner: 2,
        cell: 10,
        multiplier: 3,
    });
    assert_eq!(calculate_rent(&room, 10, 1), 480);
    room.festival = Some(Festival {
        owner: 1,
        cell: 10,
        multiplier: 3,
    });
    assert_eq!(calculate_rent(&room, 10, 1), 160);
}

#[test]
fn even_build_scenario_two_cell_group() {
    let mut room = playing_room(2);
    give(&mut room, 1, 1, 1, false);
    give(&mut room, 1, 3, 1, false);
    assert_eq!(check_build_house(&room, 1, 1), Ok(400));

    give(&mut room, 1, 3, 0, false);
    let err = check_build_house(&room, 1, 1).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::EvenBuild));
}

#[test]
fn build_requires_full_group_and_ownership() {
    let mut room = playing_room(2);
    give(&mut room, 1, 10, 0, false);
    give(&mut room, 1, 12, 0, false);
    let err = check_build_house(&room, 1, 10).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::GroupIncomplete));

    let err = check_build_house(&room, 1, 13).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotOwner));

    give(&mut room, 1, 5, 0, false);
    let err = check_build_house(&room, 1, 5).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidCell));
}

#[test]
fn hotel_needs_four_houses_everywhere() {
    let mut room = playing_room(2);
    give(&mut room, 1, 34, 4, false);
    give(&mut room, 1, 35, 3, false);
    let err = check_build_hotel(&room, 1, 34).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::EvenBuild));
    let err = check_build_hotel(&room, 1, 35).unwrap_err();
    assert_eq!(
        err.validation_kind(),
        Some(&ValidationKind::HotelRequiresFourHouses)
    );
    let err = check_build_house(&room, 1, 34).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::MaxHouses));

    give(&mut room, 1, 35, 4, false);
    assert_eq!(check_build_hotel(&room, 1, 34), Ok(3000));
    give(&mut room, 1, 34, 0, true);
    // A hotel sibling counts as level 5, so 35 may still convert.
    assert_eq!(check_build_hotel(&room, 1, 35), Ok(3000));
}

#[test]
fn net_worth_and_sellable_value() {
    let mut room = playing_room(2);
    set_cash(&mut room, 1, 1_000);
    give(&mut room, 1, 19, 0, true); // 1400 + 2200
    give(&mut room, 1, 21, 2, false); // 1400 + 2×800
    let p = room.player(1).unwrap();
    assert_eq!(net_worth(p), 1_000 + 3_600 + 3_000);
    assert_eq!(sellable_value(&room, 1), 6_600);
    let table = sell_price_table(&room, 1);
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].hotel, 2_200);
}

#[test]
fn magnate_sells_for_ten_percent_more() {
    let mut room = with_abilities(playing_room(2));
    room.player_mut(1).unwrap().character = Character::Magnate;
    give(&mut room, 1, 1, 0, false);
    assert_eq!(sellable_value(&room, 1), 660);
}

#[test]
fn buyback_is_ceil_of_110_percent() {
    let mut room = playing_room(2);
    give(&mut room, 2, 4, 1, false); // 800 + 400
    assert_eq!(asset_value(&room, 4), 1_200);
    assert_eq!(buyback_price(&room, 4, 1), 1_320);

    give(&mut room, 2, 11, 0, false);
    room.round = 2;
    // 250 × 1.08 = 270, ×1.1 = 297
    assert_eq!(buyback_price(&room, 11, 1), 297);
}

#[test]
fn tax_has_a_floor_and_mayor_halves_it() {
    let mut room = playing_room(2);
    set_cash(&mut room, 1, 2_000);
    assert_eq!(tax_due(&room, 1), 500);
    set_cash(&mut room, 1, 20_000);
    assert_eq!(tax_due(&room, 1), 2_000);

    let mut room = with_abilities(room);
    room.player_mut(1).unwrap().character = Character::Mayor;
    assert_eq!(tax_due(&room, 1), 1_000);
}

#[test]
fn go_bonus_decays_with_rounds() {
    assert_eq!(go_landing_bonus(1), 1_000);
    assert_eq!(go_landing_bonus(2), 926);
}

#[test]
fn free_upgrade_candidates_follow_build_rules() {
    let mut room = playing_room(2);
    give(&mut room, 1, 1, 1, false);
    give(&mut room, 1, 3, 0, false);
    give(&mut room, 1, 4, 0, false);
    assert_eq!(free_upgrade_candidates(&room, 1), vec![3]);
}
