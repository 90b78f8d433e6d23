use tracing::info;

use super::Flow;
use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::actions::SellSelection;
use crate::domain::board::{cell_at, CellKind};
use crate::domain::cards::{card_by_id, CardEffect};
use crate::domain::deltas::MoneyReason;
use crate::domain::economy::{buyback_price, calculate_rent, sell_price, sell_price_table, sellable_value};
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Money, Slot};
use crate::domain::state::{EliminationReason, Holding, RoomStatus};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// Charge rent for landing on `owner`'s cell, then offer a buyback.
    pub(super) fn charge_rent(&mut self, payer: Slot, owner: Slot, cell: CellIndex) -> Result<(), DomainError> {
        let rent = calculate_rent(self.room, cell, payer);
        if rent == 0 {
            return self.finish_step();
        }

        if self.player(payer)?.buffs.rent_immunity {
            self.player_mut(payer)?.buffs.rent_immunity = false;
            self.emit(GameEvent::RentWaived { slot: payer, cell });
            return self.finish_step();
        }
        if let Some(shield) = self.held_card_with(payer, CardEffect::RentShield) {
            self.player_mut(payer)?.take_card(&shield);
            self.emit(GameEvent::CardUsed {
                slot: payer,
                card: shield,
            });
            self.emit(GameEvent::RentWaived { slot: payer, cell });
            return self.finish_step();
        }

        let paid = apply_passive(self.room, payer, PassiveHook::RentPaid, rent);
        let mut collected = apply_passive(self.room, owner, PassiveHook::RentCollected, paid);
        if cell_at(cell).is_some_and(|d| d.kind == CellKind::Station) {
            collected = apply_passive(self.room, owner, PassiveHook::StationRentCollected, collected);
        }
        self.debit(payer, paid, MoneyReason::Rent)?;
        self.credit(owner, collected, MoneyReason::Rent)?;
        self.emit(GameEvent::RentPaid {
            payer,
            owner,
            cell,
            amount: paid,
        });

        if self.settle_insolvency()? {
            return Ok(());
        }
        self.offer_buyback(payer, cell)
    }

    fn offer_buyback(&mut self, payer: Slot, cell: CellIndex) -> Result<(), DomainError> {
        let Some((owner, holding)) = self.room.holding(cell) else {
            return self.finish_step();
        };
        let player = self.player(payer)?;
        if owner == payer || holding.hotel || player.buffs.buying_blocked() {
            return self.finish_step();
        }
        let price = buyback_price(self.room, cell, payer);
        if price > player.cash {
            return self.finish_step();
        }
        self.emit(GameEvent::BuybackOffered {
            slot: payer,
            cell,
            price,
        });
        self.await_phase(Phase::AwaitingBuyback { cell, price })
    }

    /// `respondToBuyback`.
    pub(super) fn respond_to_buyback(&mut self, accept: bool) -> Result<(), DomainError> {
        let Phase::AwaitingBuyback { cell, price } = self.room.phase else {
            return Err(phase_mismatch("no buyback is pending"));
        };
        let slot = self.room.current_slot;
        if accept {
            if self.player(slot)?.cash < price {
                return Err(DomainError::validation(
                    ValidationKind::InsufficientFunds,
                    format!("buyback costs {price}"),
                ));
            }
            let Some((owner, _)) = self.room.holding(cell) else {
                return Err(DomainError::validation(
                    ValidationKind::InvalidCell,
                    format!("cell {cell} is no longer owned"),
                ));
            };
            self.transfer(slot, owner, price, MoneyReason::Buyback)?;
            self.transfer_cell(owner, slot, cell)?;
        }
        self.emit(GameEvent::BuybackResolved {
            slot,
            cell,
            accepted: accept,
        });
        self.finish_step()
    }

    /// After any payment by the current player: settle debts, else move on.
    pub(super) fn after_payment(&mut self) -> Result<(), DomainError> {
        if self.settle_insolvency()? {
            return Ok(());
        }
        self.finish_step()
    }

    /// Resolve negative balances. Other players in debt go bankrupt at once;
    /// the current player gets a sell phase when selling can cover the
    /// deficit. Returns true when the flow was taken over.
    pub(super) fn settle_insolvency(&mut self) -> Result<bool, DomainError> {
        let current = self.room.current_slot;
        let debtors: Vec<Slot> = self
            .room
            .active_players()
            .filter(|p| p.slot != current && p.cash < 0)
            .map(|p| p.slot)
            .collect();
        for slot in debtors {
            self.bankrupt(slot)?;
        }
        if self.room.status != RoomStatus::Playing {
            return Ok(true);
        }

        let cash = self.player(current)?.cash;
        if cash >= 0 {
            return Ok(false);
        }
        let deficit = -cash;
        if sellable_value(self.room, current) >= deficit {
            let prices = sell_price_table(self.room, current);
            self.emit(GameEvent::LiquidationStarted {
                slot: current,
                deficit,
                prices,
            });
            self.await_phase(Phase::AwaitingSell)?;
        } else {
            self.bankrupt(current)?;
        }
        Ok(true)
    }

    /// `sellAssets`: sell a batch, leaving the sell phase once solvent.
    pub(super) fn sell_assets(&mut self, selections: &[SellSelection]) -> Result<(), DomainError> {
        if selections.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidSelection,
                "nothing selected",
            ));
        }
        let slot = self.room.current_slot;
        let mut proceeds = 0;
        for selection in selections {
            proceeds += self.sell_one(slot, *selection)?;
        }
        self.credit(slot, proceeds, MoneyReason::Sale)?;
        self.emit(GameEvent::AssetsSold { slot, proceeds });

        if self.player(slot)?.cash >= 0 {
            self.leave_sell_phase(slot)
        } else {
            Ok(())
        }
    }

    /// Solvent again: finish a move the debt interrupted, else the step.
    fn leave_sell_phase(&mut self, slot: Slot) -> Result<(), DomainError> {
        match self.room.turn.pending_walk.take() {
            Some(steps) => {
                self.walk(slot, steps)?;
                self.resolve_landing(slot, 0)
            }
            None => self.finish_step(),
        }
    }

    fn sell_one(&mut self, slot: Slot, selection: SellSelection) -> Result<Money, DomainError> {
        let cell = selection.cell();
        let holding = *self.player(slot)?.holdings.get(&cell).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidSelection,
                format!("cell {cell} is not yours to sell"),
            )
        })?;
        let price = sell_price(self.room, slot, cell, &holding);

        let (value, after) = match selection {
            SellSelection::House { .. } if holding.houses > 0 && !holding.hotel => (
                price.house,
                Some(Holding {
                    houses: holding.houses - 1,
                    hotel: false,
                }),
            ),
            SellSelection::Hotel { .. } if holding.hotel => (price.hotel, Some(Holding::default())),
            SellSelection::Property { .. } => (price.total, None),
            _ => {
                return Err(DomainError::validation(
                    ValidationKind::InvalidSelection,
                    format!("nothing of that kind on cell {cell}"),
                ))
            }
        };

        match after {
            Some(h) => {
                self.player_mut(slot)?.holdings.insert(cell, h);
                self.emit(GameEvent::BuildingChanged {
                    cell,
                    houses: h.houses,
                    hotel: h.hotel,
                });
            }
            None => {
                self.player_mut(slot)?.holdings.remove(&cell);
                self.clear_cell_markers(cell);
                self.emit(GameEvent::BuildingChanged {
                    cell,
                    houses: 0,
                    hotel: false,
                });
            }
        }
        Ok(value)
    }

    /// Sell-phase timeout: sell buildings first, then land, until solvent;
    /// bankrupt if that is still not enough.
    pub(super) fn auto_liquidate(&mut self) -> Result<(), DomainError> {
        let slot = self.room.current_slot;
        let mut proceeds = 0;

        while self.player(slot)?.cash + proceeds < 0 {
            let next = self
                .player(slot)?
                .holdings
                .iter()
                .find_map(|(&cell, h)| {
                    if h.hotel {
                        Some(SellSelection::Hotel { cell })
                    } else if h.houses > 0 {
                        Some(SellSelection::House { cell })
                    } else {
                        None
                    }
                })
                .or_else(|| {
                    self.room
                        .player(slot)
                        .and_then(|p| p.holdings.keys().next().copied())
                        .map(|cell| SellSelection::Property { cell })
                });
            let Some(selection) = next else { break };
            proceeds += self.sell_one(slot, selection)?;
        }

        if proceeds > 0 {
            self.credit(slot, proceeds, MoneyReason::Sale)?;
            self.emit(GameEvent::AssetsSold { slot, proceeds });
        }
        if self.player(slot)?.cash < 0 {
            return self.bankrupt(slot);
        }
        self.leave_sell_phase(slot)
    }

    pub(super) fn bankrupt(&mut self, slot: Slot) -> Result<(), DomainError> {
        self.eliminate(slot, EliminationReason::Bankrupt)
    }

    /// Remove a player from play. Their assets return to the bank and any
    /// markers or offers involving them are dropped.
    pub(super) fn eliminate(&mut self, slot: Slot, reason: EliminationReason) -> Result<(), DomainError> {
        let player = self.player_mut(slot)?;
        if !player.is_active() {
            return Ok(());
        }
        player.eliminated = Some(reason);
        player.cash = player.cash.max(0);
        player.held_cards.clear();
        player.island_turns = 0;
        let cells: Vec<CellIndex> = std::mem::take(&mut player.holdings).into_keys().collect();
        for cell in cells {
            self.clear_cell_markers(cell);
        }
        if self.room.festival.is_some_and(|f| f.owner == slot) {
            self.room.festival = None;
        }
        let involved = self
            .room
            .negotiation
            .as_ref()
            .is_some_and(|o| o.from == slot || o.to == slot);
        if involved {
            if let Some(offer) = self.room.negotiation.take() {
                self.emit(GameEvent::NegotiationResolved {
                    id: offer.id,
                    accepted: false,
                });
            }
        }
        info!(room_id = %self.room.id, slot, ?reason, "Player eliminated");
        self.emit(GameEvent::PlayerEliminated { slot, reason });

        if self.check_game_end() {
            return Ok(());
        }
        if slot == self.room.current_slot {
            self.advance_turn()?;
        }
        Ok(())
    }

    fn clear_cell_markers(&mut self, cell: CellIndex) {
        if self.room.festival.is_some_and(|f| f.cell == cell) {
            self.room.festival = None;
        }
        self.room.frozen_rent.retain(|f| f.cell != cell);
    }

    /// Id of a held card with the given effect.
    pub(super) fn held_card_with(&self, slot: Slot, effect: CardEffect) -> Option<String> {
        self.room.player(slot)?.held_cards.iter().find_map(|id| {
            card_by_id(id)
                .filter(|c| c.effect == effect)
                .map(|c| c.id.to_string())
        })
    }
}

pub(super) fn phase_mismatch(detail: &str) -> DomainError {
    DomainError::validation(ValidationKind::PhaseMismatch, detail)
}
