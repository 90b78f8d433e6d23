use rand::Rng;

use super::Flow;
use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::board::{cell_at, owns_full_group};
use crate::domain::cards::shuffled_deck;
use crate::domain::deltas::{BuffChange, MoneyReason, StateDelta};
use crate::domain::events::GameEvent;
use crate::domain::rules::{
    CellIndex, Money, Slot, FESTIVAL_BASE_MULTIPLIER, FESTIVAL_MAX_MULTIPLIER,
};
use crate::domain::state::{Festival, FrozenRent, Holding};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    pub(super) fn apply_deltas(&mut self, deltas: Vec<StateDelta>) -> Result<(), DomainError> {
        for delta in deltas {
            self.apply_delta(delta)?;
        }
        Ok(())
    }

    fn apply_delta(&mut self, delta: StateDelta) -> Result<(), DomainError> {
        match delta {
            StateDelta::Credit {
                slot,
                amount,
                reason,
            } => self.credit(slot, amount, reason),
            StateDelta::Debit {
                slot,
                amount,
                reason,
            } => self.debit(slot, amount, reason),
            StateDelta::Transfer {
                from,
                to,
                amount,
                reason,
            } => self.transfer(from, to, amount, reason),
            StateDelta::Teleport { slot, cell } => self.teleport(slot, cell),
            StateDelta::SwapPositions { a, b } => {
                let pa = self.player(a)?.position;
                let pb = self.player(b)?.position;
                self.teleport(a, pb)?;
                self.teleport(b, pa)
            }
            StateDelta::TransferCell { from, to, cell } => self.transfer_cell(from, to, cell),
            StateDelta::SetBuilding { cell, houses, hotel } => {
                let (owner, _) = self.room.holding(cell).ok_or_else(|| {
                    DomainError::validation(ValidationKind::NotOwner, format!("cell {cell} is unowned"))
                })?;
                self.player_mut(owner)?
                    .holdings
                    .insert(cell, Holding { houses, hotel });
                self.emit(GameEvent::BuildingChanged { cell, houses, hotel });
                Ok(())
            }
            StateDelta::SetBuff { slot, change } => {
                let buffs = &mut self.player_mut(slot)?.buffs;
                match change {
                    BuffChange::SkipNextTurn => buffs.skip_next_turn = true,
                    BuffChange::RentImmunity => buffs.rent_immunity = true,
                    BuffChange::DoubleRent { turns } => {
                        buffs.double_rent_turns = buffs.double_rent_turns.max(turns)
                    }
                    BuffChange::BlockBuying { turns } => {
                        buffs.buy_blocked_turns = buffs.buy_blocked_turns.max(turns)
                    }
                }
                self.emit(GameEvent::BuffApplied { slot, change });
                Ok(())
            }
            StateDelta::HoldCard { slot, card } => {
                self.player_mut(slot)?.held_cards.push(card.clone());
                self.emit(GameEvent::CardHeld { slot, card });
                Ok(())
            }
            StateDelta::FreezeRent { cell, turns } => {
                self.room.frozen_rent.retain(|f| f.cell != cell);
                self.room.frozen_rent.push(FrozenRent {
                    cell,
                    remaining_turns: turns,
                });
                self.emit(GameEvent::RentFrozen { cell, turns });
                Ok(())
            }
            StateDelta::ApplyFestival { slot, cell } => self.apply_festival(slot, cell),
            StateDelta::ReshuffleDeck { deck } => {
                let fresh = shuffled_deck(deck, self.ctx.rng);
                *self.room.decks.get_mut(deck) = fresh;
                self.emit(GameEvent::DeckReshuffled { deck });
                Ok(())
            }
        }
    }

    pub(super) fn credit(&mut self, slot: Slot, amount: Money, reason: MoneyReason) -> Result<(), DomainError> {
        self.adjust_cash(slot, amount, reason)
    }

    pub(super) fn debit(&mut self, slot: Slot, amount: Money, reason: MoneyReason) -> Result<(), DomainError> {
        self.adjust_cash(slot, -amount, reason)
    }

    fn adjust_cash(&mut self, slot: Slot, delta: Money, reason: MoneyReason) -> Result<(), DomainError> {
        if delta == 0 {
            return Ok(());
        }
        let player = self.player_mut(slot)?;
        player.cash += delta;
        let balance = player.cash;
        self.emit(GameEvent::MoneyChanged {
            slot,
            delta,
            balance,
            reason,
        });
        Ok(())
    }

    pub(super) fn transfer(
        &mut self,
        from: Slot,
        to: Slot,
        amount: Money,
        reason: MoneyReason,
    ) -> Result<(), DomainError> {
        self.debit(from, amount, reason)?;
        self.credit(to, amount, reason)
    }

    /// Move a cell and its buildings. Markers owned by the old owner on that
    /// cell go with the old owner.
    ///
    /// Houses keep their rent tier and sale value for the new owner even when
    /// the rest of the group belongs to someone else; building further on the
    /// group still requires owning all of it.
    pub(super) fn transfer_cell(&mut self, from: Slot, to: Slot, cell: CellIndex) -> Result<(), DomainError> {
        let holding = self.player_mut(from)?.holdings.remove(&cell).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NotOwner,
                format!("slot {from} does not own cell {cell}"),
            )
        })?;
        self.player_mut(to)?.holdings.insert(cell, holding);
        if self.room.festival.is_some_and(|f| f.cell == cell) {
            self.room.festival = None;
        }
        self.emit(GameEvent::CellTransferred { from, to, cell });
        self.note_group_completion(to, cell);
        Ok(())
    }

    pub(super) fn note_group_completion(&mut self, slot: Slot, cell: CellIndex) {
        let Some(group) = cell_at(cell).and_then(|d| d.group()) else {
            return;
        };
        let complete = self
            .room
            .player(slot)
            .is_some_and(|p| owns_full_group(group, |c| p.owns(c)));
        if complete {
            self.emit(GameEvent::GroupCompleted { slot, group });
        }
    }

    /// Hold a festival on `cell`. Re-hosting on the same cell raises the
    /// multiplier; moving it elsewhere starts over.
    pub(super) fn apply_festival(&mut self, slot: Slot, cell: CellIndex) -> Result<(), DomainError> {
        let base = match self.room.festival {
            Some(f) if f.cell == cell && f.owner == slot => f.multiplier + 1,
            _ => FESTIVAL_BASE_MULTIPLIER,
        };
        let boosted = apply_passive(
            self.room,
            slot,
            PassiveHook::FestivalMultiplier,
            Money::from(base),
        );
        let multiplier = u8::try_from(boosted)
            .unwrap_or(FESTIVAL_MAX_MULTIPLIER)
            .clamp(FESTIVAL_BASE_MULTIPLIER, FESTIVAL_MAX_MULTIPLIER);
        self.room.festival = Some(Festival {
            owner: slot,
            cell,
            multiplier,
        });
        self.emit(GameEvent::FestivalApplied {
            slot,
            cell,
            multiplier,
        });
        Ok(())
    }

    /// Index into `items` from the room rng.
    pub(super) fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let i = self.ctx.rng.random_range(0..items.len());
        items.get(i).copied()
    }
}
