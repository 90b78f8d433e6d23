use tracing::info;

use super::Flow;
use crate::domain::deltas::MoneyReason;
use crate::domain::events::GameEvent;
use crate::domain::rules::{CellIndex, Money, Slot, NEGOTIATION_COOLDOWN_ROUNDS, NEGOTIATION_MIN_ROUND};
use crate::domain::state::NegotiationOffer;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// `sendNegotiationOffer`: offer `price` for an opponent's cell. Only one
    /// offer may be open per room.
    pub(super) fn send_negotiation_offer(
        &mut self,
        from: Slot,
        cell: CellIndex,
        price: Money,
    ) -> Result<(), DomainError> {
        let round = self.room.round;
        if round < NEGOTIATION_MIN_ROUND {
            return Err(DomainError::validation(
                ValidationKind::NegotiateTooEarly,
                format!("negotiation opens at round {NEGOTIATION_MIN_ROUND}"),
            ));
        }
        if let Some(&until) = self.room.negotiation_cooldowns.get(&from) {
            if round < until {
                return Err(DomainError::validation(
                    ValidationKind::NegotiationCooldown,
                    format!("slot {from} may negotiate again at round {until}"),
                ));
            }
        }
        if self.room.negotiation.is_some() {
            return Err(DomainError::conflict(
                ConflictKind::NegotiationPending,
                "another offer is already open",
            ));
        }
        if price <= 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidSelection,
                "price must be positive",
            ));
        }
        if self.player(from)?.cash < price {
            return Err(DomainError::validation(
                ValidationKind::InsufficientFunds,
                format!("offer of {price} exceeds cash"),
            ));
        }
        let to = self
            .room
            .owner_of(cell)
            .filter(|&owner| owner != from)
            .filter(|&owner| self.room.player(owner).is_some_and(|p| p.is_active()))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::NotOwner,
                    format!("cell {cell} is not owned by an opponent"),
                )
            })?;

        let id = self.room.next_offer_id;
        self.room.next_offer_id += 1;
        self.room.negotiation = Some(NegotiationOffer {
            id,
            from,
            to,
            cell,
            price,
            created_at: self.ctx.now,
        });
        info!(room_id = %self.room.id, offer_id = id, from, to, cell, price, "Negotiation offered");
        self.emit(GameEvent::NegotiationOffered {
            id,
            from,
            to,
            cell,
            price,
        });
        Ok(())
    }

    /// `respondToNegotiation` by the offer's target. Acceptance swaps cash
    /// for the cell in one step; rejection puts the requester on cooldown.
    /// Accepting an offer the requester can no longer honor closes it
    /// unaccepted, without a cooldown.
    pub(super) fn respond_to_negotiation(&mut self, slot: Slot, accept: bool) -> Result<(), DomainError> {
        let offer = self.room.negotiation.clone().ok_or_else(|| {
            DomainError::validation(ValidationKind::NoPendingOffer, "no offer is open")
        })?;
        if offer.to != slot {
            return Err(DomainError::validation(
                ValidationKind::NotOfferTarget,
                format!("offer {} is addressed to slot {}", offer.id, offer.to),
            ));
        }

        if accept {
            let stale = if self.player(offer.from)?.cash < offer.price {
                Some("the requester can no longer pay")
            } else if self.room.owner_of(offer.cell) != Some(offer.to) {
                Some("the cell changed hands")
            } else {
                None
            };
            if let Some(reason) = stale {
                info!(room_id = %self.room.id, offer_id = offer.id, reason, "Negotiation voided");
                self.room.negotiation = None;
                self.emit(GameEvent::NegotiationResolved {
                    id: offer.id,
                    accepted: false,
                });
                return Ok(());
            }
            self.transfer(offer.from, offer.to, offer.price, MoneyReason::Negotiation)?;
            self.transfer_cell(offer.to, offer.from, offer.cell)?;
        } else {
            let until = self.room.round + NEGOTIATION_COOLDOWN_ROUNDS;
            self.room.negotiation_cooldowns.insert(offer.from, until);
        }

        self.room.negotiation = None;
        self.emit(GameEvent::NegotiationResolved {
            id: offer.id,
            accepted: accept,
        });
        Ok(())
    }

    /// Drop an unanswered offer. A no-op when `offer_id` is no longer open.
    pub fn expire_negotiation(&mut self, offer_id: u64) -> Result<(), DomainError> {
        if self.room.negotiation.as_ref().is_some_and(|o| o.id == offer_id) {
            self.room.negotiation = None;
            self.emit(GameEvent::NegotiationExpired { id: offer_id });
        }
        Ok(())
    }
}
