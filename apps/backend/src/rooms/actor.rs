use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::broadcast::EventBatch;
use super::commands::{Ack, Presence, RoomCommand};
use super::handle::RoomHandle;
use super::registry::RoomRuntime;
use super::timers::{RoomTimers, TimerFired, TimerKey};
use crate::domain::dice::{seeded_rng, Dice, DiceOverrides};
use crate::domain::rules::Slot;
use crate::domain::snapshot::snapshot;
use crate::domain::state::{PlayerIdentity, Room, RoomStatus};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::rooms::RoomRepo;
use crate::services::game_flow::{
    phase_deadline, Flow, FlowCtx, GameFlowService, MutationResult,
};

const INBOX_CAPACITY: usize = 64;

#[derive(Debug, Default, Clone, Copy)]
struct Connections {
    open: u32,
    epoch: u64,
}

pub(super) struct RoomActor {
    room: Room,
    runtime: RoomRuntime,
    dice: Box<dyn Dice>,
    overrides: DiceOverrides,
    rng: ChaCha20Rng,
    timers: RoomTimers,
    /// Generation the phase timers were last armed for.
    armed_generation: Option<u64>,
    connections: BTreeMap<Slot, Connections>,
}

/// Start an actor owning `room` and return its address.
pub(super) fn spawn_room(room: Room, runtime: &RoomRuntime) -> RoomHandle {
    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let rng = match runtime.rng_seed {
        Some(seed) => seeded_rng(seed),
        None => ChaCha20Rng::from_os_rng(),
    };
    let handle = RoomHandle::new(room.id.clone(), tx.clone());
    let actor = RoomActor {
        room,
        runtime: runtime.clone(),
        dice: (runtime.dice)(),
        overrides: DiceOverrides::default(),
        rng,
        timers: RoomTimers::new(tx.downgrade()),
        armed_generation: None,
        connections: BTreeMap::new(),
    };
    drop(tx);
    tokio::spawn(actor.run(rx));
    handle
}

impl RoomActor {
    async fn run(mut self, mut inbox: mpsc::Receiver<RoomCommand>) {
        info!(room_id = %self.room.id, status = self.room.status.as_str(), "Room actor started");
        self.rearm_timers();
        while let Some(command) = inbox.recv().await {
            self.handle(command).await;
        }
        self.timers.cancel_all();
        info!(room_id = %self.room.id, "Room actor stopped");
    }

    async fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Act {
                identity,
                action,
                expected_version,
                reply,
            } => {
                let result = match self.slot_of(&identity) {
                    Ok(slot) => self
                        .mutate(expected_version, |flow| flow.act(slot, action))
                        .await
                        .map(|version| Ack { version, slot }),
                    Err(err) => Err(err),
                };
                if let Err(err) = &result {
                    debug!(room_id = %self.room.id, error = %err, "Action rejected");
                }
                let _ = reply.send(result);
            }
            RoomCommand::Join { identity, reply } => {
                let joined = identity.clone();
                let result = match self.mutate(None, |flow| flow.join(joined)).await {
                    Ok(version) => self.slot_of(&identity).map(|slot| Ack { version, slot }),
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            RoomCommand::SelectCharacter {
                identity,
                character,
                reply,
            } => {
                let result = self
                    .seated(&identity, |flow, slot| flow.select_character(slot, character))
                    .await;
                let _ = reply.send(result);
            }
            RoomCommand::Leave { identity, reply } => {
                let result = self.seated(&identity, |flow, slot| flow.leave(slot)).await;
                if let Ok(ack) = &result {
                    if self.room.player(ack.slot).is_none() {
                        self.connections.remove(&ack.slot);
                        self.timers.cancel(TimerKey::Disconnect(ack.slot));
                    }
                }
                let _ = reply.send(result);
            }
            RoomCommand::Start { identity, reply } => {
                let result = self.seated(&identity, |flow, slot| flow.start(slot)).await;
                let _ = reply.send(result);
            }
            RoomCommand::PinDice { slot, roll, reply } => {
                let result = match self.room.player(slot) {
                    Some(_) => {
                        info!(room_id = %self.room.id, slot, d1 = roll.d1, d2 = roll.d2, "Dice pinned");
                        self.overrides.pin(slot, roll);
                        Ok(())
                    }
                    None => Err(DomainError::not_found(
                        NotFoundKind::Player,
                        format!("no player in slot {slot}"),
                    )),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(snapshot(&self.room)));
            }
            RoomCommand::Document { reply } => {
                let _ = reply.send(Ok(self.room.clone()));
            }
            RoomCommand::Connect { identity, reply } => {
                let result = self.connect(&identity).await;
                let _ = reply.send(result);
            }
            RoomCommand::Disconnect { slot } => self.disconnect(slot).await,
            RoomCommand::Timer(fired) => self.on_timer(fired).await,
        }
    }

    fn slot_of(&self, identity: &PlayerIdentity) -> Result<Slot, DomainError> {
        self.room
            .player_by_identity(identity)
            .map(|p| p.slot)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::NotAMember,
                    "caller is not seated in this room",
                )
            })
    }

    /// Resolve the caller's slot, then run a mutation on their behalf.
    async fn seated<F>(&mut self, identity: &PlayerIdentity, mutation: F) -> Result<Ack, DomainError>
    where
        F: FnOnce(&mut Flow<'_, '_>, Slot) -> Result<(), DomainError>,
    {
        let slot = self.slot_of(identity)?;
        let version = self.mutate(None, |flow| mutation(flow, slot)).await?;
        Ok(Ack { version, slot })
    }

    /// Run one orchestrator mutation and commit it. Returns the version the
    /// room is at afterwards.
    async fn mutate<F>(&mut self, expected_version: Option<i32>, mutation: F) -> Result<i32, DomainError>
    where
        F: FnOnce(&mut Flow<'_, '_>) -> Result<(), DomainError>,
    {
        let result = {
            let mut ctx = FlowCtx {
                dice: &mut *self.dice,
                overrides: &mut self.overrides,
                rng: &mut self.rng,
                now: OffsetDateTime::now_utc(),
            };
            GameFlowService.run_mutation(&self.room, expected_version, &mut ctx, mutation)?
        };
        if self.is_noop(&result) {
            return Ok(self.room.version);
        }
        self.commit(result).await
    }

    fn is_noop(&self, result: &MutationResult) -> bool {
        if !result.events.is_empty() {
            return false;
        }
        let mut candidate = result.room.clone();
        candidate.version = self.room.version;
        candidate.updated_at = self.room.updated_at;
        candidate == self.room
    }

    async fn commit(&mut self, result: MutationResult) -> Result<i32, DomainError> {
        match persist(self.runtime.repo.as_ref(), &result.room).await {
            Ok(()) => {
                let version = result.final_version();
                self.install(result);
                Ok(version)
            }
            Err(err) => {
                error!(room_id = %self.room.id, error = %err, "Room save failed after retry");
                self.recover_from_failed_save().await;
                Err(err)
            }
        }
    }

    /// Replace the authoritative room, publish, and re-arm timers.
    fn install(&mut self, result: MutationResult) {
        self.room = result.room;
        self.runtime.broadcaster.publish(Arc::new(EventBatch {
            room_id: self.room.id.to_string(),
            version: self.room.version,
            events: result.events,
            snapshot: snapshot(&self.room),
        }));
        self.rearm_timers();
    }

    /// The failed mutation is dropped. A game in progress is pushed to the
    /// next turn from the last committed state so nobody waits on a save
    /// that may never succeed.
    async fn recover_from_failed_save(&mut self) {
        if self.room.status != RoomStatus::Playing {
            return;
        }
        let forced = {
            let mut ctx = FlowCtx {
                dice: &mut *self.dice,
                overrides: &mut self.overrides,
                rng: &mut self.rng,
                now: OffsetDateTime::now_utc(),
            };
            GameFlowService.run_mutation(&self.room, None, &mut ctx, |flow| flow.force_end_turn())
        };
        match forced {
            Ok(result) => match persist(self.runtime.repo.as_ref(), &result.room).await {
                Ok(()) => {
                    warn!(room_id = %self.room.id, slot = self.room.current_slot, "Turn forced after failed save");
                    self.install(result);
                }
                Err(err) => {
                    error!(room_id = %self.room.id, error = %err, "Forced turn could not be saved");
                    self.arm_watchdog_now();
                }
            },
            Err(err) => {
                error!(room_id = %self.room.id, error = %err, "Could not force the turn forward");
                self.arm_watchdog_now();
            }
        }
    }

    fn arm_watchdog_now(&mut self) {
        self.timers.arm(
            TimerFired::Watchdog {
                generation: self.room.phase_seq,
            },
            self.runtime.durations.watchdog_grace,
        );
    }

    fn rearm_timers(&mut self) {
        if self.room.status.is_terminal() {
            self.timers.cancel_all();
            self.armed_generation = None;
            return;
        }

        let generation = self.room.phase_seq;
        if self.armed_generation != Some(generation) {
            self.timers.cancel(TimerKey::Phase);
            self.timers.cancel(TimerKey::Watchdog);
            if let Some(deadline) = phase_deadline(&self.room, &self.runtime.durations) {
                self.timers.arm(TimerFired::Phase { generation }, deadline);
                self.timers.arm(
                    TimerFired::Watchdog { generation },
                    deadline + self.runtime.durations.watchdog_grace,
                );
                debug!(
                    room_id = %self.room.id,
                    phase = self.room.phase.name(),
                    generation,
                    deadline_ms = deadline.as_millis() as u64,
                    "Phase timers armed"
                );
            }
            self.armed_generation = Some(generation);
        }

        match self.room.negotiation.as_ref().map(|o| o.id) {
            Some(offer_id) => {
                self.timers
                    .cancel_where(|k| matches!(k, TimerKey::Negotiation(id) if *id != offer_id));
                if !self.timers.is_pending(TimerKey::Negotiation(offer_id)) {
                    self.timers.arm(
                        TimerFired::Negotiation { offer_id },
                        self.runtime.durations.negotiation,
                    );
                }
            }
            None => self
                .timers
                .cancel_where(|k| matches!(k, TimerKey::Negotiation(_))),
        }
    }

    async fn on_timer(&mut self, fired: TimerFired) {
        match fired {
            TimerFired::Phase { generation } => {
                if generation != self.room.phase_seq {
                    debug!(room_id = %self.room.id, generation, "Stale phase timer ignored");
                    return;
                }
                self.apply_timeout(generation).await;
            }
            TimerFired::Watchdog { generation } => {
                if generation != self.room.phase_seq {
                    return;
                }
                warn!(
                    room_id = %self.room.id,
                    phase = self.room.phase.name(),
                    generation,
                    "Watchdog fired with phase unchanged"
                );
                self.armed_generation = None;
                self.apply_timeout(generation).await;
            }
            TimerFired::Negotiation { offer_id } => {
                if let Err(err) = self
                    .mutate(None, |flow| flow.expire_negotiation(offer_id))
                    .await
                {
                    warn!(room_id = %self.room.id, offer_id, error = %err, "Offer expiry failed");
                }
            }
            TimerFired::Disconnect { slot, epoch } => {
                let still_gone = self
                    .connections
                    .get(&slot)
                    .map_or(true, |c| c.open == 0 && c.epoch == epoch);
                if !still_gone {
                    return;
                }
                info!(room_id = %self.room.id, slot, "Disconnect grace expired");
                if let Err(err) = self.mutate(None, |flow| flow.expire_disconnect(slot)).await {
                    warn!(room_id = %self.room.id, slot, error = %err, "Disconnect expiry failed");
                }
                if self.room.player(slot).is_none() {
                    self.connections.remove(&slot);
                }
            }
        }
    }

    /// Apply the phase default; if the default itself fails, force the turn.
    async fn apply_timeout(&mut self, generation: u64) {
        let err = match self.mutate(None, |flow| flow.apply_timeout(generation)).await {
            Ok(_) => return,
            Err(err) => err,
        };
        if err.is_infra() {
            // The failed save already forced the turn.
            return;
        }
        warn!(room_id = %self.room.id, error = %err, "Timeout default failed; forcing turn");
        if let Err(err) = self.mutate(None, |flow| flow.force_end_turn()).await {
            error!(room_id = %self.room.id, error = %err, "Forced turn failed");
            self.arm_watchdog_now();
        }
    }

    async fn connect(&mut self, identity: &PlayerIdentity) -> Result<Presence, DomainError> {
        let Ok(slot) = self.slot_of(identity) else {
            return Ok(Presence { slot: None });
        };
        let entry = self.connections.entry(slot).or_default();
        entry.open += 1;
        entry.epoch += 1;
        self.timers.cancel(TimerKey::Disconnect(slot));
        debug!(room_id = %self.room.id, slot, "Connection opened");

        self.mutate(None, |flow| flow.set_presence(slot, true)).await?;
        Ok(Presence { slot: Some(slot) })
    }

    async fn disconnect(&mut self, slot: Slot) {
        let Some(entry) = self.connections.get_mut(&slot) else {
            return;
        };
        entry.open = entry.open.saturating_sub(1);
        if entry.open > 0 {
            return;
        }
        let epoch = entry.epoch;
        debug!(room_id = %self.room.id, slot, "Last connection closed");

        if self.room.status.is_terminal() || self.room.player(slot).is_none() {
            return;
        }
        if let Err(err) = self.mutate(None, |flow| flow.set_presence(slot, false)).await {
            warn!(room_id = %self.room.id, slot, error = %err, "Presence update failed");
        }
        self.timers.arm(
            TimerFired::Disconnect { slot, epoch },
            self.runtime.durations.disconnect_grace,
        );
    }
}

/// Save, retrying once.
async fn persist(repo: &dyn RoomRepo, room: &Room) -> Result<(), DomainError> {
    match repo.save(room).await {
        Ok(()) => Ok(()),
        Err(first) => {
            warn!(room_id = %room.id, error = %first, "Room save failed; retrying");
            repo.save(room).await
        }
    }
}
