//! Timers owned by one room actor.
//!
//! A timer is a spawned sleep that posts a `TimerFired` back into the
//! actor's inbox through a weak sender, so a dropped room never keeps its
//! timers' targets alive. Every message carries the generation (phase
//! sequence, offer id, or connection epoch) it was armed for; the actor
//! ignores messages whose generation has moved on.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::WeakSender;
use tokio::task::AbortHandle;
use tracing::trace;

use super::commands::RoomCommand;
use crate::domain::rules::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Phase,
    Watchdog,
    Negotiation(u64),
    Disconnect(Slot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFired {
    Phase { generation: u64 },
    Watchdog { generation: u64 },
    Negotiation { offer_id: u64 },
    Disconnect { slot: Slot, epoch: u64 },
}

impl TimerFired {
    pub fn key(&self) -> TimerKey {
        match *self {
            TimerFired::Phase { .. } => TimerKey::Phase,
            TimerFired::Watchdog { .. } => TimerKey::Watchdog,
            TimerFired::Negotiation { offer_id } => TimerKey::Negotiation(offer_id),
            TimerFired::Disconnect { slot, .. } => TimerKey::Disconnect(slot),
        }
    }
}

pub(super) struct RoomTimers {
    inbox: WeakSender<RoomCommand>,
    handles: HashMap<TimerKey, AbortHandle>,
}

impl RoomTimers {
    pub(super) fn new(inbox: WeakSender<RoomCommand>) -> Self {
        Self {
            inbox,
            handles: HashMap::new(),
        }
    }

    /// Arm `fired` after `delay`, replacing any timer with the same key.
    pub(super) fn arm(&mut self, fired: TimerFired, delay: Duration) {
        let key = fired.key();
        self.cancel(key);
        trace!(?key, delay_ms = delay.as_millis() as u64, "Timer armed");

        let inbox = self.inbox.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inbox) = inbox.upgrade() {
                let _ = inbox.send(RoomCommand::Timer(fired)).await;
            }
        });
        self.handles.insert(key, task.abort_handle());
    }

    pub(super) fn cancel(&mut self, key: TimerKey) {
        if let Some(handle) = self.handles.remove(&key) {
            handle.abort();
        }
    }

    pub(super) fn cancel_where(&mut self, mut pred: impl FnMut(&TimerKey) -> bool) {
        self.handles.retain(|key, handle| {
            if pred(key) {
                handle.abort();
                false
            } else {
                true
            }
        });
    }

    pub(super) fn cancel_all(&mut self) {
        self.cancel_where(|_| true);
    }

    /// Armed and not yet fired.
    pub(super) fn is_pending(&self, key: TimerKey) -> bool {
        self.handles.get(&key).is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RoomTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
