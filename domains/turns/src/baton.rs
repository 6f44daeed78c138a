//! Per-session turn slots
//!
//! Each session id maps to its own async mutex. Holding the guard is holding
//! the baton: the session is `Locked` until the guard drops, on every exit
//! path. Waiters are admitted in arrival order because tokio's mutex is fair.
//! There is no global lock, so sessions never wait on each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::state::{TurnEvent, TurnState, TurnStateMachine};
use parley_common::{Error, Result};

#[derive(Default)]
struct BatonSlot {
    lock: Arc<Mutex<()>>,
    waiting: AtomicUsize,
}

/// Counts a waiter for as long as it is queued, including if it gives up
struct Waiting<'a>(&'a AtomicUsize);

impl<'a> Waiting<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Proof that the holder owns a session's turn slot
pub struct BatonGuard {
    session_id: String,
    state: TurnState,
    acquired_at: Instant,
    _permit: OwnedMutexGuard<()>,
}

impl BatonGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }
}

impl Drop for BatonGuard {
    #[mutants::skip] // Bookkeeping only; the permit is released when it drops regardless
    fn drop(&mut self) {
        match TurnStateMachine::transition(self.state, TurnEvent::Release) {
            Ok(next) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    from = %self.state,
                    to = %next,
                    held_ms = self.acquired_at.elapsed().as_millis() as u64,
                    "Turn slot released"
                );
                self.state = next;
            }
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "Turn slot in unexpected state on release");
            }
        }
    }
}

/// Registry of per-session turn slots
#[derive(Default)]
pub struct SessionBatons {
    slots: RwLock<HashMap<String, Arc<BatonSlot>>>,
}

impl SessionBatons {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, session_id: &str) -> Arc<BatonSlot> {
        if let Some(slot) = self.slots.read().await.get(session_id) {
            return slot.clone();
        }

        self.slots
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Wait for the session's slot; `timeout` of `None` waits forever
    pub async fn acquire(&self, session_id: &str, timeout: Option<Duration>) -> Result<BatonGuard> {
        let slot = self.slot(session_id).await;

        let permit = {
            let _waiting = Waiting::enter(&slot.waiting);

            match slot.lock.clone().try_lock_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(session_id = %session_id, "Turn queued behind in-flight turn");
                    let wait = slot.lock.clone().lock_owned();
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                            Error::BatonTimeout {
                                session_id: session_id.to_string(),
                                waited_ms: limit.as_millis() as u64,
                            }
                        })?,
                        None => wait.await,
                    }
                }
            }
        };

        let state = TurnStateMachine::transition(TurnState::Idle, TurnEvent::Acquire)
            .unwrap_or(TurnState::Locked);
        tracing::debug!(session_id = %session_id, state = %state, "Turn slot acquired");

        Ok(BatonGuard {
            session_id: session_id.to_string(),
            state,
            acquired_at: Instant::now(),
            _permit: permit,
        })
    }

    /// Current state of the session's slot
    pub async fn state(&self, session_id: &str) -> TurnState {
        let slots = self.slots.read().await;
        match slots.get(session_id) {
            Some(slot) if slot.lock.try_lock().is_err() => TurnState::Locked,
            _ => TurnState::Idle,
        }
    }

    /// Turns waiting for the session's slot
    pub async fn queued(&self, session_id: &str) -> usize {
        let slots = self.slots.read().await;
        slots
            .get(session_id)
            .map(|slot| slot.waiting.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}
