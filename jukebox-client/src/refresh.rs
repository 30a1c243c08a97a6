//! Single-flight access token refresh
//!
//! When several requests fail with 401 at once, exactly one of them (the
//! leader) calls `/auth/refresh`; the others wait and are released in
//! arrival order with the leader's outcome.
//!
//! ```text
//! Idle ──join──▶ InFlight(waiters) ──finish──▶ Idle
//!                  ▲        │
//!                  └─join───┘ (push waiter)
//! ```

use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

/// New access token, or `None` when the refresh failed
pub type RefreshOutcome = Option<String>;

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    InFlight(Vec<oneshot::Sender<RefreshOutcome>>),
}

/// What a request that saw a 401 should do next
#[derive(Debug)]
pub enum Ticket<'a> {
    /// The session already holds a different token; retry with it
    Ready(String),
    /// Perform the refresh and report through the guard
    Leader(LeaderGuard<'a>),
    /// Another request is refreshing; await its outcome
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a request whose bearer `used_token` was rejected
    ///
    /// `current_token` reads the session's token and runs under the
    /// coordinator lock, so a refresh that completed in between is noticed
    /// instead of starting a second one.
    pub fn join<F>(&self, used_token: &str, current_token: F) -> Ticket<'_>
    where
        F: FnOnce() -> Option<String>,
    {
        let mut state = self.lock();
        match &mut *state {
            State::InFlight(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                debug!(queued = waiters.len(), "Waiting for in-flight token refresh");
                Ticket::Waiter(rx)
            }
            State::Idle => match current_token() {
                Some(current) if current != used_token => Ticket::Ready(current),
                _ => {
                    *state = State::InFlight(Vec::new());
                    Ticket::Leader(LeaderGuard {
                        coordinator: self,
                        finished: false,
                    })
                }
            },
        }
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), State::InFlight(_))
    }

    fn finish(&self, outcome: RefreshOutcome) {
        let previous = std::mem::take(&mut *self.lock());
        if let State::InFlight(waiters) = previous {
            debug!(waiters = waiters.len(), success = outcome.is_some(), "Token refresh resolved");
            for waiter in waiters {
                // A dropped receiver means that request was cancelled
                let _ = waiter.send(outcome.clone());
            }
        }
    }
}

/// Held by the request performing the refresh
///
/// Dropping it without [`LeaderGuard::finish`] (e.g. the request future was
/// cancelled) fails the waiters rather than leaving them parked.
#[derive(Debug)]
pub struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl LeaderGuard<'_> {
    /// Release every waiter with `outcome` and return to idle
    pub fn finish(mut self, outcome: RefreshOutcome) {
        self.finished = true;
        self.coordinator.finish(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator.finish(None);
        }
    }
}
