//! Store connectivity state machine shared by every request of one session context.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::storage::{StoreEvent, StoreEventListener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Working,
    Disconnected,
    Blocked,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Working => "working",
            Self::Disconnected => "disconnected",
            Self::Blocked => "blocked",
        };
        f.write_str(value)
    }
}

struct Inner {
    state: ConnectivityState,
    waiters: VecDeque<(u64, oneshot::Sender<ConnectivityState>)>,
    next_ticket: u64,
}

impl Inner {
    fn resolve(&mut self, state: ConnectivityState) {
        self.state = state;
        let waiters = self.waiters.len();
        for (_, waiter) in self.waiters.drain(..) {
            // The receiver may have been dropped by an aborted request
            let _ = waiter.send(state);
        }
        if waiters > 0 {
            tracing::debug!("Resolved {} connectivity waiter(s) with {}", waiters, state);
        }
    }
}

/// Working / Disconnected / Blocked, plus the queue of requests parked while blocked.
///
/// Events and waiter registration go through the same lock, so a waiter is either
/// drained by an event or registered after it and waits for the next one.
pub struct Connectivity {
    inner: Mutex<Inner>,
}

impl Connectivity {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectivityState::Working,
                waiters: VecDeque::new(),
                next_ticket: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ConnectivityState {
        self.lock().state
    }

    /// Number of requests currently parked on a blocked store.
    pub fn pending_waiters(&self) -> usize {
        self.lock().waiters.len()
    }

    pub fn apply(&self, event: StoreEvent) {
        let mut inner = self.lock();
        tracing::info!("Session store event {:?} (was {})", event, inner.state);
        match event {
            StoreEvent::Work => inner.resolve(ConnectivityState::Working),
            StoreEvent::Disconnect => inner.resolve(ConnectivityState::Disconnected),
            StoreEvent::Block => inner.state = ConnectivityState::Blocked,
        }
    }

    /// Current state, or, while blocked, the state delivered by the next resolving event.
    ///
    /// Never returns `Blocked`. There is no timeout. Dropping the returned future
    /// removes its waiter from the queue.
    pub async fn ready(&self) -> ConnectivityState {
        let (ticket, receiver) = {
            let mut inner = self.lock();
            if inner.state != ConnectivityState::Blocked {
                return inner.state;
            }
            let (sender, receiver) = oneshot::channel();
            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            inner.waiters.push_back((ticket, sender));
            (ticket, receiver)
        };

        let _waiter = WaiterGuard {
            connectivity: self,
            ticket,
        };

        receiver.await.unwrap_or(ConnectivityState::Disconnected)
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreEventListener for Connectivity {
    fn on_event(&self, event: StoreEvent) {
        self.apply(event);
    }
}

struct WaiterGuard<'a> {
    connectivity: &'a Connectivity,
    ticket: u64,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.connectivity.lock();
        inner.waiters.retain(|(ticket, _)| *ticket != self.ticket);
    }
}
