//! Debouncing with explicit sequence tokens.
//!
//! Every submission gets a ticket from a monotonically increasing counter.
//! Work only starts once the debounce window passes without a newer ticket,
//! and a result is only accepted while its ticket is still the latest one
//! issued. Ordering is by submission, never by completion.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct QueryDebouncer {
    window: Duration,
    issued: AtomicU64,
    executed: AtomicU64,
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl QueryDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            issued: AtomicU64::new(0),
            executed: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Issue a new ticket, superseding every earlier one.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest(&self) -> Option<SearchTicket> {
        match self.issued.load(Ordering::Acquire) {
            0 => None,
            sequence => Some(SearchTicket(sequence)),
        }
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        self.issued.load(Ordering::Acquire) == ticket.0
    }

    /// Number of submissions that survived the window and actually ran.
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Acquire)
    }

    /// Debounce `task`: wait out the window, run it only if nothing newer was
    /// submitted meanwhile, and drop its output if something newer was
    /// submitted while it ran.
    pub async fn run<F, Fut, T>(&self, task: F) -> Option<T>
    where
        F: FnOnce(SearchTicket) -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.issue();
        tokio::time::sleep(self.window).await;

        if !self.is_latest(ticket) {
            debug!(sequence = ticket.0, "Debounced submission superseded before running");
            return None;
        }

        self.executed.fetch_add(1, Ordering::AcqRel);
        let output = task(ticket).await;

        if !self.is_latest(ticket) {
            debug!(sequence = ticket.0, "Discarding stale result");
            return None;
        }
        Some(output)
    }
}

/// Holds the most recent accepted result, refusing stale publications.
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Mutex<Option<(SearchTicket, T)>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` if `ticket` is still the latest one issued by
    /// `debouncer` and not older than what is already stored.
    pub fn publish(&self, debouncer: &QueryDebouncer, ticket: SearchTicket, value: T) -> bool {
        if !debouncer.is_latest(ticket) {
            return false;
        }
        let mut inner = self.inner.lock();
        if matches!(&*inner, Some((current, _)) if *current > ticket) {
            return false;
        }
        *inner = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        self.inner.lock().as_ref().map(|(_, value)| value.clone())
    }

    pub fn ticket(&self) -> Option<SearchTicket> {
        self.inner.lock().as_ref().map(|(ticket, _)| *ticket)
    }

    pub fn clear(&self) {
        *self.inner.lock() = None;
    }
}
