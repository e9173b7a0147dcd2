//! Per-key work coalescing.
//!
//! # Responsibility
//! - Guarantee at most one in-flight computation per key.
//! - Hand every concurrent caller a clone of the leader's outcome.
//!
//! # Invariants
//! - Flight entries are removed on every leader exit path, panic included.
//! - Waiters never cancel the leader's work; abandoning a wait only drops
//!   the waiter's handle.
//! - Flights for distinct keys never block each other.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Outcome wrapper telling the caller which role it played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightResult<T> {
    /// This caller executed the work itself.
    Led(T),
    /// This caller joined an in-flight computation and shares its outcome.
    Shared(T),
}

impl<T> FlightResult<T> {
    /// Unwraps the outcome regardless of role.
    pub fn into_inner(self) -> T {
        match self {
            Self::Led(value) | Self::Shared(value) => value,
        }
    }

    /// Returns whether this caller shared someone else's outcome.
    pub fn was_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }
}

enum FlightSlot<T> {
    Pending,
    Done(T),
    /// Leader exited without publishing (panic); waiters must re-elect.
    Abandoned,
}

struct Flight<T> {
    slot: Mutex<FlightSlot<T>>,
    ready: Condvar,
}

impl<T: Clone> Flight<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(FlightSlot::Pending),
            ready: Condvar::new(),
        }
    }

    fn publish(&self, value: T) {
        let mut slot = lock(&self.slot);
        *slot = FlightSlot::Done(value);
        self.ready.notify_all();
    }

    fn abandon_if_pending(&self) {
        let mut slot = lock(&self.slot);
        if matches!(*slot, FlightSlot::Pending) {
            *slot = FlightSlot::Abandoned;
            self.ready.notify_all();
        }
    }

    /// Blocks until the leader publishes. Returns `None` when the flight
    /// was abandoned without an outcome.
    fn wait(&self) -> Option<T> {
        let mut slot = lock(&self.slot);
        loop {
            match &*slot {
                FlightSlot::Done(value) => return Some(value.clone()),
                FlightSlot::Abandoned => return None,
                FlightSlot::Pending => {
                    slot = self
                        .ready
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

/// Table of in-flight computations keyed by a caller-chosen key.
///
/// The table mutex guards only entry election; it is never held while the
/// leader's work runs, so distinct keys proceed fully in parallel.
pub struct FlightTable<K, T> {
    flights: Mutex<HashMap<K, Arc<Flight<T>>>>,
}

impl<K, T> Default for FlightTable<K, T> {
    fn default() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, T: Clone> FlightTable<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` if no flight exists for `key`, otherwise waits for the
    /// existing flight and shares its outcome.
    ///
    /// # Contract
    /// - Exactly one caller per key executes `work` at any time.
    /// - Every waiter observes the leader's outcome, success or failure.
    /// - A panicking leader abandons the flight; waiters re-run the
    ///   election with their own work.
    pub fn join<F>(&self, key: K, work: F) -> FlightResult<T>
    where
        F: FnOnce() -> T,
    {
        enum Role<T> {
            Leader(Arc<Flight<T>>),
            Waiter(Arc<Flight<T>>),
        }

        let role = {
            let mut flights = lock(&self.flights);
            match flights.get(&key) {
                Some(flight) => Role::Waiter(Arc::clone(flight)),
                None => {
                    let flight = Arc::new(Flight::new());
                    flights.insert(key.clone(), Arc::clone(&flight));
                    Role::Leader(flight)
                }
            }
        };

        match role {
            Role::Waiter(flight) => match flight.wait() {
                Some(value) => FlightResult::Shared(value),
                None => self.join(key, work),
            },
            Role::Leader(flight) => {
                let _guard = FlightGuard {
                    table: self,
                    key,
                    flight: Arc::clone(&flight),
                };
                let value = work();
                flight.publish(value.clone());
                FlightResult::Led(value)
            }
        }
    }

    /// Returns the number of currently registered flights.
    pub fn in_flight(&self) -> usize {
        lock(&self.flights).len()
    }
}

/// Removes the table entry when the leader exits; a leader that unwinds
/// before publishing leaves the flight abandoned so waiters can re-elect.
struct FlightGuard<'a, K: Eq + Hash + Clone, T: Clone> {
    table: &'a FlightTable<K, T>,
    key: K,
    flight: Arc<Flight<T>>,
}

impl<K: Eq + Hash + Clone, T: Clone> Drop for FlightGuard<'_, K, T> {
    fn drop(&mut self) {
        self.flight.abandon_if_pending();
        let mut flights = lock(&self.table.flights);
        flights.remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
