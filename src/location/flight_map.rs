//! Compute-once map for lazily populated cache levels.
//!
//! The first caller for a key becomes the leader of a "flight" and runs the
//! population closure without holding the map lock. Callers arriving for the
//! same key while the flight is airborne park on it and receive the leader's
//! outcome, success or failure. A successful value is stored for good; a failed
//! flight leaves the key empty so a later call starts a fresh one.

use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

enum Slot<V, E> {
    Ready(Arc<V>),
    Pending(Arc<Flight<V, E>>),
}

enum Outcome<V, E> {
    Ready(Arc<V>),
    Failed(Arc<E>),
    // Leader unwound without producing a result.
    Abandoned,
}

impl<V, E> Clone for Outcome<V, E> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Ready(v) => Outcome::Ready(v.clone()),
            Outcome::Failed(e) => Outcome::Failed(e.clone()),
            Outcome::Abandoned => Outcome::Abandoned,
        }
    }
}

struct Flight<V, E> {
    outcome: Mutex<Option<Outcome<V, E>>>,
    landed: Condvar,
}

impl<V, E> Flight<V, E> {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            landed: Condvar::new(),
        }
    }

    fn wait(&self) -> Outcome<V, E> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(landed) = outcome.as_ref() {
                return landed.clone();
            }
            self.landed.wait(&mut outcome);
        }
    }

    fn land(&self, outcome: Outcome<V, E>) {
        *self.outcome.lock() = Some(outcome);
        self.landed.notify_all();
    }
}

enum Claim<V, E> {
    Ready(Arc<V>),
    Wait(Arc<Flight<V, E>>),
    Lead(Arc<Flight<V, E>>),
}

pub struct FlightMap<K, V, E> {
    slots: RwLock<HashMap<K, Slot<V, E>>>,
}

impl<K, V, E> Default for FlightMap<K, V, E> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V, E> FlightMap<K, V, E>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `key`, running `populate` if none exists and
    /// no other caller is already populating it.
    pub fn get_or_populate<F>(&self, key: &K, populate: F) -> Result<Arc<V>, Arc<E>>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let flight = loop {
            match self.claim(key) {
                Claim::Ready(value) => return Ok(value),
                Claim::Wait(flight) => match flight.wait() {
                    Outcome::Ready(value) => return Ok(value),
                    Outcome::Failed(err) => return Err(err),
                    Outcome::Abandoned => continue,
                },
                Claim::Lead(flight) => break flight,
            }
        };
        self.lead(key, flight, populate)
    }

    /// Number of keys holding a stored value.
    pub fn ready_len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    fn claim(&self, key: &K) -> Claim<V, E> {
        // Fast path: shared lock, no contention once populated
        if let Some(Slot::Ready(value)) = self.slots.read().get(key) {
            return Claim::Ready(value.clone());
        }

        // Slow path: someone may have landed or taken off since we looked
        let mut slots = self.slots.write();
        match slots.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(value) => Claim::Ready(value.clone()),
                Slot::Pending(flight) => Claim::Wait(flight.clone()),
            },
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::new());
                entry.insert(Slot::Pending(flight.clone()));
                Claim::Lead(flight)
            }
        }
    }

    fn lead<F>(&self, key: &K, flight: Arc<Flight<V, E>>, populate: F) -> Result<Arc<V>, Arc<E>>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut guard = LeaderGuard {
            map: self,
            key,
            flight: &flight,
            landed: false,
        };

        let result = populate();
        guard.landed = true;

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                self.slots
                    .write()
                    .insert(key.clone(), Slot::Ready(value.clone()));
                flight.land(Outcome::Ready(value.clone()));
                Ok(value)
            }
            Err(err) => {
                let err = Arc::new(err);
                self.slots.write().remove(key);
                flight.land(Outcome::Failed(err.clone()));
                Err(err)
            }
        }
    }
}

// Clears the pending slot and releases waiters if `populate` unwinds.
struct LeaderGuard<'a, K: Eq + Hash, V, E> {
    map: &'a FlightMap<K, V, E>,
    key: &'a K,
    flight: &'a Flight<V, E>,
    landed: bool,
}

impl<K: Eq + Hash, V, E> Drop for LeaderGuard<'_, K, V, E> {
    fn drop(&mut self) {
        if !self.landed {
            self.map.slots.write().remove(self.key);
            self.flight.land(Outcome::Abandoned);
        }
    }
}
