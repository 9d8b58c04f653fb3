//! Entity reuse pool
//!
//! The world runs indefinitely, so short-lived entities (obstacles,
//! pedestrians, segments) are recycled instead of reallocated. A pooled type
//! implements [`Poolable`]; the pool hands out [`PoolEntry`] wrappers whose
//! serials let it warn about releases it never issued.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

/// Contract required of any pooled type
pub trait Poolable {
    /// Return the value to a usable default state (called on acquire)
    fn reset(&mut self);
    /// Release underlying resources; the value is never used afterwards
    fn dispose(&mut self);
    /// Whether `dispose` has run
    fn is_disposed(&self) -> bool;
}

/// A pooled value plus the serial the pool tracks it by
#[derive(Debug)]
pub struct PoolEntry<T> {
    serial: u64,
    value: T,
}

impl<T> PoolEntry<T> {
    /// Serial assigned by the owning pool
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl<T> Deref for PoolEntry<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for PoolEntry<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Generic reuse pool with a bounded idle list
pub struct EntityPool<T: Poolable> {
    factory: Box<dyn FnMut() -> T + Send>,
    idle: Vec<PoolEntry<T>>,
    checked_out: HashSet<u64>,
    next_serial: u64,
    max_size: usize,
    created: usize,
    reused: usize,
}

impl<T: Poolable> EntityPool<T> {
    /// Create a pool that manufactures new values with `factory` when the
    /// idle list is empty. `max_size` bounds the idle list, not the number
    /// of values in flight.
    pub fn new(max_size: usize, factory: impl FnMut() -> T + Send + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            idle: Vec::new(),
            checked_out: HashSet::new(),
            next_serial: 1,
            max_size,
            created: 0,
            reused: 0,
        }
    }

    /// Pop an idle value (reset to defaults) or manufacture a new one.
    pub fn acquire(&mut self) -> PoolEntry<T> {
        let mut entry = match self.idle.pop() {
            Some(entry) => {
                self.reused += 1;
                entry
            }
            None => {
                self.created += 1;
                let serial = self.next_serial;
                self.next_serial += 1;
                PoolEntry {
                    serial,
                    value: (self.factory)(),
                }
            }
        };
        entry.value.reset();
        let _ = self.checked_out.insert(entry.serial);
        entry
    }

    /// Return a value to the pool. Idle values over capacity are disposed
    /// immediately. Releasing an entry this pool never issued is logged and
    /// the entry is disposed, never stored.
    pub fn release(&mut self, mut entry: PoolEntry<T>) {
        if !self.checked_out.remove(&entry.serial) {
            log::warn!(
                "pool misuse: released entry {} that was not checked out",
                entry.serial
            );
            entry.value.dispose();
            return;
        }
        if self.idle.len() < self.max_size {
            self.idle.push(entry);
        } else {
            entry.value.dispose();
        }
    }

    /// Shrink or grow the idle capacity; shrinking disposes the excess.
    pub fn resize(&mut self, new_max: usize) {
        self.max_size = new_max;
        while self.idle.len() > new_max {
            if let Some(mut entry) = self.idle.pop() {
                entry.value.dispose();
            }
        }
    }

    /// Eagerly manufacture up to `n` idle values, capped by capacity.
    pub fn prewarm(&mut self, n: usize) {
        let target = n.min(self.max_size);
        while self.idle.len() < target {
            self.created += 1;
            let serial = self.next_serial;
            self.next_serial += 1;
            self.idle.push(PoolEntry {
                serial,
                value: (self.factory)(),
            });
        }
    }

    /// Dispose every idle value and forget outstanding leases. Values still
    /// in flight are the caller's to dispose.
    pub fn clear(&mut self) {
        for mut entry in self.idle.drain(..) {
            entry.value.dispose();
        }
        self.checked_out.clear();
    }

    /// Idle values ready for reuse
    pub fn available(&self) -> usize {
        self.idle.len()
    }

    /// Values currently checked out
    pub fn in_use(&self) -> usize {
        self.checked_out.len()
    }

    /// Total values manufactured over the pool's lifetime
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total acquisitions served from the idle list
    pub fn reused(&self) -> usize {
        self.reused
    }
}

impl<T: Poolable> Drop for EntityPool<T> {
    fn drop(&mut self) {
        self.clear();
    }
}
