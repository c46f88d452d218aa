use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned};
use parking_lot::{Mutex, MutexGuard};

use crate::config::Concurrency;

/// Seqlock-style cache state, owned by exactly one memoization unit.
///
/// The generation counter starts at zero (stable, empty), is odd while a
/// writer is in flight and even otherwise. The published pair itself lives in
/// an immutable, epoch-managed heap node that writers replace wholesale with
/// a single pointer swap, so a pinned reader can never observe a torn pair;
/// the counter's double-read decides only whether a snapshot is usable.
///
/// Unsynchronized writers may interleave their two increments, which can make
/// the counter momentarily even while a write is still in flight. Readers
/// passing the double-read in that window still see either the previous node
/// or a completely published new one, never a partial write. All counter
/// accesses are `SeqCst`; the ordering here is correctness-critical, not a
/// tuning knob.
pub(crate) struct CacheState<In, Out> {
    generation: AtomicU64,
    slot: Atomic<Slot<In, Out>>,
    lock: Option<Mutex<()>>,
}

/// One published (inputs, result) pair. Inputs are absent for pure units.
pub(crate) struct Slot<In, Out> {
    pub inputs: Option<In>,
    pub result: Out,
}

impl<In, Out> CacheState<In, Out> {
    pub fn new(concurrency: Concurrency) -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: Atomic::null(),
            lock: match concurrency {
                Concurrency::Mutex => Some(Mutex::new(())),
                Concurrency::Lockfree => None,
            },
        }
    }

    /// The published pair, if the generation was nonzero, even and unchanged
    /// across the load. The snapshot borrows from the pinned guard, which
    /// keeps the node alive past any concurrent replacement.
    pub fn snapshot<'g>(&self, guard: &'g Guard) -> Option<&'g Slot<In, Out>> {
        let v1 = self.generation.load(Ordering::SeqCst);
        if v1 == 0 || v1 & 1 == 1 {
            return None;
        }
        let shared = self.slot.load(Ordering::Acquire, guard);
        // The node is only dropped after all pinned guards retire.
        let slot = unsafe { shared.as_ref() }?;
        let v2 = self.generation.load(Ordering::SeqCst);
        (v1 == v2).then_some(slot)
    }

    /// Announce a write by making the generation odd. The returned ticket
    /// restores evenness when dropped, on success and unwind alike, so no
    /// reader is left believing a write is permanently in progress.
    pub fn begin_write(&self) -> WriteTicket<'_> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        WriteTicket { generation: &self.generation }
    }

    /// Swap in a freshly computed pair and retire the previous node.
    pub fn publish(&self, slot: Slot<In, Out>, guard: &Guard) {
        let old = self.slot.swap(Owned::new(slot), Ordering::AcqRel, guard);
        if !old.is_null() {
            // Readers may still hold the old node; free it once they retire.
            unsafe { guard.defer_destroy(old) };
        }
    }

    /// Acquire the writer lock, if this unit has one.
    pub fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.as_ref().map(|mutex| mutex.lock())
    }
}

impl<In, Out> Drop for CacheState<In, Out> {
    fn drop(&mut self) {
        // Exclusive access: no reader can be pinned on this state anymore.
        let slot = mem::replace(&mut self.slot, Atomic::null());
        unsafe {
            let shared = slot.load(Ordering::Relaxed, epoch::unprotected());
            if !shared.is_null() {
                drop(shared.into_owned());
            }
        }
    }
}

/// Closes a write by bumping the generation back to even.
pub(crate) struct WriteTicket<'a> {
    generation: &'a AtomicU64,
}

impl Drop for WriteTicket<'_> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
