use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use parking_lot::Mutex;

use crate::config::Concurrency;

/// The specialized unit for call sites whose result is argument-independent.
///
/// Once the first computation succeeds, its boxed result is swapped in as the
/// dispatch target. Every later call is an acquire load, a null check and a
/// clone: no generation protocol, no argument comparison. The published
/// value never changes again.
pub(crate) struct PureUnit<Out> {
    value: AtomicPtr<Out>,
    lock: Option<Mutex<()>>,
}

impl<Out> PureUnit<Out>
where
    Out: Clone + Send + Sync + 'static,
{
    pub fn new(concurrency: Concurrency) -> Self {
        Self {
            value: AtomicPtr::new(ptr::null_mut()),
            lock: match concurrency {
                Concurrency::Mutex => Some(Mutex::new(())),
                Concurrency::Lockfree => None,
            },
        }
    }

    /// The redirected fast path.
    pub fn read(&self) -> Option<Out> {
        let published = self.value.load(Ordering::Acquire);
        // A non-null pointer is only ever stored once and never freed while
        // the unit is alive.
        (!published.is_null()).then(|| unsafe { (*published).clone() })
    }

    /// Compute once and install the result as the dispatch target. Entered
    /// only after [`read`](Self::read) missed.
    pub fn write<In>(&self, args: &In, func: impl Fn(&In) -> Out) -> Out {
        let held = self.lock.as_ref().map(|mutex| mutex.lock());
        if held.is_some() {
            if let Some(result) = self.read() {
                return result;
            }
        }
        self.try_publish(func(args))
    }

    /// First publication wins. A racing loser discards its own value and
    /// returns the winner's, so callers never observe a value that the unit
    /// will not return forever after.
    fn try_publish(&self, result: Out) -> Out {
        let boxed = Box::into_raw(Box::new(result));
        match self.value.compare_exchange(
            ptr::null_mut(),
            boxed,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => unsafe { (*boxed).clone() },
            Err(winner) => {
                drop(unsafe { Box::from_raw(boxed) });
                unsafe { (*winner).clone() }
            }
        }
    }
}

impl<Out> Drop for PureUnit<Out> {
    fn drop(&mut self) {
        let published = *self.value.get_mut();
        if !published.is_null() {
            drop(unsafe { Box::from_raw(published) });
        }
    }
}
