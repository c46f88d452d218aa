use crossbeam_epoch as epoch;

use crate::config::{Concurrency, Equality, SkipMask};
use crate::equality::Params;
use crate::state::{CacheState, Slot};

/// The caching unit generated for one stateful call site.
///
/// "Generated" by monomorphization: one specialized copy of the routine and
/// field layout per distinct `(In, Out)` signature, with the equality policy
/// and skip mask baked in at installation.
pub(crate) struct Unit<In, Out> {
    state: CacheState<In, Out>,
    equality: Equality<In>,
    skip: SkipMask,
}

impl<In, Out> Unit<In, Out>
where
    In: Params,
    Out: Clone + Send + Sync + 'static,
{
    pub fn new(concurrency: Concurrency, equality: Equality<In>, skip: SkipMask) -> Self {
        Self { state: CacheState::new(concurrency), equality, skip }
    }

    /// The fast-path read. Returns the cached result if the generation was
    /// stable across the read and the equality policy reports no change.
    /// Never blocks and never touches the writer lock.
    pub fn read(&self, args: &In) -> Option<Out> {
        let guard = epoch::pin();
        let slot = self.state.snapshot(&guard)?;
        let old = slot.inputs.as_ref()?;
        self.matches(old, args).then(|| slot.result.clone())
    }

    /// Recompute and publish. Entered only after [`read`](Self::read) missed.
    ///
    /// With a lock, a writer that waited re-runs the cache check before
    /// computing: another writer may have published a usable value in the
    /// meantime. Without one, racing writers may compute duplicates; the last
    /// publication wins and readers never see a torn pair either way.
    pub fn write(&self, args: In, func: impl Fn(&In) -> Out) -> Out {
        let held = self.state.lock();
        if held.is_some() {
            if let Some(result) = self.read(&args) {
                return result;
            }
        }

        let ticket = self.state.begin_write();
        let result = func(&args);
        let guard = epoch::pin();
        self.state.publish(Slot { inputs: Some(args), result: result.clone() }, &guard);
        drop(ticket);
        drop(held);
        result
    }

    fn matches(&self, old: &In, new: &In) -> bool {
        match self.equality {
            Equality::SelfGenerated => old.unchanged(new, &self.skip),
            Equality::External(changed) => {
                if self.skip.is_empty() {
                    !changed(old, new)
                } else {
                    // Neutralize skipped positions so any well-behaved
                    // comparator sees them as unchanged.
                    !changed(old, &old.masked(new, &self.skip))
                }
            }
        }
    }
}
