use once_cell::sync::OnceCell;

use crate::config::{ConfigError, Purity, UnitConfig};
use crate::equality::Params;
use crate::redirect::PureUnit;
use crate::unit::Unit;

/// Build the memoization unit for one call site.
///
/// Validates the configuration once, up front: a malformed skip mask is an
/// installation error, never a call-time one. Comparator signature mismatches
/// cannot occur; the comparator's type is fixed by `In`. The returned entry
/// point has the same signature as `func` and is what the call rewriter
/// substitutes at the call site.
pub fn install<In, Out, F>(
    config: UnitConfig<In>,
    func: F,
) -> Result<Entry<In, Out>, ConfigError>
where
    In: Params,
    Out: Clone + Send + Sync + 'static,
    F: Fn(&In) -> Out + Send + Sync + 'static,
{
    config.skip.validate(In::ARITY)?;
    let strategy = match config.purity {
        Purity::Pure => Strategy::Pure(PureUnit::new(config.concurrency)),
        Purity::Stateful => {
            Strategy::Stateful(Unit::new(config.concurrency, config.equality, config.skip))
        }
    };
    Ok(Entry { strategy, func: Box::new(func) })
}

/// The strategy the installer picked for a call site.
enum Strategy<In, Out> {
    Stateful(Unit<In, Out>),
    Pure(PureUnit<Out>),
}

/// An installed call site: the opaque callable entry point with the same
/// signature as the underlying computation.
pub struct Entry<In, Out> {
    strategy: Strategy<In, Out>,
    func: Box<dyn Fn(&In) -> Out + Send + Sync>,
}

impl<In, Out> Entry<In, Out>
where
    In: Params,
    Out: Clone + Send + Sync + 'static,
{
    /// Invoke the unit: fast-path read, then recompute-and-publish on miss.
    pub fn call(&self, args: In) -> Out {
        match &self.strategy {
            Strategy::Stateful(unit) => {
                if let Some(result) = unit.read(&args) {
                    #[cfg(feature = "testing")]
                    crate::testing::register_hit();
                    return result;
                }
                #[cfg(feature = "testing")]
                crate::testing::register_miss();
                unit.write(args, &*self.func)
            }
            Strategy::Pure(unit) => {
                if let Some(result) = unit.read() {
                    #[cfg(feature = "testing")]
                    crate::testing::register_hit();
                    return result;
                }
                #[cfg(feature = "testing")]
                crate::testing::register_miss();
                unit.write(&args, &*self.func)
            }
        }
    }
}

/// A lazily installed call site.
///
/// Lives in a `static` at the rewritten call site. The first invocation
/// installs the unit; concurrent first invocations are single-winner and the
/// installation is idempotent, so the unit is built exactly once and then
/// lives for the process lifetime.
pub struct CallSite<In, Out>(OnceCell<Entry<In, Out>>);

impl<In, Out> CallSite<In, Out>
where
    In: Params,
    Out: Clone + Send + Sync + 'static,
{
    /// Create an empty call site.
    pub const fn new() -> Self {
        Self(OnceCell::new())
    }

    /// Dispatch through the installed entry point, installing it on first
    /// use.
    ///
    /// Panics if `init` produces a configuration the installer rejects; a
    /// malformed configuration is a programming error surfaced once, at
    /// installation.
    pub fn invoke<F>(&self, init: impl FnOnce() -> (UnitConfig<In>, F), args: In) -> Out
    where
        F: Fn(&In) -> Out + Send + Sync + 'static,
    {
        let entry = self.0.get_or_init(|| {
            let (config, func) = init();
            match install(config, func) {
                Ok(entry) => entry,
                Err(error) => panic!("stablecall: {error}"),
            }
        });
        entry.call(args)
    }
}

impl<In, Out> Default for CallSite<In, Out>
where
    In: Params,
    Out: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
