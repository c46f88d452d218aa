//! Per-call-site memoization of stable values.
//!
//! A call site annotated with [`#[stable]`](macro@stable) keeps the last
//! computed result in a unit-private cache guarded by a seqlock-style
//! generation counter: repeated calls with unchanged arguments return the
//! cached value without recomputing, and the common-case check never takes a
//! lock. Call sites marked `pure` compute once and then redirect every later
//! call straight to the fixed result.

mod config;
mod equality;
mod install;
mod redirect;
mod state;
mod unit;

pub use crate::config::{Concurrency, ConfigError, Equality, Purity, SkipMask, UnitConfig};
pub use crate::equality::{ArgEq, Params};
pub use crate::install::{install, CallSite, Entry};

#[cfg(feature = "macros")]
pub use stablecall_macros::stable;

#[cfg(feature = "testing")]
mod testing;

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal {
    pub use crate::equality::assert_param;

    #[cfg(feature = "testing")]
    pub use crate::testing::last_was_hit;
}
