use std::sync::Arc;

use crate::config::SkipMask;

/// Ensure a type is suitable as a single parameter.
pub fn assert_param<T: ArgEq + Clone + Send + Sync + 'static>() {}

/// Per-parameter equality as the self-generated policy compares it.
///
/// The comparison is total and reflexive and never panics. Floats compare by
/// raw bit pattern, so `NAN` equals itself and `0.0` differs from `-0.0`;
/// IEEE semantics would make a NaN-producing computation recompute on every
/// call. Shared-ownership handles short-circuit on pointer identity before
/// falling back to structural comparison.
pub trait ArgEq {
    /// Whether `other` counts as the same argument value.
    fn same(&self, other: &Self) -> bool;
}

macro_rules! value_eq {
    ($($ty:ty),* $(,)?) => {
        $(impl ArgEq for $ty {
            #[inline]
            fn same(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

value_eq! {
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    str, String,
}

impl ArgEq for f32 {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl ArgEq for f64 {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl<T: ArgEq + ?Sized> ArgEq for &T {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        T::same(self, other)
    }
}

impl<T: ArgEq + ?Sized> ArgEq for Box<T> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        T::same(self, other)
    }
}

impl<T: ArgEq + ?Sized> ArgEq for Arc<T> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || T::same(self, other)
    }
}

impl<T: ArgEq> ArgEq for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ArgEq, const N: usize> ArgEq for [T; N] {
    fn same(&self, other: &Self) -> bool {
        self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: ArgEq> ArgEq for [T] {
    fn same(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: ArgEq> ArgEq for Vec<T> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        self.as_slice().same(other.as_slice())
    }
}

/// An argument tuple, fixed at unit generation time.
///
/// This is the signature descriptor the installer consumes: implemented for
/// tuples up to length twelve whose elements are [`ArgEq`], cloneable and
/// shareable across threads.
pub trait Params: Clone + Send + Sync + 'static {
    /// The number of parameter positions.
    const ARITY: u32;

    /// Whether `new` matches `self` on every position the mask does not skip.
    fn unchanged(&self, new: &Self, mask: &SkipMask) -> bool;

    /// A copy of `new` with masked positions replaced by clones of `self`'s,
    /// neutralizing them for an external comparator.
    fn masked(&self, new: &Self, mask: &SkipMask) -> Self;
}

macro_rules! one {
    ($idx:tt) => {
        1u32
    };
}

macro_rules! params {
    ($($param:ident $idx:tt),* $(,)?) => {
        #[allow(unused_variables)]
        impl<$($param),*> Params for ($($param,)*)
        where
            $($param: ArgEq + Clone + Send + Sync + 'static,)*
        {
            const ARITY: u32 = 0 $(+ one!($idx))*;

            fn unchanged(&self, new: &Self, mask: &SkipMask) -> bool {
                true $(&& (mask.skips($idx) || ArgEq::same(&self.$idx, &new.$idx)))*
            }

            fn masked(&self, new: &Self, mask: &SkipMask) -> Self {
                ($(
                    if mask.skips($idx) { self.$idx.clone() } else { new.$idx.clone() },
                )*)
            }
        }
    };
}

params! {}
params! { A 0 }
params! { A 0, B 1 }
params! { A 0, B 1, C 2 }
params! { A 0, B 1, C 2, D 3 }
params! { A 0, B 1, C 2, D 3, E 4 }
params! { A 0, B 1, C 2, D 3, E 4, F 5 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10 }
params! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11 }
