extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("stablecall: ", $fmt) $($tts)*)
        ))
    }
}

mod stable;
mod utils;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_quote, Error, Result};

/// Memoize a function at its call sites.
///
/// ```
/// #[stable]
/// fn layout(width: u32, text: String) -> String {
///     format!("{text} at {width}px")
/// }
/// ```
///
/// The function keeps its signature; its body is rewritten to dispatch
/// through a per-call-site caching unit that recomputes only when the
/// arguments change.
///
/// Options:
/// - `pure`: the result is argument-independent; compute once, never compare.
/// - `lockfree`: let racing callers recompute in parallel instead of
///   serializing them on a lock.
/// - `checker = path`: a `fn(&(..), &(..)) -> bool` over the (old, new)
///   argument tuples deciding whether the arguments changed.
/// - `skip(a, b)`: never compare the named parameters (for parameters pinned
///   to a known default value).
#[proc_macro_attribute]
pub fn stable(attr: TokenStream, stream: TokenStream) -> TokenStream {
    let options = syn::parse_macro_input!(attr as stable::Options);
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    stable::expand(options, func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
