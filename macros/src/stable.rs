use syn::parse::{Parse, ParseStream};

use super::*;

/// Options accepted by the `#[stable]` attribute.
#[derive(Default)]
pub struct Options {
    pure: bool,
    lockfree: bool,
    checker: Option<syn::Path>,
    skip: Vec<syn::Ident>,
}

impl Parse for Options {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut options = Options::default();
        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "pure" => options.pure = true,
                "lockfree" => options.lockfree = true,
                "checker" => {
                    let _: syn::Token![=] = input.parse()?;
                    options.checker = Some(input.parse()?);
                }
                "skip" => {
                    let content;
                    syn::parenthesized!(content in input);
                    let names =
                        content.parse_terminated(syn::Ident::parse, syn::Token![,])?;
                    options.skip.extend(names);
                }
                _ => bail!(ident, "unknown option `{}`", ident),
            }
            utils::eat_comma(input);
        }
        Ok(options)
    }
}

/// Rewrite a function's body into a dispatch through a static call-site unit.
pub fn expand(options: Options, mut func: syn::ItemFn) -> Result<proc_macro2::TokenStream> {
    if let Some(asyncness) = &func.sig.asyncness {
        bail!(asyncness, "async functions are not supported");
    }
    if let Some(constness) = &func.sig.constness {
        bail!(constness, "const functions are not supported");
    }
    if !func.sig.generics.params.is_empty() || func.sig.generics.where_clause.is_some() {
        bail!(func.sig.generics, "generic functions are not supported");
    }
    if options.pure && options.checker.is_some() {
        bail!(func.sig.ident, "a checker is never consulted for pure call sites");
    }
    if options.pure && !options.skip.is_empty() {
        bail!(func.sig.ident, "arguments are never compared for pure call sites");
    }

    let mut args = vec![];
    let mut types = vec![];
    for input in &func.sig.inputs {
        let typed = match input {
            syn::FnArg::Typed(typed) => typed,
            syn::FnArg::Receiver(_) => {
                bail!(input, "methods are not supported")
            }
        };

        let name = match typed.pat.as_ref() {
            syn::Pat::Ident(syn::PatIdent {
                by_ref: None,
                mutability: None,
                ident,
                subpat: None,
                ..
            }) => ident,
            pat => bail!(pat, "only simple identifiers are supported"),
        };

        let ty = typed.ty.as_ref();
        args.push(name);
        types.push(ty);
    }

    // Resolve the skipped parameter names into mask positions.
    let mut bits = 0u64;
    let mut count = 0u32;
    for name in &options.skip {
        let Some(position) = args.iter().position(|arg| *arg == name) else {
            bail!(name, "unknown parameter `{}`", name);
        };
        if position >= 64 {
            bail!(name, "parameter `{}` is beyond the 64-bit mask width", name);
        }
        bits |= 1 << position;
        count = count.max(position as u32 + 1);
    }

    let output = match &func.sig.output {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => quote! { #ty },
    };

    let mut config = if options.pure {
        quote! { ::stablecall::UnitConfig::pure() }
    } else {
        quote! { ::stablecall::UnitConfig::stateful() }
    };
    if options.lockfree {
        config = quote! { #config.lockfree() };
    }
    if let Some(checker) = &options.checker {
        config = quote! { #config.checker(#checker) };
    }
    if count > 0 {
        config = quote! { #config.skip(::stablecall::SkipMask::new(#bits, #count)) };
    }

    // Construct a tuple from all arguments and its type.
    let arg_tuple = quote! { (#(#args,)*) };
    let arg_types = quote! { (#(#types,)*) };

    // Construct assertions that the parameters fulfill the necessary bounds.
    let bounds = types.iter().map(|ty| {
        quote! {
            ::stablecall::internal::assert_param::<#ty>();
        }
    });
    let bounds = quote! { #(#bounds)* };

    // Construct the inner closure. The computation receives the argument
    // tuple by reference and owns a clone of it while it runs.
    let body = &func.block;
    let closure = quote! {
        |__args: &#arg_types| {
            let #arg_tuple = ::core::clone::Clone::clone(__args);
            #body
        }
    };

    // Adjust the function's body.
    func.block = parse_quote! { {
        #bounds
        static __SITE: ::stablecall::CallSite<#arg_types, #output> =
            ::stablecall::CallSite::new();
        __SITE.invoke(|| (#config, #closure), #arg_tuple)
    } };

    Ok(quote! { #func })
}
