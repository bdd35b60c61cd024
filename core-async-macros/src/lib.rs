use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Ident, ItemFn};

/// Runs an `async fn` test on a fresh current-thread runtime.
///
/// `#[core_async::test(start_paused)]` starts the runtime with a paused
/// clock. The consuming crate must enable Tokio's `test-util` feature (as a
/// dev-dependency) for that variant.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

/// Runs an `async fn main` on a fresh current-thread runtime.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

enum MacroKind {
    Test,
    Main,
}

#[derive(Default)]
struct RuntimeOptions {
    start_paused: bool,
}

fn parse_options(attr: TokenStream, kind: &MacroKind) -> syn::Result<RuntimeOptions> {
    let mut options = RuntimeOptions::default();
    if attr.is_empty() {
        return Ok(options);
    }

    let tokens = TokenStream2::from(attr);
    let ident: Ident = syn::parse2(tokens.clone())
        .map_err(|_| syn::Error::new_spanned(&tokens, "expected a single option identifier"))?;

    match (ident.to_string().as_str(), kind) {
        ("start_paused", MacroKind::Test) => options.start_paused = true,
        ("start_paused", MacroKind::Main) => {
            return Err(syn::Error::new_spanned(
                ident,
                "`start_paused` is only supported on #[core_async::test]",
            ))
        }
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "unknown option; supported options: `start_paused`",
            ))
        }
    }

    Ok(options)
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    let options = match parse_options(attr, &kind) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sync_sig = input.sig.clone();
    sync_sig.asyncness = None;

    let attrs = input.attrs;
    let vis = input.vis;
    let block = input.block;

    let runtime = if options.start_paused {
        quote! {
            ::core_async::runtime::Builder::new_current_thread()
                .enable_all()
                .start_paused(true)
                .build()
                .expect("core_async::test: failed to build paused Tokio runtime")
                .block_on(async move #block)
        }
    } else {
        quote! {
            ::core_async::runtime::block_on(async move #block)
        }
    };

    let test_attr = match kind {
        MacroKind::Test => quote!(#[test]),
        MacroKind::Main => quote!(),
    };

    quote! {
        #(#attrs)*
        #test_attr
        #vis #sync_sig {
            #runtime
        }
    }
    .into()
}
