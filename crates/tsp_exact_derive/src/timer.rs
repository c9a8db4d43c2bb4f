use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{ItemFn, LitStr, ReturnType, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let label = if attr.is_empty() {
        None
    } else {
        Some(parse_macro_input!(attr as LitStr))
    };
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(item as ItemFn);

    if sig.asyncness.is_some() {
        return syn::Error::new_spanned(&sig, "timer does not support async functions")
            .to_compile_error()
            .into();
    }

    let label = label.unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), Span::call_site()));
    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            let __timer_start = std::time::Instant::now();
            let __timer_result = (|| -> #output #block)();
            log::debug!(
                "{}: elapsed_ms={:.3}",
                #label,
                __timer_start.elapsed().as_secs_f64() * 1_000.0
            );
            __timer_result
        }
    };

    TokenStream::from(expanded)
}
