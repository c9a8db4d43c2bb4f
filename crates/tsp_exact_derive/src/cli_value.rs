use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Variant, spanned::Spanned};

use crate::utils;

/// One accepted spelling set for an enum variant.
struct ValueSpec {
    ident: Ident,
    canonical: String,
    aliases: Vec<String>,
}

pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "CliValue can only be derived for enums",
        ));
    };

    let enum_ident = &input.ident;
    let option_name = option_name(&input.attrs, enum_ident)?;
    let specs = data_enum
        .variants
        .iter()
        .map(value_spec)
        .collect::<syn::Result<Vec<_>>>()?;

    let parse_arms = specs.iter().map(|spec| {
        let ident = &spec.ident;
        let spellings = std::iter::once(&spec.canonical)
            .chain(&spec.aliases)
            .map(|value| LitStr::new(value, Span::call_site()));
        quote! { #(#spellings)|* => Ok(Self::#ident), }
    });
    let name_arms = specs.iter().map(|spec| {
        let ident = &spec.ident;
        let canonical = LitStr::new(&spec.canonical, Span::call_site());
        quote! { Self::#ident => #canonical, }
    });

    let expected = specs
        .iter()
        .map(|spec| spec.canonical.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let expected_lit = LitStr::new(&expected, Span::call_site());
    let option_lit = LitStr::new(&option_name, Span::call_site());

    Ok(quote! {
        impl #enum_ident {
            /// Case-insensitive match against the canonical names and aliases.
            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_option(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        #expected_lit
                    ))),
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    })
}

/// `#[cli_value(option = "...")]`, defaulting to the kebab-cased enum name.
fn option_name(attrs: &[Attribute], enum_ident: &Ident) -> syn::Result<String> {
    let mut name = utils::to_kebab_case(&enum_ident.to_string());
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("cli_value")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                name = meta.value()?.parse::<LitStr>()?.value();
                return Ok(());
            }
            Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
        })?;
    }
    Ok(name)
}

fn value_spec(variant: &Variant) -> syn::Result<ValueSpec> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(syn::Error::new(
            variant.span(),
            "CliValue only supports enums with unit variants",
        ));
    }

    let mut spec = ValueSpec {
        ident: variant.ident.clone(),
        canonical: utils::to_kebab_case(&variant.ident.to_string()),
        aliases: Vec::new(),
    };
    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("cli")) {
        attr.parse_nested_meta(|meta| {
            let value = meta.value()?.parse::<LitStr>()?.value();
            if meta.path.is_ident("name") {
                spec.canonical = value;
            } else if meta.path.is_ident("alias") {
                spec.aliases.push(value);
            } else {
                return Err(meta.error("unsupported cli attribute; expected name/alias"));
            }
            Ok(())
        })?;
    }
    Ok(spec)
}
