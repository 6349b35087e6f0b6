//! Procedural macros for unistate

use std::collections::BTreeMap;

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Event)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(event), supports(enum_any))]
struct EventOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<EventVariant, ()>,

    /// Enable automatic category inference from variant name prefixes
    #[darling(default)]
    infer_categories: bool,

    /// Also implement `EventSummary` with its Debug-based default
    #[darling(default)]
    summary: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(event))]
struct EventVariant {
    ident: syn::Ident,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,
}

// Words that end the subject part of an event name. Nouns like "Form" or
// "Results" must not be listed here.
const EVENT_VERBS: &[&str] = &[
    // Intents
    "Start", "Stop", "Open", "Close", "Submit", "Confirm", "Cancel", "Retry", "Refresh",
    // CRUD
    "Add", "Remove", "Clear", "Update", "Set", "Get", "Load", "Save", "Delete", "Create",
    "Fetch",
    // Visibility and focus
    "Show", "Hide", "Toggle", "Focus", "Select", "Reset",
    // Past-tense user and lifecycle signals
    "Tapped", "Changed", "Entered", "Dismissed", "Selected", "Cleared", "Requested",
    "Appeared", "Disappeared", "Expired",
];

fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn to_snake_case(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Infer a category from a variant name.
///
/// - `PaymentDidFail` -> `payment` (everything before `Did`)
/// - `DidConnect` -> `async_result`
/// - `QueryChanged`, `SearchResultsClear` -> `query`, `search_results`
///   (everything before the first verb)
/// - `SubmitTapped`, `Appeared` -> none (leading verb or single word)
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    let first = parts.first()?;

    if first == "Did" {
        return Some("async_result".to_string());
    }
    if parts.len() < 2 || EVENT_VERBS.contains(&first.as_str()) {
        return None;
    }

    let subject_end = parts
        .iter()
        .skip(1)
        .position(|part| part == "Did" || EVENT_VERBS.contains(&part.as_str()))?
        + 1;

    Some(to_snake_case(&parts[..subject_end]))
}

/// Derive macro for the Event trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// With `#[event(infer_categories)]`, also generates:
/// - `category() -> Option<&'static str>` - Get the event's category
/// - `category_enum() -> {Name}Category` - Get category as enum
/// - `is_{category}()` predicates for each category
/// - `{Name}Category` enum with all discovered categories
/// - an `EventCategory` implementation
///
/// With `#[event(summary)]`, also implements `EventSummary` using `Debug`.
///
/// Variants accept `#[event(category = "...")]` and `#[event(skip_category)]`.
///
/// # Example
/// ```ignore
/// #[derive(Event, Clone, Debug)]
/// #[event(infer_categories)]
/// enum CheckoutEvent {
///     SubmitTapped,
///     PaymentDidSucceed(Receipt),
///     PaymentDidFail(String),
///     ErrorDismissed,
///     Appeared,  // uncategorized
/// }
///
/// let event = CheckoutEvent::PaymentDidFail("card declined".into());
/// assert_eq!(event.name(), "PaymentDidFail");
/// assert_eq!(event.category(), Some("payment"));
/// assert!(event.is_payment());
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match EventOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Event can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        let variant_str = variant.to_string();
        quote! { #name::#variant { .. } => #variant_str }
    });

    let mut expanded = quote! {
        impl #impl_generics ::unistate::Event for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms,)*
                }
            }
        }
    };

    if opts.summary {
        expanded = quote! {
            #expanded

            impl #impl_generics ::unistate::EventSummary for #name #ty_generics #where_clause {}
        };
    }

    if !opts.infer_categories {
        return TokenStream::from(expanded);
    }

    let mut categories: BTreeMap<String, Vec<&Ident>> = BTreeMap::new();
    let mut variant_categories: Vec<(&Ident, Option<String>)> = Vec::new();

    for v in variants.iter() {
        let category = if v.skip_category {
            None
        } else if let Some(explicit) = &v.category {
            Some(explicit.clone())
        } else {
            infer_category(&v.ident.to_string())
        };

        if let Some(category) = &category {
            categories.entry(category.clone()).or_default().push(&v.ident);
        }
        variant_categories.push((&v.ident, category));
    }

    let category_enum_name = format_ident!("{}Category", name);
    let category_variants: Vec<_> = categories
        .keys()
        .map(|c| format_ident!("{}", to_pascal_case(c)))
        .collect();
    let category_names: Vec<_> = categories.keys().cloned().collect();

    let category_arms = variant_categories.iter().map(|(variant, category)| {
        let value = match category {
            Some(c) => quote! { ::core::option::Option::Some(#c) },
            None => quote! { ::core::option::Option::None },
        };
        quote! { #name::#variant { .. } => #value }
    });

    let category_enum_arms = variant_categories.iter().map(|(variant, category)| {
        let category_variant = match category {
            Some(c) => format_ident!("{}", to_pascal_case(c)),
            None => format_ident!("Uncategorized"),
        };
        quote! { #name::#variant { .. } => #category_enum_name::#category_variant }
    });

    let predicates = categories.iter().map(|(category, members)| {
        let predicate = format_ident!("is_{}", category);
        let doc = format!("Returns true if this event belongs to the `{category}` category.");
        quote! {
            #[doc = #doc]
            pub fn #predicate(&self) -> bool {
                matches!(self, #(#name::#members { .. })|*)
            }
        }
    });

    let category_enum_doc = format!(
        "Event categories for [`{name}`].\n\n\
         Use [`{name}::category_enum()`] to get the category of an event."
    );

    expanded = quote! {
        #expanded

        #[doc = #category_enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #category_enum_name {
            #(#category_variants,)*
            /// Events that don't belong to any specific category.
            Uncategorized,
        }

        impl #category_enum_name {
            /// All category values
            pub fn all() -> &'static [Self] {
                &[#(Self::#category_variants,)* Self::Uncategorized]
            }

            /// Category name as string
            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#category_variants => #category_names,)*
                    Self::Uncategorized => "uncategorized",
                }
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// The event's category, if it has one
            pub fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#category_arms,)*
                }
            }

            /// The category as an enum value
            pub fn category_enum(&self) -> #category_enum_name {
                match self {
                    #(#category_enum_arms,)*
                }
            }

            #(#predicates)*
        }

        impl #impl_generics ::unistate::EventCategory for #name #ty_generics #where_clause {
            type Category = #category_enum_name;

            fn category(&self) -> ::core::option::Option<&'static str> {
                #name::category(self)
            }

            fn category_enum(&self) -> Self::Category {
                #name::category_enum(self)
            }
        }
    };

    TokenStream::from(expanded)
}
