//! Procedural macros for admin-dispatch

use std::collections::BTreeMap;

use darling::ast::{Data, Fields, Style};
use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput, Ident};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: Ident,
    data: Data<ActionVariant, ()>,

    /// Group variants into categories named after their resource prefix
    #[darling(default)]
    infer_categories: bool,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: Ident,
    fields: Fields<()>,

    #[darling(default)]
    category: Option<String>,

    #[darling(default)]
    skip_category: bool,
}

impl ActionVariant {
    /// Pattern matching this variant whatever its shape.
    fn pattern(&self, enum_name: &Ident) -> TokenStream2 {
        let ident = &self.ident;
        match self.fields.style {
            Style::Unit => quote! { #enum_name::#ident },
            Style::Tuple => quote! { #enum_name::#ident(..) },
            Style::Struct => quote! { #enum_name::#ident { .. } },
        }
    }

    fn resolved_category(&self) -> Option<String> {
        if self.skip_category {
            return None;
        }
        self.category
            .clone()
            .or_else(|| infer_category(&self.ident.to_string()))
    }
}

// Verbs that end an action name. The words before the verb name the
// resource: "UsersAdminFetch" is about "users_admin".
const ACTION_VERBS: &[&str] = &[
    "Fetch", "Get", "Load", "Refresh", "Search",
    "Add", "Create", "Update", "Delete", "Remove", "Save", "Set", "Clear",
    "Start", "End", "Submit", "Confirm", "Cancel", "Reset",
    "Show", "Hide", "Enable", "Disable", "Toggle",
];

/// Prefix of lifecycle result variants (`DidStart`, `DidFail`, ...)
const RESULT_PREFIX: &str = "Did";
const RESULT_CATEGORY: &str = "async_result";

/// "UsersAdminFetch" -> ["Users", "Admin", "Fetch"]
fn pascal_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, ch) in s.char_indices().skip(1) {
        if ch.is_uppercase() {
            words.push(&s[start..i]);
            start = i;
        }
    }
    if start < s.len() {
        words.push(&s[start..]);
    }
    words
}

fn snake_case(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|head| head.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect()
}

/// Category of a variant name: the words before its first verb.
///
/// A leading verb, a single word, or a name without any verb is
/// uncategorized.
fn infer_category(name: &str) -> Option<String> {
    let words = pascal_words(name);
    match words.as_slice() {
        [first, ..] if *first == RESULT_PREFIX => Some(RESULT_CATEGORY.to_string()),
        [first, rest @ ..] if !rest.is_empty() && !ACTION_VERBS.contains(first) => {
            let verb_at = rest.iter().position(|w| ACTION_VERBS.contains(w))? + 1;
            Some(snake_case(&words[..verb_at]))
        }
        _ => None,
    }
}

/// Derive macro for the `Action` trait.
///
/// Generates `name()`, returning the variant name.
///
/// With `#[action(infer_categories)]` it also generates a
/// `{Name}Category` enum, `category()`, `category_enum()`, one
/// `is_{category}()` predicate per category, and an `ActionCategory`
/// impl. `#[action(category = "...")]` on a variant overrides the
/// inferred category, `#[action(skip_category)]` leaves it out.
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories)]
/// enum Action {
///     UsersFetch(PageRequest),
///     UsersAdminFetch(PageRequest),
///     UserDelete(String),
///     DidStart(Ticket),
///     Tick,
/// }
///
/// let action = Action::UsersFetch(PageRequest::default());
/// assert_eq!(action.name(), "UsersFetch");
/// assert_eq!(action.category(), Some("users"));
/// assert!(action.is_users());
/// assert!(Action::DidStart(ticket).is_async_result());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };
    let Data::Enum(variants) = &opts.data else {
        return syn::Error::new_spanned(&input, "Action can only be derived for enums")
            .to_compile_error()
            .into();
    };

    let mut expanded = name_impl(&opts.ident, variants);
    if opts.infer_categories {
        expanded.extend(category_impl(&opts.ident, variants));
    }
    expanded.into()
}

fn name_impl(name: &Ident, variants: &[ActionVariant]) -> TokenStream2 {
    let arms = variants.iter().map(|v| {
        let pattern = v.pattern(name);
        let label = v.ident.to_string();
        quote! { #pattern => #label }
    });

    quote! {
        impl admin_dispatch::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#arms,)*
                }
            }
        }
    }
}

fn category_impl(name: &Ident, variants: &[ActionVariant]) -> TokenStream2 {
    let enum_name = format_ident!("{}Category", name);

    let resolved: Vec<_> = variants.iter().map(|v| (v, v.resolved_category())).collect();

    // BTreeMap keeps the generated enum in a stable order
    let mut members: BTreeMap<&str, Vec<TokenStream2>> = BTreeMap::new();
    for (variant, category) in &resolved {
        if let Some(category) = category {
            members
                .entry(category.as_str())
                .or_default()
                .push(variant.pattern(name));
        }
    }

    let labels: Vec<&str> = members.keys().copied().collect();
    let idents: Vec<Ident> = labels
        .iter()
        .map(|label| format_ident!("{}", pascal_case(label)))
        .collect();

    let category_arms = resolved.iter().map(|(variant, category)| {
        let pattern = variant.pattern(name);
        match category {
            Some(label) => quote! { #pattern => ::core::option::Option::Some(#label) },
            None => quote! { #pattern => ::core::option::Option::None },
        }
    });
    let enum_arms = resolved.iter().map(|(variant, category)| {
        let pattern = variant.pattern(name);
        let member = match category {
            Some(label) => format_ident!("{}", pascal_case(label)),
            None => format_ident!("Uncategorized"),
        };
        quote! { #pattern => #enum_name::#member }
    });
    let predicates = members.iter().map(|(label, patterns)| {
        let predicate = format_ident!("is_{}", label);
        let doc = format!("Whether this action is in the `{label}` category.");
        quote! {
            #[doc = #doc]
            pub fn #predicate(&self) -> bool {
                matches!(self, #(#patterns)|*)
            }
        }
    });
    let enum_doc = format!("Categories of [`{name}`] actions.");

    quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #enum_name {
            #(#idents,)*
            Uncategorized,
        }

        impl #enum_name {
            pub fn all() -> &'static [Self] {
                &[#(Self::#idents,)* Self::Uncategorized]
            }

            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#idents => #labels,)*
                    Self::Uncategorized => "uncategorized",
                }
            }
        }

        impl #name {
            pub fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#category_arms,)*
                }
            }

            pub fn category_enum(&self) -> #enum_name {
                match self {
                    #(#enum_arms,)*
                }
            }

            #(#predicates)*
        }

        impl admin_dispatch::ActionCategory for #name {
            type Category = #enum_name;

            fn category(&self) -> ::core::option::Option<&'static str> {
                #name::category(self)
            }

            fn category_enum(&self) -> Self::Category {
                #name::category_enum(self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_words() {
        assert_eq!(pascal_words("UsersAdminFetch"), vec!["Users", "Admin", "Fetch"]);
        assert_eq!(pascal_words("Tick"), vec!["Tick"]);
        assert!(pascal_words("").is_empty());
    }

    #[test]
    fn test_infer_category() {
        assert_eq!(infer_category("UsersFetch").as_deref(), Some("users"));
        assert_eq!(infer_category("UsersAdminFetch").as_deref(), Some("users_admin"));
        assert_eq!(infer_category("RolesFetch").as_deref(), Some("roles"));
        assert_eq!(infer_category("UserCreate").as_deref(), Some("user"));
        assert_eq!(
            infer_category("UserManagementReset").as_deref(),
            Some("user_management")
        );
        assert_eq!(infer_category("DidFail").as_deref(), Some("async_result"));
    }

    #[test]
    fn test_infer_category_uncategorized() {
        assert_eq!(infer_category("RefreshUsers"), None);
        assert_eq!(infer_category("Tick"), None);
        assert_eq!(infer_category("UserProfile"), None);
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(snake_case(&["User", "Management"]), "user_management");
        assert_eq!(pascal_case("users_admin"), "UsersAdmin");
        assert_eq!(pascal_case("async_result"), "AsyncResult");
    }
}
