//! Derive macros for GreedTicket action enums
//!
//! Ticket actions mix commands (requests such as "issue a ticket") with
//! events (facts such as "ticket expired"). `#[derive(Action)]` lets the
//! enum declare which is which and generates the classification helpers
//! used by reducers and logs.
//!
//! # Example
//!
//! ```ignore
//! use greed_ticket_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TicketAction {
//!     #[command]
//!     InvalidateTicket,
//!
//!     #[event]
//!     TicketExpired { ticket_id: String },
//! }
//!
//! assert!(TicketAction::InvalidateTicket.is_command());
//! assert_eq!(
//!     TicketAction::TicketExpired { ticket_id: "t-1".into() }.event_type(),
//!     "TicketExpired.v1"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods:
/// - `is_command()` - true for variants marked `#[command]`
/// - `is_event()` - true for variants marked `#[event]`
/// - `event_type()` - versioned name of an event (`"TicketIssued.v1"`),
///   `"unknown"` for commands
/// - `action_name()` - bare variant name for every variant, handy as a
///   structured log field
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
///
/// A compile error is produced when the derive is applied to a non-enum
/// type or when a variant carries both attributes.
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut is_command_arms = Vec::new();
    let mut is_event_arms = Vec::new();
    let mut event_type_arms = Vec::new();
    let mut action_name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(variant, "Variant cannot be both #[command] and #[event]")
                .to_compile_error()
                .into();
        }

        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let variant_name = variant.ident.to_string();

        if is_command {
            is_command_arms.push(quote! { #pattern => true, });
        }

        if is_event {
            let type_name = format!("{variant_name}.v1");
            is_event_arms.push(quote! { #pattern => true, });
            event_type_arms.push(quote! { #pattern => #type_name, });
        }

        action_name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#is_command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#is_event_arms)*
                    _ => false,
                }
            }

            /// Returns the versioned event type name
            ///
            /// Only events have type names. Commands return "unknown".
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn event_type(&self) -> &'static str {
                match self {
                    #(#event_type_arms)*
                    _ => "unknown",
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#action_name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern that ignores the payload of a variant
fn variant_pattern(variant: &Ident, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(_) => quote! { Self::#variant { .. } },
        Fields::Unnamed(_) => quote! { Self::#variant(..) },
        Fields::Unit => quote! { Self::#variant },
    }
}

fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
