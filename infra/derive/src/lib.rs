#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the action bus workspace.
//!
//! * [`macro@actions`] turns a declared action set into an eagerly built accessor
//!   surface (one dispatcher method and one stream accessor per action).
//! * [`macro@actbus_error`] removes the boilerplate around `thiserror` error enums.
//!
//! Generated surfaces refer to items through the `actbus` facade crate, so
//! consumers should depend on `actbus` rather than on this crate directly.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro that generates an action surface from a declared action set.
///
/// Each named field declares one action: the field name is the action name and
/// the field type is the value published on its channel. The optional
/// `#[action(input = Type)]` attribute declares the raw argument type accepted by
/// the dispatcher when a transform normalizes it; without it the dispatcher
/// accepts the value type itself.
///
/// # Generated Items
///
/// * A struct with the same name whose fields are private dispatchers, so the
///   surface cannot be assigned to from outside the defining module.
/// * `ACTIONS`: the declared action names, in declaration order.
/// * `create(&ActionBus, &TransformTable) -> Result<Self, BusError>`.
/// * `fn <action>(&self, args) -> Result<(), BusError>` per action (dispatch).
/// * `fn <action>_stream(&self) -> Result<ActionStream<T>, BusError>` per action
///   (the `<action>$` accessor).
/// * `bus()` and `teardown()`.
///
/// The names `bus`, `teardown` and `create` are reserved, as is any
/// `<action>_stream` that would shadow another declared action.
///
/// # Example
///
/// ```rust,ignore
/// #[actbus::actions]
/// pub struct UiActions {
///     search: String,
///     #[action(input = RawInput)]
///     count: i64,
/// }
///
/// let bus = actbus::ActionBus::new();
/// let transforms = actbus::TransformTable::new().map("count", coerce_number);
/// let actions = UiActions::create(&bus, &transforms)?;
///
/// actions.search("abc".to_owned())?;
/// let _sub = actions.count_stream()?.subscribe(|count: &i64| tracing::info!(count));
/// ```
#[proc_macro_attribute]
pub fn actions(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::actions::expand_actions(args.into(), input).into()
}

/// A high-level attribute macro for defining domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a source
///   field, enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides `From<&str>` and `From<String>` when an
///   `Internal` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source` field (or a field marked
///    `#[source]`/`#[from]`) and a context field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[actbus_derive::actbus_error]
/// pub enum LoadError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, LoadError> {
///     std::fs::read_to_string(path).context("Reading action fixtures")
/// }
/// ```
#[proc_macro_attribute]
pub fn actbus_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}
