#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the flag workspace.
//!
//! * [`macro@jsk_error`] removes the boilerplate around domain error enums.
//! * [`macro@flag_set`] turns a plain struct into a typed view over a
//!   `jsk_flags::FlagRegistry`.
//!
//! Generated code refers to `::jsk_flags` and `::thiserror` by absolute path, so consuming
//! crates must depend on them directly.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Type Aliasing**: Emits a `Result<T, E = ErrorName>` alias next to the enum.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()` to any
///   `Result` carrying this error (or one of its source errors).
/// * **Standard Conversions**: Implements `From<T>` for variants with a `source` field so `?`
///   works on upstream errors.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a `source` field must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use jsk_derive::jsk_error;
/// use std::borrow::Cow;
///
/// #[jsk_error]
/// pub enum LoadError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<String> {
///     std::fs::read_to_string("flags.env").context("Reading flag file")
/// }
/// ```
#[proc_macro_attribute]
pub fn jsk_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Attribute macro declaring a typed flag set.
///
/// Every named field becomes one flag. Supported field types are `bool`, `i64`, `f64` and
/// `String`; anything else is rejected at compile time, as are duplicate flag names.
///
/// The struct is rewritten into a handle around a `jsk_flags::FlagRegistry` with:
///
/// * an associated `&'static str` constant per flag (the upper-cased field name),
/// * `specs()`, `builder()`, `new()`, `from_registry()` and `registry()`,
/// * a getter `field()` and a setter `set_field(value)` per flag.
///
/// # Arguments
///
/// * `prefix = "..."` - Environment prefix passed to the registry builder.
///
/// # Field attributes
///
/// * `#[flag(name = "...")]` - Explicit flag name.
/// * `#[flag(default = <expr>)]` - Literal default, converted into the field type.
/// * `#[flag(computed = <path>)]` - Function `fn(&FlagView<'_>) -> jsk_flags::Result<T>`.
/// * `#[flag(handler = <path>)]` - Reserved handler stored alongside the definition.
///
/// # Example
///
/// ```rust,ignore
/// #[jsk_derive::flag_set(prefix = "APP_")]
/// pub struct AppFlags {
///     verbose: bool,
///     #[flag(default = 8)]
///     workers: i64,
/// }
///
/// let flags = AppFlags::new()?;
/// flags.set_verbose(true)?;
/// assert!(flags.verbose()?);
/// ```
#[proc_macro_attribute]
pub fn flag_set(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::flag_set::expand_flag_set(args.into(), input).into()
}
