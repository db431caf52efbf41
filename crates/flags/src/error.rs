//! # Flag Errors
//!
//! This module defines the [`FlagError`] enum and [`Result`] type used by declaration,
//! resolution and override paths.

use crate::value::FlagType;
use std::borrow::Cow;

/// A specialized [`FlagError`] enum for flag registry failures.
#[jsk_derive::jsk_error]
pub enum FlagError {
    /// The schema is malformed: unresolved type, duplicate or invalid name, or a default of
    /// the wrong type. Raised while building the registry and fatal to startup.
    #[error("Invalid flag declaration{}: {message}", format_context(.context))]
    Declaration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A value of the wrong type was supplied for a flag.
    #[error(
        "Attempted to set flag {name} to type {actual} (should be {expected}){}",
        format_context(.context)
    )]
    TypeMismatch {
        name: String,
        expected: FlagType,
        actual: FlagType,
        context: Option<Cow<'static, str>>,
    },

    /// A textual value could not be converted into the declared type.
    #[error(
        "Cannot convert '{value}' for flag {name} to {expected}{}: {reason}",
        format_context(.context)
    )]
    Conversion {
        name: String,
        value: String,
        expected: FlagType,
        reason: String,
        context: Option<Cow<'static, str>>,
    },

    /// The name was never declared in this registry.
    #[error("Unknown flag {name}{}", format_context(.context))]
    UnknownFlag { name: String, context: Option<Cow<'static, str>> },

    /// Computed defaults nested deeper than the registry allows, usually a cycle.
    #[error(
        "Computed default for flag {name} exceeded nesting depth {depth}{}",
        format_context(.context)
    )]
    DefaultCycle { name: String, depth: usize, context: Option<Cow<'static, str>> },
}

impl FlagError {
    pub(crate) fn declaration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Declaration { message: message.into(), context: None }
    }

    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownFlag { name: name.to_owned(), context: None }
    }
}
