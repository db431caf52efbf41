//! The flag set read by the Jishaku debugging extension.
//!
//! Every flag can be overridden through the environment, e.g. `JISHAKU_HIDE=1`, or
//! programmatically through [`JishakuFlags::set_hide`] and friends.

use crate::error::Result;
use crate::registry::FlagView;

/// Flags consulted by the host command framework.
#[jsk_derive::flag_set]
pub struct JishakuFlags {
    /// Hides the base command group.
    hide: bool,
    /// Enables retention mode for REPL sessions by default.
    retain: bool,
    /// Stops prefixing REPL meta variables with an underscore.
    no_underscore: bool,
    /// Prefix placed before builtin REPL variables. Best set programmatically.
    #[flag(computed = default_scope_prefix)]
    scope_prefix: String,
    /// Always uses paginators instead of relying on file previews.
    force_paginator: bool,
    /// Sends verbose tracebacks to the invoking channel instead of a direct message.
    no_dm_traceback: bool,
    /// Uses the braille J in the shutdown command.
    use_braille_j: bool,
}

fn default_scope_prefix(flags: &FlagView<'_>) -> Result<String> {
    let prefix = if flags.get_as::<bool>(JishakuFlags::NO_UNDERSCORE)? { "" } else { "_" };
    Ok(prefix.to_owned())
}
