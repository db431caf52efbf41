//! Lazily-resolved, environment-aware feature flags.
//!
//! A [`FlagRegistry`] holds a closed set of named, typed flags. Every read resolves the flag
//! from scratch, checking sources in priority order:
//!
//! 1. a programmatic override stored with [`FlagRegistry::set`],
//! 2. the environment variable `<prefix><NAME>` (prefix `JISHAKU_` by default),
//! 3. a literal or computed default,
//! 4. the zero value of the declared type.
//!
//! Because nothing is cached, an override or an environment change made after start-up is
//! visible on the very next read.
//!
//! ## Boolean environment values
//!
//! `true`, `t`, `yes`, `y`, `on`, `1` enable a flag and `false`, `f`, `no`, `n`, `off`, `0`
//! disable it, ignoring case. Any other word is ignored and resolution falls through to the
//! default. Other types must parse, otherwise [`FlagError::Conversion`] is returned.
//!
//! ## Overrides
//!
//! Overrides are terminal: there is no way to return a flag to its environment or default
//! source once it has been set, only to replace the override with another value.
//!
//! ## Computed defaults
//!
//! A computed default receives a [`FlagView`] and may read other flags, always observing
//! their current values. Nesting is bounded by [`RegistryBuilder::max_default_depth`]; a
//! cycle between computed defaults fails with [`FlagError::DefaultCycle`].
//!
//! ## Example
//!
//! ```rust
//! use jsk_flags::{JishakuFlags, MapEnv};
//!
//! # fn main() -> jsk_flags::Result<()> {
//! let env = MapEnv::new();
//! let flags = JishakuFlags::from_registry(JishakuFlags::builder().environment(env.clone()).build()?);
//!
//! assert_eq!(flags.scope_prefix()?, "_");
//!
//! env.set("JISHAKU_NO_UNDERSCORE", "true");
//! assert_eq!(flags.scope_prefix()?, "");
//!
//! flags.set_hide(true)?;
//! env.set("JISHAKU_HIDE", "0");
//! assert!(flags.hide()?);
//! # Ok(())
//! # }
//! ```

extern crate self as jsk_flags;

mod env;
mod error;
mod jishaku;
mod registry;
mod schema;
mod value;

pub use env::{DEFAULT_PREFIX, DISABLED_SYMBOLS, ENABLED_SYMBOLS, EnvSource, MapEnv, ProcessEnv, parse_bool};
pub use error::{FlagError, FlagErrorExt, Result};
pub use jishaku::JishakuFlags;
pub use jsk_derive::flag_set;
pub use registry::{DEFAULT_MAX_DEPTH, FlagRegistry, FlagSource, FlagView, RegistryBuilder, Resolved};
pub use schema::{ComputedDefault, DefaultProvider, FlagDefinition, FlagHandler, FlagSpec};
pub use value::{FlagKind, FlagType, FlagValue};

pub mod prelude {
    pub use crate::error::{FlagError, FlagErrorExt};
    pub use crate::jishaku::JishakuFlags;
    pub use crate::registry::{FlagRegistry, FlagSource, FlagView};
    pub use crate::schema::FlagSpec;
    pub use crate::value::{FlagType, FlagValue};
    pub use jsk_derive::flag_set;
}
