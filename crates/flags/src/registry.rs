use crate::env::{self, DEFAULT_PREFIX, EnvSource, ProcessEnv};
use crate::error::{FlagError, FlagErrorExt, Result};
use crate::schema::{DefaultProvider, FlagDefinition, FlagSpec};
use crate::value::{FlagKind, FlagType, FlagValue};
use arc_swap::ArcSwapOption;
use fxhash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use std::env::VarError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Nesting limit for computed defaults that read other flags.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSource {
    Override,
    Environment,
    Default,
    Empty,
}

impl fmt::Display for FlagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Override => "override",
            Self::Environment => "environment",
            Self::Default => "default",
            Self::Empty => "empty",
        })
    }
}

/// A value together with the source that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub value: FlagValue,
    pub source: FlagSource,
}

struct FlagSlot {
    definition: FlagDefinition,
    overridden: ArcSwapOption<FlagValue>,
}

struct RegistryInner {
    slots: Vec<FlagSlot>,
    index: FxHashMap<String, usize>,
    env: Box<dyn EnvSource>,
    prefix: Cow<'static, str>,
    max_depth: usize,
}

impl RegistryInner {
    fn slot(&self, name: &str) -> Result<&FlagSlot> {
        self.index.get(name).map(|&i| &self.slots[i]).ok_or_else(|| FlagError::unknown(name))
    }

    fn env_key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

/// A closed set of flags resolved on every access.
///
/// Cloning is cheap and every clone shares the same override slots. Reads never mutate
/// state; writes replace a single flag's override atomically.
///
/// # Example
///
/// ```rust
/// use jsk_flags::{FlagRegistry, FlagSpec, MapEnv};
///
/// # fn main() -> jsk_flags::Result<()> {
/// let env = MapEnv::new();
/// let flags = FlagRegistry::builder()
///     .environment(env.clone())
///     .flag(FlagSpec::of::<bool>("HIDE"))
///     .build()?;
///
/// assert!(!flags.get_as::<bool>("HIDE")?);
/// env.set("JISHAKU_HIDE", "yes");
/// assert!(flags.get_as::<bool>("HIDE")?);
/// flags.set("HIDE", false)?;
/// assert!(!flags.get_as::<bool>("HIDE")?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FlagRegistry {
    inner: Arc<RegistryInner>,
}

impl FlagRegistry {
    #[must_use = "Builder must be given flags and built before use"]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolves `name` from override, environment, default, then the type's zero value.
    ///
    /// # Errors
    /// [`FlagError::UnknownFlag`], [`FlagError::Conversion`] for unparsable non-boolean
    /// environment values, or any error raised by a computed default.
    pub fn get(&self, name: &str) -> Result<FlagValue> {
        self.view().get(name)
    }

    /// Resolves `name` as a concrete Rust type.
    ///
    /// # Errors
    /// As [`FlagRegistry::get`], plus [`FlagError::TypeMismatch`] when `T` is not the
    /// declared type.
    pub fn get_as<T: FlagKind>(&self, name: &str) -> Result<T> {
        self.view().get_as(name)
    }

    /// Resolves `name` and reports which source won.
    ///
    /// # Errors
    /// As [`FlagRegistry::get`].
    pub fn resolve(&self, name: &str) -> Result<Resolved> {
        self.view().resolve(name)
    }

    /// Stores a standing override for `name`.
    ///
    /// The override wins over environment and defaults until it is replaced. A value of
    /// the wrong type leaves the current override untouched.
    ///
    /// # Errors
    /// [`FlagError::UnknownFlag`] or [`FlagError::TypeMismatch`].
    pub fn set(&self, name: &str, value: impl Into<FlagValue>) -> Result<()> {
        let slot = self.inner.slot(name)?;
        let value = value.into();
        let expected = slot.definition.flag_type();

        if value.flag_type() != expected {
            return Err(FlagError::TypeMismatch {
                name: name.to_owned(),
                expected,
                actual: value.flag_type(),
                context: None,
            });
        }

        debug!(flag = name, value = %value, "Flag override set");
        slot.overridden.store(Some(Arc::new(value)));
        Ok(())
    }

    /// Parses `raw` according to the declared type and stores it as an override.
    ///
    /// Unlike environment values, an unrecognised boolean word is rejected here.
    ///
    /// # Errors
    /// [`FlagError::UnknownFlag`] or [`FlagError::Conversion`].
    pub fn set_parsed(&self, name: &str, raw: &str) -> Result<()> {
        let ty = self.inner.slot(name)?.definition.flag_type();
        let value = parse_for(name, ty, raw.trim())?;
        self.set(name, value)
    }

    /// Returns `true` once an override has been stored for `name`.
    ///
    /// # Errors
    /// [`FlagError::UnknownFlag`].
    pub fn is_overridden(&self, name: &str) -> Result<bool> {
        Ok(self.inner.slot(name)?.overridden.load().is_some())
    }

    /// # Errors
    /// [`FlagError::UnknownFlag`].
    pub fn definition(&self, name: &str) -> Result<&FlagDefinition> {
        Ok(&self.inner.slot(name)?.definition)
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.inner.slots.iter().map(|slot| &slot.definition)
    }

    /// Environment variable consulted for `name`.
    ///
    /// # Errors
    /// [`FlagError::UnknownFlag`].
    pub fn env_key(&self, name: &str) -> Result<String> {
        self.inner.slot(name)?;
        Ok(self.inner.env_key(name))
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    fn view(&self) -> FlagView<'_> {
        FlagView { inner: &self.inner, depth: 0 }
    }
}

impl fmt::Debug for FlagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagRegistry")
            .field("prefix", &self.inner.prefix)
            .field("flags", &self.inner.slots.iter().map(|s| s.definition.name()).collect::<Vec<_>>())
            .field("env", &self.inner.env)
            .finish()
    }
}

/// Read-only access to a registry, handed to computed defaults.
///
/// Each nested computed default runs one level deeper; exceeding the registry's limit
/// yields [`FlagError::DefaultCycle`].
#[derive(Clone, Copy)]
pub struct FlagView<'a> {
    inner: &'a RegistryInner,
    depth: usize,
}

impl FlagView<'_> {
    /// # Errors
    /// See [`FlagRegistry::get`].
    pub fn get(&self, name: &str) -> Result<FlagValue> {
        self.resolve(name).map(|resolved| resolved.value)
    }

    /// # Errors
    /// See [`FlagRegistry::get_as`].
    pub fn get_as<T: FlagKind>(&self, name: &str) -> Result<T> {
        let slot = self.inner.slot(name)?;
        let declared = slot.definition.flag_type();
        if declared != T::TYPE {
            return Err(FlagError::TypeMismatch {
                name: name.to_owned(),
                expected: declared,
                actual: T::TYPE,
                context: Some("typed read".into()),
            });
        }

        let resolved = self.resolve_slot(slot)?;
        T::from_value(resolved.value).ok_or_else(|| FlagError::TypeMismatch {
            name: name.to_owned(),
            expected: declared,
            actual: T::TYPE,
            context: Some("typed read".into()),
        })
    }

    /// # Errors
    /// See [`FlagRegistry::resolve`].
    pub fn resolve(&self, name: &str) -> Result<Resolved> {
        let slot = self.inner.slot(name)?;
        self.resolve_slot(slot)
    }

    fn resolve_slot(&self, slot: &FlagSlot) -> Result<Resolved> {
        let definition = &slot.definition;
        let name = definition.name();

        let (value, source) = if let Some(value) = slot.overridden.load_full() {
            (FlagValue::clone(&value), FlagSource::Override)
        } else if let Some(value) = self.from_environment(definition)? {
            (value, FlagSource::Environment)
        } else {
            match definition.default_provider() {
                Some(DefaultProvider::Value(value)) => (value.clone(), FlagSource::Default),
                Some(DefaultProvider::Computed(computed)) => {
                    if self.depth >= self.inner.max_depth {
                        return Err(FlagError::DefaultCycle {
                            name: name.to_owned(),
                            depth: self.inner.max_depth,
                            context: None,
                        });
                    }
                    let nested = FlagView { inner: self.inner, depth: self.depth + 1 };
                    (computed.compute(&nested)?, FlagSource::Default)
                },
                None => (definition.flag_type().zero(), FlagSource::Empty),
            }
        };

        trace!(flag = name, %source, "Flag resolved");
        Ok(Resolved { value, source })
    }

    fn from_environment(&self, definition: &FlagDefinition) -> Result<Option<FlagValue>> {
        let name = definition.name();
        let key = self.inner.env_key(name);
        let raw = match self.inner.env.var(&key) {
            Ok(raw) => raw,
            Err(VarError::NotPresent) => return Ok(None),
            Err(VarError::NotUnicode(raw)) => {
                if definition.flag_type() == FlagType::Bool {
                    warn!(flag = name, key = %key, "Ignoring non-unicode boolean");
                    return Ok(None);
                }
                return Err(FlagError::Conversion {
                    name: name.to_owned(),
                    value: raw.to_string_lossy().into_owned(),
                    expected: definition.flag_type(),
                    reason: "value is not valid unicode".to_owned(),
                    context: Some(format!("reading {key}").into()),
                });
            },
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if definition.flag_type() == FlagType::Bool {
            let parsed = env::parse_bool(raw);
            if parsed.is_none() {
                warn!(flag = name, key = %key, value = raw, "Ignoring unrecognised boolean");
            }
            return Ok(parsed.map(FlagValue::Bool));
        }

        parse_for(name, definition.flag_type(), raw).map(Some).context(format!("reading {key}"))
    }
}

impl fmt::Debug for FlagView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagView").field("depth", &self.depth).finish_non_exhaustive()
    }
}

fn parse_for(name: &str, ty: FlagType, raw: &str) -> Result<FlagValue> {
    env::convert(ty, raw).map_err(|reason| FlagError::Conversion {
        name: name.to_owned(),
        value: raw.to_owned(),
        expected: ty,
        reason,
        context: None,
    })
}

/// Builds a [`FlagRegistry`] from an ordered list of [`FlagSpec`]s.
#[derive(Debug)]
pub struct RegistryBuilder {
    specs: Vec<FlagSpec>,
    env: Box<dyn EnvSource>,
    prefix: Cow<'static, str>,
    max_depth: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            specs: Vec::new(),
            env: Box::new(ProcessEnv),
            prefix: Cow::Borrowed(DEFAULT_PREFIX),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RegistryBuilder {
    #[must_use = "Adds a flag to the registry being built"]
    pub fn flag(mut self, spec: FlagSpec) -> Self {
        self.specs.push(spec);
        self
    }

    #[must_use = "Adds flags to the registry being built"]
    pub fn flags(mut self, specs: impl IntoIterator<Item = FlagSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Replaces the process environment as the source of `<prefix><NAME>` variables.
    #[must_use = "Sets the environment source for the registry"]
    pub fn environment(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    #[must_use = "Sets the environment prefix for the registry"]
    pub fn prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Limits how deeply computed defaults may nest before resolution gives up.
    #[must_use = "Sets the computed default nesting limit"]
    pub const fn max_default_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Validates every declaration and freezes the schema.
    ///
    /// # Errors
    /// Returns [`FlagError::Declaration`] for unresolved types, invalid or duplicate names,
    /// and defaults whose type differs from the declared one.
    pub fn build(self) -> Result<FlagRegistry> {
        let mut slots = Vec::with_capacity(self.specs.len());
        let mut index = FxHashMap::default();

        for spec in self.specs {
            let definition = spec.into_definition()?;
            let name = definition.name().to_owned();
            if index.contains_key(&name) {
                return Err(FlagError::declaration(format!("duplicate flag name {name}")));
            }
            index.insert(name, slots.len());
            slots.push(FlagSlot { definition, overridden: ArcSwapOption::empty() });
        }

        info!(flags = slots.len(), prefix = %self.prefix, "Flag registry declared");

        Ok(FlagRegistry {
            inner: Arc::new(RegistryInner {
                slots,
                index,
                env: self.env,
                prefix: self.prefix,
                max_depth: self.max_depth,
            }),
        })
    }
}
