//! Flag declarations.
//!
//! A [`FlagSpec`] is the builder-side description of one flag; [`crate::RegistryBuilder::build`]
//! validates every spec and freezes it into a [`FlagDefinition`].

use crate::error::{FlagError, Result};
use crate::registry::FlagView;
use crate::value::{FlagKind, FlagType, FlagValue};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type ComputeFn = dyn Fn(&FlagView<'_>) -> Result<FlagValue> + Send + Sync;

/// Reserved handler carried alongside a default. Stored, never invoked by resolution.
pub type FlagHandler = Arc<dyn Fn(&FlagView<'_>) + Send + Sync>;

/// A default computed from the current state of the registry.
#[derive(Clone)]
pub struct ComputedDefault {
    ty: FlagType,
    func: Arc<ComputeFn>,
}

impl ComputedDefault {
    /// The type the provider produces.
    #[must_use]
    pub const fn flag_type(&self) -> FlagType {
        self.ty
    }

    pub(crate) fn compute(&self, view: &FlagView<'_>) -> Result<FlagValue> {
        (self.func)(view)
    }
}

impl fmt::Debug for ComputedDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedDefault").field("ty", &self.ty).finish_non_exhaustive()
    }
}

/// Fallback used when neither an override nor the environment applies.
#[derive(Debug, Clone)]
pub enum DefaultProvider {
    Value(FlagValue),
    Computed(ComputedDefault),
}

impl DefaultProvider {
    const fn flag_type(&self) -> FlagType {
        match self {
            Self::Value(value) => value.flag_type(),
            Self::Computed(computed) => computed.ty,
        }
    }
}

#[derive(Debug, Clone)]
enum TypeDecl {
    Resolved(FlagType),
    Unresolved(String),
}

/// Builder-side declaration of a single flag.
#[derive(Clone)]
pub struct FlagSpec {
    name: Cow<'static, str>,
    ty: TypeDecl,
    default: Option<DefaultProvider>,
    handler: Option<FlagHandler>,
}

impl FlagSpec {
    /// Declares a flag whose type is a Rust type.
    #[must_use]
    pub fn of<T: FlagKind>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, T::TYPE)
    }

    /// Declares a flag with an explicit [`FlagType`].
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, ty: FlagType) -> Self {
        Self { name: name.into(), ty: TypeDecl::Resolved(ty), default: None, handler: None }
    }

    /// Declares a flag from a textual type name such as `"bool"` or `"int"`.
    ///
    /// An unknown name is kept as-is and rejected when the registry is built.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>, type_name: &str) -> Self {
        let ty = type_name
            .parse::<FlagType>()
            .map_or_else(|_| TypeDecl::Unresolved(type_name.to_owned()), TypeDecl::Resolved);
        Self { name: name.into(), ty, default: None, handler: None }
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(DefaultProvider::Value(value.into()));
        self
    }

    /// Sets a default computed on every resolution from the rest of the registry.
    #[must_use]
    pub fn computed<T, F>(mut self, func: F) -> Self
    where
        T: FlagKind,
        F: Fn(&FlagView<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let func = erase(move |view| func(view).map(Into::into));
        self.default = Some(DefaultProvider::Computed(ComputedDefault { ty: T::TYPE, func }));
        self
    }

    /// Attaches the reserved handler slot.
    #[must_use]
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FlagView<'_>) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_definition(self) -> Result<FlagDefinition> {
        validate_name(&self.name)?;

        let ty = match self.ty {
            TypeDecl::Resolved(ty) => ty,
            TypeDecl::Unresolved(raw) => {
                return Err(FlagError::declaration(format!(
                    "flag {} has unresolved type '{raw}'",
                    self.name
                )));
            },
        };

        if let Some(default) = &self.default
            && default.flag_type() != ty
        {
            return Err(FlagError::declaration(format!(
                "flag {} is declared as {ty} but its default produces {}",
                self.name,
                default.flag_type()
            )));
        }

        Ok(FlagDefinition {
            name: self.name,
            ty,
            default: self.default,
            handler: self.handler,
        })
    }
}

impl fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// An immutable, validated flag declaration.
#[derive(Clone)]
pub struct FlagDefinition {
    name: Cow<'static, str>,
    ty: FlagType,
    default: Option<DefaultProvider>,
    handler: Option<FlagHandler>,
}

impl FlagDefinition {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn flag_type(&self) -> FlagType {
        self.ty
    }

    #[must_use]
    pub const fn default_provider(&self) -> Option<&DefaultProvider> {
        self.default.as_ref()
    }

    #[must_use]
    pub const fn handler(&self) -> Option<&FlagHandler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for FlagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

fn erase<F>(func: F) -> Arc<ComputeFn>
where
    F: Fn(&FlagView<'_>) -> Result<FlagValue> + Send + Sync + 'static,
{
    Arc::new(func)
}

/// Names double as environment keys, so they must be usable as one.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FlagError::declaration("flag name cannot be empty"));
    }
    if name.contains(['=', '\0']) {
        return Err(FlagError::declaration(format!(
            "flag name '{}' cannot be used as an environment key",
            name.escape_debug()
        )));
    }
    Ok(())
}
