use crate::error::FlagError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The declared type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Bool,
    Int,
    Float,
    Str,
}

impl FlagType {
    /// Canonical lowercase name, as accepted by [`FlagType::from_str`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        }
    }

    /// The value a flag of this type resolves to when no source applies.
    #[must_use]
    pub const fn zero(self) -> FlagValue {
        match self {
            Self::Bool => FlagValue::Bool(false),
            Self::Int => FlagValue::Int(0),
            Self::Float => FlagValue::Float(0.0),
            Self::Str => FlagValue::Str(String::new()),
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlagType {
    type Err = FlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" | "i64" => Ok(Self::Int),
            "float" | "f64" => Ok(Self::Float),
            "str" | "string" => Ok(Self::Str),
            _ => Err(FlagError::declaration(format!("unresolved flag type '{s}'"))),
        }
    }
}

/// A resolved or assigned flag value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FlagValue {
    #[must_use]
    pub const fn flag_type(&self) -> FlagType {
        match self {
            Self::Bool(_) => FlagType::Bool,
            Self::Int(_) => FlagType::Int,
            Self::Float(_) => FlagType::Float,
            Self::Str(_) => FlagType::Str,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FlagValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FlagValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for bool {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
}

/// Rust types a flag can be declared and read as.
pub trait FlagKind: sealed::Sealed + Into<FlagValue> + Sized {
    /// The [`FlagType`] this Rust type maps to.
    const TYPE: FlagType;

    /// Extracts the value, returning `None` when the variant does not match.
    fn from_value(value: FlagValue) -> Option<Self>;
}

impl FlagKind for bool {
    const TYPE: FlagType = FlagType::Bool;

    fn from_value(value: FlagValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FlagKind for i64 {
    const TYPE: FlagType = FlagType::Int;

    fn from_value(value: FlagValue) -> Option<Self> {
        value.as_int()
    }
}

impl FlagKind for f64 {
    const TYPE: FlagType = FlagType::Float;

    fn from_value(value: FlagValue) -> Option<Self> {
        value.as_float()
    }
}

impl FlagKind for String {
    const TYPE: FlagType = FlagType::Str;

    fn from_value(value: FlagValue) -> Option<Self> {
        match value {
            FlagValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_round_trip_through_from_str() {
        for ty in [FlagType::Bool, FlagType::Int, FlagType::Float, FlagType::Str] {
            assert_eq!(ty.name().parse::<FlagType>().ok(), Some(ty));
        }
        assert_eq!("String".parse::<FlagType>().ok(), Some(FlagType::Str));
    }

    #[test]
    fn unknown_type_name_is_a_declaration_error() {
        let err = "Optional[str]".parse::<FlagType>().expect_err("should not resolve");
        assert!(matches!(err, FlagError::Declaration { .. }));
    }

    #[test]
    fn zero_values_match_their_type() {
        assert_eq!(FlagType::Bool.zero(), FlagValue::Bool(false));
        assert_eq!(FlagType::Int.zero(), FlagValue::Int(0));
        assert_eq!(FlagType::Str.zero(), FlagValue::Str(String::new()));
        assert_eq!(FlagType::Float.zero().flag_type(), FlagType::Float);
    }

    #[test]
    fn kind_extraction_rejects_other_variants() {
        assert_eq!(bool::from_value(FlagValue::Bool(true)), Some(true));
        assert_eq!(bool::from_value(FlagValue::Int(1)), None);
        assert_eq!(String::from_value("x".into()), Some("x".to_owned()));
    }

    #[test]
    fn values_serialize_untagged() {
        let json = serde_json::to_string(&[FlagValue::Bool(true), FlagValue::Str("_".into())])
            .expect("serialize");
        assert_eq!(json, r#"[true,"_"]"#);
    }
}
