//! Value and type model shared by specifications and parse results.
//!
//! [`Type`] describes what a payload or positional accepts, [`Value`] holds
//! a concrete default or parsed argument. Accessors on [`Value`] perform the
//! lossless numeric conversions and fail with [`TypeMismatch`] otherwise.

use serde::{Deserialize, Serialize};

use crate::Description;
use crate::error::TypeMismatch;

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Any string (the default).
    #[default]
    Any,
    /// Signed integer.
    #[serde(rename = "inum", alias = "int")]
    INum,
    /// Unsigned integer.
    #[serde(rename = "unum", alias = "uint")]
    UNum,
    /// Finite floating point number.
    Real,
    /// `true`/`false`/`1`/`0`.
    #[serde(rename = "boolean", alias = "bool")]
    Boolean,
}

/// One named entry of an enum type.
///
/// # Examples
///
/// ```
/// use argspec_core::EnumEntry;
///
/// let entry = EnumEntry::new(3, "fast").with_description("Skip verification");
/// assert_eq!(entry.id, 3);
/// assert_eq!(entry.description.text, "Skip verification");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumEntry {
    /// Stable id reported in parse results.
    pub id: u64,
    /// Name typed on the command line.
    pub name: String,
    /// Normal and reduced descriptions.
    #[serde(default)]
    pub description: Description,
}

impl EnumEntry {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: Description::default(),
        }
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_reduced(mut self, text: &str) -> Self {
        self.description.reduced = Some(text.to_string());
        self
    }
}

/// Type accepted by a payload or positional argument.
///
/// Serialized untagged, so `"unum"` and a list of enum entries are both
/// valid spellings in specification files.
///
/// # Examples
///
/// ```
/// use argspec_core::{EnumEntry, Primitive, Type};
///
/// let count = Type::from(Primitive::UNum);
/// assert!(!count.is_enum());
///
/// let level = Type::Enum(vec![EnumEntry::new(0, "low"), EnumEntry::new(1, "high")]);
/// assert_eq!(level.find_entry("high").map(|e| e.id), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Type {
    Primitive(Primitive),
    Enum(Vec<EnumEntry>),
}

impl Default for Type {
    fn default() -> Self {
        Type::Primitive(Primitive::Any)
    }
}

impl From<Primitive> for Type {
    fn from(primitive: Primitive) -> Self {
        Type::Primitive(primitive)
    }
}

impl Type {
    pub fn is_enum(&self) -> bool {
        matches!(self, Type::Enum(_))
    }

    /// Looks up an enum entry by name. Always `None` for primitives.
    pub fn find_entry(&self, name: &str) -> Option<&EnumEntry> {
        match self {
            Type::Enum(entries) => entries.iter().find(|entry| entry.name == name),
            Type::Primitive(_) => None,
        }
    }

    /// Short display tag used by help output and error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Type::Enum(_) => "enum",
            Type::Primitive(Primitive::Any) => "any",
            Type::Primitive(Primitive::INum) => "int",
            Type::Primitive(Primitive::UNum) => "uint",
            Type::Primitive(Primitive::Real) => "real",
            Type::Primitive(Primitive::Boolean) => "bool",
        }
    }
}

/// A single argument value.
///
/// Non-negative signed integers are normalized to [`Value::UNum`] on
/// construction, so `Value::from(5i64) == Value::from(5u64)`.
///
/// # Examples
///
/// ```
/// use argspec_core::Value;
///
/// let v = Value::from(-3i64);
/// assert_eq!(v.inum().unwrap(), -3);
/// assert!(v.unum().is_err());
/// assert_eq!(v.real().unwrap(), -3.0);
///
/// let s = Value::from("out.txt");
/// assert_eq!(s.str().unwrap(), "out.txt");
/// assert!(s.real().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    UNum(u64),
    INum(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    /// Resolved enum entry id. Never produced by deserialization, enum
    /// defaults are written as entry names.
    Enum(u64),
}

impl Default for Value {
    fn default() -> Self {
        Value::UNum(0)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UNum(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        if v >= 0 {
            Value::UNum(v as u64)
        } else {
            Value::INum(v)
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UNum(u64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::from(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl Value {
    pub fn is_unum(&self) -> bool {
        self.unum().is_ok()
    }

    pub fn is_inum(&self) -> bool {
        self.inum().is_ok()
    }

    pub fn is_real(&self) -> bool {
        self.real().is_ok()
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Value::Enum(_))
    }

    pub fn unum(&self) -> Result<u64, TypeMismatch> {
        match *self {
            Value::UNum(v) => Ok(v),
            Value::INum(v) if v >= 0 => Ok(v as u64),
            _ => Err(TypeMismatch::new("an unsigned integer")),
        }
    }

    pub fn inum(&self) -> Result<i64, TypeMismatch> {
        match *self {
            Value::INum(v) => Ok(v),
            Value::UNum(v) => i64::try_from(v).map_err(|_| TypeMismatch::new("a signed integer")),
            _ => Err(TypeMismatch::new("a signed integer")),
        }
    }

    pub fn real(&self) -> Result<f64, TypeMismatch> {
        match *self {
            Value::Real(v) => Ok(v),
            Value::UNum(v) => Ok(v as f64),
            Value::INum(v) => Ok(v as f64),
            _ => Err(TypeMismatch::new("a real")),
        }
    }

    pub fn boolean(&self) -> Result<bool, TypeMismatch> {
        match *self {
            Value::Bool(v) => Ok(v),
            _ => Err(TypeMismatch::new("a boolean")),
        }
    }

    pub fn str(&self) -> Result<&str, TypeMismatch> {
        match self {
            Value::Str(v) => Ok(v),
            _ => Err(TypeMismatch::new("a string")),
        }
    }

    pub fn enum_id(&self) -> Result<u64, TypeMismatch> {
        match *self {
            Value::Enum(id) => Ok(id),
            _ => Err(TypeMismatch::new("an enum")),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::UNum(v) => write!(f, "{v}"),
            Value::INum(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Enum(id) => write!(f, "#{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_constructor_normalizes_non_negative() {
        assert_eq!(Value::from(7i64), Value::UNum(7));
        assert_eq!(Value::from(-7i64), Value::INum(-7));
        assert_eq!(Value::from(0i32), Value::UNum(0));
    }

    #[test]
    fn test_numeric_conversions() {
        let big = Value::UNum(u64::MAX);
        assert_eq!(big.unum().unwrap(), u64::MAX);
        assert!(big.inum().is_err());
        assert!(big.is_real());

        let real = Value::Real(1.5);
        assert!(real.unum().is_err());
        assert!(real.inum().is_err());
        assert_eq!(real.real().unwrap(), 1.5);
    }

    #[test]
    fn test_strings_and_enums_do_not_convert() {
        let name = Value::from("12");
        assert!(name.unum().is_err());
        assert!(name.enum_id().is_err());

        let entry = Value::Enum(4);
        assert_eq!(entry.enum_id().unwrap(), 4);
        assert!(entry.unum().is_err());
        assert!(entry.str().is_err());
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Value::Bool(true).str().unwrap_err();
        assert_eq!(err.to_string(), "Value is not a string.");
    }

    #[test]
    fn test_type_deserializes_from_primitive_or_entries() {
        let primitive: Type = serde_json::from_str(r#""uint""#).unwrap();
        assert_eq!(primitive, Type::Primitive(Primitive::UNum));

        let entries: Type =
            serde_json::from_str(r#"[{"id": 1, "name": "fast"}, {"id": 2, "name": "slow"}]"#)
                .unwrap();
        assert_eq!(entries.find_entry("slow").map(|e| e.id), Some(2));
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[3, -2, 0.5, true, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::UNum(3),
                Value::INum(-2),
                Value::Real(0.5),
                Value::Bool(true),
                Value::Str("x".into()),
            ]
        );
    }
}
