mod codec;
mod number;
mod wire;


use crate::EMPTY_SEGMENT;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
};
use thiserror::Error as ThisError;

// re-exports
pub use codec::{
    Encode, decode, decode_item, decode_item_into, decode_into, encode, encode_entity,
    encode_json,
};
pub use number::{Number, NumberSet};
pub use wire::{AttributeValue, Item, WireTag, item_from_json, item_to_json};

///
/// CodecError
///
/// Malformed wire values and values the wire format cannot carry.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("malformed attribute value: {shape}")]
    MalformedWire { shape: String },

    #[error("unknown attribute value tag '{tag}'")]
    UnknownTag { tag: String },

    #[error("invalid number text '{text}'")]
    InvalidNumber { text: String },

    #[error("number is not finite: {value}")]
    NonFiniteNumber { value: String },

    #[error("invalid base64 payload: {reason}")]
    InvalidBinary { reason: String },

    #[error("set members are not uniformly typed: found {first} and {other}")]
    MixedSet {
        first: &'static str,
        other: &'static str,
    },

    #[error("set member of kind {kind} cannot be stored in a set")]
    UnsupportedSetMember { kind: &'static str },

    #[error("sets must contain at least one member")]
    EmptySet,

    #[error("expected a map-shaped attribute value, found {tag}")]
    NotAMap { tag: WireTag },
}

///
/// Value
///
/// Native value carried by entity fields.
///
/// Null → the field is absent or explicitly null.
/// Set  → unordered collection of strings, numbers or binaries.
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Float(f64),
    Int(i64),
    /// Ordered heterogeneous sequence.
    List(Vec<Self>),
    /// Field map; key order is not significant.
    Map(BTreeMap<String, Self>),
    Null,
    Set(SetValue),
    Text(String),
}

impl Value {
    /// Build a set from loose values, rejecting mixed or unsupported members.
    pub fn set_from(values: impl IntoIterator<Item = Self>) -> Result<Self, CodecError> {
        SetValue::try_from_values(values).map(Self::Set)
    }

    #[must_use]
    pub fn text_set<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Set(SetValue::Text(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn number_set(values: impl IntoIterator<Item = Number>) -> Self {
        Self::Set(SetValue::number(values))
    }

    #[must_use]
    pub fn blob_set(values: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self::Set(SetValue::Blob(values.into_iter().collect()))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Blob(_) => "Blob",
            Self::Bool(_) => "Bool",
            Self::Float(_) => "Float",
            Self::Int(_) => "Int",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Null => "Null",
            Self::Set(_) => "Set",
            Self::Text(_) => "Text",
        }
    }

    /// Render this value as one key segment.
    ///
    /// Text is used as-is, numbers use their wire text, binaries are Base64,
    /// and collections fall back to their display form.
    #[must_use]
    pub fn to_key_segment(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Null => EMPTY_SEGMENT.to_string(),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(bytes) => f.write_str(&BASE64.encode(bytes)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(v) => write!(f, "{}", Number::Float(*v)),
            Self::Int(v) => write!(f, "{v}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Null => f.write_str("null"),
            Self::Set(set) => write!(f, "{set}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        match v {
            Number::Int(i) => Self::Int(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(v: BTreeMap<String, Self>) -> Self {
        Self::Map(v)
    }
}

///
/// SetValue
///
/// Canonical set representation: every payload keeps its members sorted
/// and unique, so equality ignores insertion order.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SetValue {
    Blob(BTreeSet<Vec<u8>>),
    Number(NumberSet),
    Text(BTreeSet<String>),
}

impl SetValue {
    /// Build a number set (sorted by numeric value, deduplicated).
    #[must_use]
    pub fn number(values: impl IntoIterator<Item = Number>) -> Self {
        Self::Number(NumberSet::new(values))
    }

    /// Build a set from loose values. All members must share one kind.
    pub fn try_from_values(values: impl IntoIterator<Item = Value>) -> Result<Self, CodecError> {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return Err(CodecError::EmptySet);
        };
        let first_kind = first.kind();

        let mismatch = |other: &Value| CodecError::MixedSet {
            first: first_kind,
            other: other.kind(),
        };

        match first {
            Value::Text(s) => {
                let mut members = BTreeSet::from([s]);
                for value in values {
                    match value {
                        Value::Text(s) => {
                            members.insert(s);
                        }
                        other => return Err(mismatch(&other)),
                    }
                }
                Ok(Self::Text(members))
            }
            Value::Int(_) | Value::Float(_) => {
                let mut members = vec![Number::try_from(&first)?];
                for value in values {
                    match value {
                        Value::Int(_) | Value::Float(_) => members.push(Number::try_from(&value)?),
                        other => return Err(mismatch(&other)),
                    }
                }
                Ok(Self::number(members))
            }
            Value::Blob(b) => {
                let mut members = BTreeSet::from([b]);
                for value in values {
                    match value {
                        Value::Blob(b) => {
                            members.insert(b);
                        }
                        other => return Err(mismatch(&other)),
                    }
                }
                Ok(Self::Blob(members))
            }
            other => Err(CodecError::UnsupportedSetMember { kind: other.kind() }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Blob(m) => m.len(),
            Self::Number(m) => m.len(),
            Self::Text(m) => m.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for SetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = match self {
            Self::Blob(m) => m.iter().map(|b| BASE64.encode(b)).collect(),
            Self::Number(m) => m.iter().map(ToString::to_string).collect(),
            Self::Text(m) => m.iter().cloned().collect(),
        };

        write!(f, "<{}>", members.join(", "))
    }
}
