use crate::value::Value;

///
/// FieldSpec
/// Declared field with its default and key markers.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub default: Value,
    pub is_partition_key: bool,
    pub is_sort_key: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Value::Null,
            is_partition_key: false,
            is_sort_key: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }
}

///
/// KeySpec
///
/// Ordered key field list. Field order is significant: it is the segment
/// order of the generated key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeySpec {
    pub fields: Vec<String>,
    pub source: KeySource,
}

impl KeySpec {
    #[must_use]
    pub fn explicit<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            source: KeySource::Explicit,
        }
    }

    #[must_use]
    pub fn marked<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            source: KeySource::Marked,
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }
}

///
/// KeySource
///
/// Declares how the key field list was given.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeySource {
    /// Fields flagged as key fields, in declaration order.
    #[default]
    Marked,

    /// An explicit ordered list of field names.
    Explicit,
}
