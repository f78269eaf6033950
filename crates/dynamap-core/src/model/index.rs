use std::fmt::{self, Display};

///
/// SecondaryIndexSpec
/// Alternate partition/sort projection over one table, one field per key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecondaryIndexSpec {
    pub name: String,
    pub partition_key_field: String,
    pub sort_key_field: Option<String>,
    pub projection: Projection,
}

impl SecondaryIndexSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, partition_key_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key_field: partition_key_field.into(),
            sort_key_field: None,
            projection: Projection::All,
        }
    }

    #[must_use]
    pub fn sort_key(mut self, field: impl Into<String>) -> Self {
        self.sort_key_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub const fn has_sort_key(&self) -> bool {
        self.sort_key_field.is_some()
    }

    /// Every field name this index references, projection included.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        let projected: &[String] = match &self.projection {
            Projection::Include(fields) => fields.as_slice(),
            Projection::All | Projection::KeysOnly => &[],
        };

        std::iter::once(self.partition_key_field.as_str())
            .chain(self.sort_key_field.as_deref())
            .chain(projected.iter().map(String::as_str))
    }
}

impl Display for SecondaryIndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort_key_field {
            Some(sk) => write!(f, "{}({}, {})", self.name, self.partition_key_field, sk),
            None => write!(f, "{}({})", self.name, self.partition_key_field),
        }
    }
}

///
/// Projection
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Projection {
    #[default]
    All,
    KeysOnly,
    Include(Vec<String>),
}

impl Projection {
    /// Store-facing projection type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::KeysOnly => "KEYS_ONLY",
            Self::Include(_) => "INCLUDE",
        }
    }
}
