//! Physical partition and sort key generation.
//!
//! Partition keys are namespaced by the entity type name so that different
//! types sharing one table never collide. Sort keys are hierarchical: they
//! stop at the first unpopulated field, which makes every shorter key a
//! usable prefix for range queries.


use crate::{
    config::KeyConfig,
    model::entity::{Entity, EntityType},
    value::{AttributeValue, Item, Value},
};
use std::fmt::{self, Display};

///
/// PrimaryKey
///
/// Derived key pair of one entity instance.
/// `sk` is `None` when the type declares no sort key.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: Option<String>,
}

impl Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sk {
            Some(sk) => write!(f, "({}, {sk})", self.pk),
            None => write!(f, "({})", self.pk),
        }
    }
}

/// Generate the partition key: type name, then every partition-key field
/// value in order (`"empty"` for unpopulated fields).
#[must_use]
pub fn generate_partition_key(entity: &Entity, ty: &EntityType, config: &KeyConfig) -> String {
    let values = ty.partition_key_fields().iter().map(|field| entity.get(field));

    partition_key_from_values(&ty.name, values, config)
}

/// Generate the sort key. Walks the sort-key fields in order and stops at
/// the first unpopulated one; with `prefix_sort_key` every value is preceded
/// by its field name. Types without a sort key produce `""`.
#[must_use]
pub fn generate_sort_key(entity: &Entity, ty: &EntityType, config: &KeyConfig) -> String {
    let mut segments = Vec::new();

    for field in ty.sort_key_fields() {
        let Some(value) = entity.populated(field) else {
            break;
        };
        if config.prefix_sort_key {
            segments.push(field.clone());
        }
        segments.push(value.to_key_segment());
    }

    segments.join(&config.key_separator)
}

/// Generate both keys of an instance.
#[must_use]
pub fn generate_keys(entity: &Entity, ty: &EntityType, config: &KeyConfig) -> PrimaryKey {
    PrimaryKey {
        pk: generate_partition_key(entity, ty, config),
        sk: ty
            .has_sort_key()
            .then(|| generate_sort_key(entity, ty, config)),
    }
}

/// Render a key pair as wire attributes under the configured names.
#[must_use]
pub fn key_attributes(key: &PrimaryKey, config: &KeyConfig) -> Item {
    let mut item = Item::new();
    item.insert(
        config.partition_key_attr_name.clone(),
        AttributeValue::S(key.pk.clone()),
    );
    if let Some(sk) = &key.sk {
        item.insert(config.sort_key_attr_name.clone(), AttributeValue::S(sk.clone()));
    }

    item
}

/// Stringify one key segment; absent and null values become `"empty"`.
#[must_use]
pub fn key_segment(value: Option<&Value>) -> String {
    value.map_or_else(|| Value::Null.to_key_segment(), Value::to_key_segment)
}

// Shared with relationship keys, which read the values off a child instance.
pub(crate) fn partition_key_from_values<'a>(
    name: &str,
    values: impl IntoIterator<Item = Option<&'a Value>>,
    config: &KeyConfig,
) -> String {
    let mut segments = vec![name.to_string()];
    segments.extend(values.into_iter().map(key_segment));

    segments.join(&config.key_separator)
}
