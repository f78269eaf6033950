//! Secondary-index lookup, prerequisite validation and index key values.
//!
//! Index keys are the raw stringified field values. Unlike primary
//! partition keys they are not namespaced by the type name.

#[cfg(test)]
mod tests;

use crate::{
    key::key_segment,
    model::{
        entity::{Entity, EntityType},
        index::SecondaryIndexSpec,
    },
};
use thiserror::Error as ThisError;

///
/// IndexError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexError {
    #[error("index '{index}' not found on {entity}; available indexes: {}", available_list(.available))]
    NotFound {
        entity: String,
        index: String,
        available: Vec<String>,
    },

    #[error("index '{index}' requires partition key field '{field}' to be populated")]
    MissingPartitionKey { index: String, field: String },

    #[error("index '{index}' has no sort key; sort key conditions are not supported")]
    NoSortKey { index: String },

    #[error("index '{index}' requires sort key field '{field}' to be populated")]
    MissingSortKey { index: String, field: String },
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// Look up an index by name on a type.
pub fn find_index<'a>(ty: &'a EntityType, name: &str) -> Result<&'a SecondaryIndexSpec, IndexError> {
    ty.indexes
        .iter()
        .find(|index| index.name == name)
        .ok_or_else(|| IndexError::NotFound {
            entity: ty.path.clone(),
            index: name.to_string(),
            available: ty.index_names(),
        })
}

/// Check that an instance can be used to query an index.
///
/// Checks run in order and the first failure wins: the partition field must
/// be populated; a partition-only index rejects sort conditions; the sort
/// field must be populated when a sort condition is requested.
pub fn validate(
    entity: &Entity,
    index: &SecondaryIndexSpec,
    requires_sort_key: bool,
) -> Result<(), IndexError> {
    if !entity.is_populated(&index.partition_key_field) {
        return Err(IndexError::MissingPartitionKey {
            index: index.name.clone(),
            field: index.partition_key_field.clone(),
        });
    }

    if !requires_sort_key {
        return Ok(());
    }

    match &index.sort_key_field {
        None => Err(IndexError::NoSortKey {
            index: index.name.clone(),
        }),
        Some(field) if !entity.is_populated(field) => Err(IndexError::MissingSortKey {
            index: index.name.clone(),
            field: field.clone(),
        }),
        Some(_) => Ok(()),
    }
}

/// Lookup followed by validation.
pub fn validate_by_name<'a>(
    entity: &Entity,
    ty: &'a EntityType,
    name: &str,
    requires_sort_key: bool,
) -> Result<&'a SecondaryIndexSpec, IndexError> {
    let index = find_index(ty, name)?;
    validate(entity, index, requires_sort_key)?;

    Ok(index)
}

/// Index partition key value; `"empty"` for an unpopulated field.
#[must_use]
pub fn generate_index_partition_key(entity: &Entity, index: &SecondaryIndexSpec) -> String {
    key_segment(entity.get(&index.partition_key_field))
}

/// Index sort key value; `None` for partition-only indexes.
#[must_use]
pub fn generate_index_sort_key(entity: &Entity, index: &SecondaryIndexSpec) -> Option<String> {
    index
        .sort_key_field
        .as_ref()
        .map(|field| key_segment(entity.get(field)))
}
