//! Belongs-to key derivation.
//!
//! A child item lives in its parent's partition: the child's partition key
//! is generated with the parent's partition-key algorithm and config, fed
//! with values read from the child's foreign-key fields.

#[cfg(test)]
mod tests;

use crate::{
    config::KeyConfig,
    key::{self, PrimaryKey, partition_key_from_values},
    model::{
        entity::{Entity, EntityType},
        relation::{RelationshipSpec, SortKeyStrategy},
    },
};

/// Partition key of a child instance; byte-identical to the parent's own
/// partition key for the same logical key values.
#[must_use]
pub fn generate_child_partition_key(child: &Entity, relationship: &RelationshipSpec) -> String {
    let parent = &relationship.parent;
    let values = relationship
        .key_mapping()
        .map(|(_, child_field)| child.get(child_field));

    partition_key_from_values(&parent.name, values, &parent.config)
}

/// Sort key of a child instance.
///
/// `AsDefined` keeps the child's own sort key. `Prefix` puts the child type
/// name in front of it, or uses the type name alone when the child's own
/// sort key is empty.
#[must_use]
pub fn generate_child_sort_key(
    child: &Entity,
    child_ty: &EntityType,
    relationship: &RelationshipSpec,
    config: &KeyConfig,
) -> String {
    let own = key::generate_sort_key(child, child_ty, config);

    match relationship.sort_key_strategy {
        SortKeyStrategy::AsDefined => own,
        SortKeyStrategy::Prefix if own.is_empty() => child_ty.name.clone(),
        SortKeyStrategy::Prefix => {
            [child_ty.name.as_str(), own.as_str()].join(&config.key_separator)
        }
    }
}

/// Sort-key prefix shared by every `Prefix`-strategy child of this type
/// under one parent. Sibling types whose names extend this one share it
/// too; use [`is_child_sort_key`] to tell their rows apart.
#[must_use]
pub fn children_prefix(child_ty: &EntityType) -> String {
    child_ty.name.clone()
}

/// Whether a stored sort key was written by a `Prefix`-strategy child of
/// this type: the bare type name, or the name followed by the separator.
#[must_use]
pub fn is_child_sort_key(sort_key: &str, child_ty: &EntityType) -> bool {
    sort_key.strip_prefix(child_ty.name.as_str()).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with(child_ty.config.key_separator.as_str())
    })
}

/// Primary key of an instance, honouring its belongs-to relationship when
/// the type has one.
#[must_use]
pub fn resolve_primary_key(entity: &Entity, ty: &EntityType) -> PrimaryKey {
    let config = &ty.config;
    let Some(relationship) = &ty.relationship else {
        return key::generate_keys(entity, ty, config);
    };

    let sk = match relationship.sort_key_strategy {
        SortKeyStrategy::Prefix => Some(generate_child_sort_key(entity, ty, relationship, config)),
        SortKeyStrategy::AsDefined => ty
            .has_sort_key()
            .then(|| generate_child_sort_key(entity, ty, relationship, config)),
    };

    PrimaryKey {
        pk: generate_child_partition_key(entity, relationship),
        sk,
    }
}
