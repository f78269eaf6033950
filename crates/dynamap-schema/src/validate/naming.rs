use crate::error::{DefinitionError, ErrorTree};
use dynamap_core::model::entity::EntityType;
use std::{collections::BTreeMap, sync::Arc};

/// Two types sharing a table must not share a key namespace, or their
/// partition keys could collide.
pub fn validate_entity_naming<'a>(
    entities: impl IntoIterator<Item = &'a Arc<EntityType>>,
    errs: &mut ErrorTree,
) {
    let mut by_table: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();

    for entity in entities {
        let entry = by_table.entry(entity.table.as_str()).or_default();

        if let Some(prev) = entry.insert(entity.name.as_str(), entity.path.as_str()) {
            errs.add_for(
                entity.path.clone(),
                DefinitionError::DuplicateEntityName {
                    name: entity.name.clone(),
                    table: entity.table.clone(),
                    first: prev.to_string(),
                    second: entity.path.clone(),
                },
            );
        }
    }
}
