use crate::{
    builder::{EntityBuilder, ParentRef},
    error::{DefinitionError, ErrorTree},
    validate::naming::validate_entity_naming,
};
use dynamap_core::model::entity::EntityType;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

///
/// Registry
///
/// Two-phase entity registration. Builders are collected by path first;
/// `finalize` then builds parents before children so belongs-to targets
/// given by path can be resolved and foreign keys inferred.
///

#[derive(Debug, Default)]
pub struct Registry {
    builders: BTreeMap<String, EntityBuilder>,
    errors: ErrorTree,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a builder; duplicate paths are reported by `finalize`.
    #[must_use]
    pub fn register(mut self, builder: EntityBuilder) -> Self {
        let path = builder.path().to_string();
        if self.builders.contains_key(&path) {
            self.errors.add_for(
                path.clone(),
                DefinitionError::DuplicateEntityPath { path },
            );
        } else {
            self.builders.insert(path, builder);
        }

        self
    }

    /// Build every registered type.
    pub fn finalize(mut self) -> Result<Schema, ErrorTree> {
        let mut errs = std::mem::take(&mut self.errors);
        let mut built: BTreeMap<String, Arc<EntityType>> = BTreeMap::new();
        let mut failed = BTreeSet::new();

        let paths: Vec<String> = self.builders.keys().cloned().collect();
        for path in paths {
            let mut visiting = Vec::new();
            self.visit(&path, &mut visiting, &mut built, &mut failed, &mut errs);
        }

        validate_entity_naming(built.values(), &mut errs);
        errs.result()?;

        Ok(Schema { entities: built })
    }

    // Depth-first build: a builder's path parent is built before it.
    fn visit(
        &mut self,
        path: &str,
        visiting: &mut Vec<String>,
        built: &mut BTreeMap<String, Arc<EntityType>>,
        failed: &mut BTreeSet<String>,
        errs: &mut ErrorTree,
    ) {
        if built.contains_key(path) || failed.contains(path) {
            return;
        }

        if visiting.iter().any(|p| p == path) {
            let mut cycle = visiting.clone();
            cycle.push(path.to_string());
            errs.add_for(
                path.to_string(),
                DefinitionError::RelationshipCycle { path: cycle },
            );
            failed.insert(path.to_string());
            return;
        }

        let Some(builder) = self.builders.get(path) else {
            return;
        };

        if let Some(ParentRef::Path(parent)) = builder.parent() {
            let parent = parent.clone();
            if self.builders.contains_key(&parent) {
                visiting.push(path.to_string());
                self.visit(&parent, visiting, built, failed, errs);
                visiting.pop();
            }
            // the parent's own errors already cover this type
            if failed.contains(path) || failed.contains(&parent) {
                failed.insert(path.to_string());
                return;
            }
        }

        let Some(builder) = self.builders.remove(path) else {
            return;
        };

        match builder.build_with(|parent| built.get(parent).cloned()) {
            Ok(ty) => {
                built.insert(path.to_string(), Arc::new(ty));
            }
            Err(tree) => {
                errs.merge_for(path.to_string(), tree);
                failed.insert(path.to_string());
            }
        }
    }
}

///
/// Schema
///
/// Finalized, immutable set of entity types keyed by path.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    entities: BTreeMap<String, Arc<EntityType>>,
}

impl Schema {
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Arc<EntityType>> {
        self.entities.get(path)
    }

    /// Find a type by its key namespace within one table.
    #[must_use]
    pub fn get_by_name(&self, table: &str, name: &str) -> Option<&Arc<EntityType>> {
        self.entities
            .values()
            .find(|ty| ty.table == table && ty.name == name)
    }

    /// Types whose belongs-to parent is `parent_path`.
    #[must_use]
    pub fn children_of(&self, parent_path: &str) -> Vec<&Arc<EntityType>> {
        self.entities
            .values()
            .filter(|ty| {
                ty.relationship
                    .as_ref()
                    .is_some_and(|rel| rel.parent.path == parent_path)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.entities.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
