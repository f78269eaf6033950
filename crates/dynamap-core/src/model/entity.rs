use crate::{
    config::KeyConfig,
    model::{
        field::{FieldSpec, KeySpec},
        index::SecondaryIndexSpec,
        relation::RelationshipSpec,
    },
    value::Value,
};
use std::collections::BTreeMap;

///
/// EntityType
///
/// Immutable runtime description of one entity shape.
/// Built and validated by the schema layer.
///

#[derive(Clone, Debug)]
pub struct EntityType {
    /// Declared, possibly namespaced, type path (for example `app::TestItem`).
    pub path: String,
    /// Lower-cased, un-namespaced name used as the partition-key namespace.
    pub name: String,
    /// Physical table this type is stored in.
    pub table: String,
    /// Ordered field list.
    pub fields: Vec<FieldSpec>,
    pub partition_key: Option<KeySpec>,
    pub sort_key: Option<KeySpec>,
    pub indexes: Vec<SecondaryIndexSpec>,
    pub relationship: Option<RelationshipSpec>,
    /// Resolved key configuration for this type.
    pub config: KeyConfig,
    pub hooks: CodecHooks,
}

impl EntityType {
    /// Derive the key namespace from a type path: the last `::` or `.`
    /// segment, lower-cased.
    #[must_use]
    pub fn name_from_path(path: &str) -> String {
        path.rsplit(['.', ':'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(path)
            .to_lowercase()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    #[must_use]
    pub fn partition_key_fields(&self) -> &[String] {
        self.partition_key
            .as_ref()
            .map(|k| k.fields.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn sort_key_fields(&self) -> &[String] {
        self.sort_key
            .as_ref()
            .map(|k| k.fields.as_slice())
            .unwrap_or_default()
    }

    /// Whether items of this type carry a sort key attribute.
    #[must_use]
    pub fn has_sort_key(&self) -> bool {
        !self.sort_key_fields().is_empty()
    }

    /// Index names, sorted.
    #[must_use]
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|i| i.name.clone()).collect();
        names.sort();

        names
    }

    /// Create an instance populated with every field default.
    #[must_use]
    pub fn instance(&self) -> Entity {
        let mut entity = Entity::empty(&self.path);
        for field in &self.fields {
            entity.insert(field.name.clone(), field.default.clone());
        }

        entity
    }
}

///
/// CodecHooks
///
/// Per-type callbacks run around the structural codec: `before_encode`
/// ahead of encoding an instance, `after_decode` after decoding one.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CodecHooks {
    pub before_encode: Option<fn(Entity) -> Entity>,
    pub after_decode: Option<fn(Entity) -> Entity>,
}

///
/// Entity
///
/// Value-filled instance of an entity type. Fields may be absent or null;
/// keys are re-derived from the current values on every call.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    entity_path: String,
    fields: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an instance with no fields set.
    #[must_use]
    pub fn empty(entity_path: impl Into<String>) -> Self {
        Self {
            entity_path: entity_path.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Present and not null.
    #[must_use]
    pub fn is_populated(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    /// Populated value of a field; `None` for absent or null.
    #[must_use]
    pub fn populated(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn entity_path(&self) -> &str {
        &self.entity_path
    }

    #[must_use]
    pub fn is_instance_of(&self, ty: &EntityType) -> bool {
        self.entity_path == ty.path
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Map(entity.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_path_strips_namespace_and_lowercases() {
        assert_eq!(EntityType::name_from_path("app::models::TestItem"), "testitem");
        assert_eq!(EntityType::name_from_path("MyApp.Order"), "order");
        assert_eq!(EntityType::name_from_path("User"), "user");
    }

    #[test]
    fn null_fields_are_not_populated() {
        let entity = Entity::empty("app::User")
            .with("id", "u1")
            .with("email", Value::Null);

        assert!(entity.is_populated("id"));
        assert!(!entity.is_populated("email"));
        assert!(!entity.is_populated("missing"));
    }
}
