
use crate::{
    config,
    error::{DefinitionError, ErrorTree},
    validate::{validate_entity_name, validate_ident},
};
use dynamap_core::{
    config::ConfigOverride,
    model::{
        entity::{CodecHooks, Entity, EntityType},
        field::{FieldSpec, KeySpec},
        index::SecondaryIndexSpec,
        relation::{RelationshipSpec, SortKeyStrategy},
    },
    value::Value,
};
use std::{collections::BTreeSet, sync::Arc};

///
/// ParentRef
/// Belongs-to target: an already-built type, or a path resolved by the
/// registry once every type is known.
///

#[derive(Clone, Debug)]
pub enum ParentRef {
    Built(Arc<EntityType>),
    Path(String),
}

impl ParentRef {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Built(ty) => &ty.path,
            Self::Path(path) => path,
        }
    }
}

///
/// EntityBuilder
///
/// Fluent entity definition. Declarations accumulate; `build` runs every
/// definition check over the accumulated state and returns either an
/// immutable `EntityType` or all problems found.
///

#[derive(Clone, Debug)]
pub struct EntityBuilder {
    path: String,
    name: Option<String>,
    table: Option<String>,
    fields: Vec<FieldSpec>,
    partition_key: Option<Vec<String>>,
    sort_key: Option<Vec<String>>,
    indexes: Vec<SecondaryIndexSpec>,
    parent: Option<ParentRef>,
    foreign_key: Option<Vec<String>>,
    sort_key_strategy: SortKeyStrategy,
    config: ConfigOverride,
    hooks: CodecHooks,
    errors: ErrorTree,
}

impl EntityBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            table: None,
            fields: Vec::new(),
            partition_key: None,
            sort_key: None,
            indexes: Vec::new(),
            parent: None,
            foreign_key: None,
            sort_key_strategy: SortKeyStrategy::default(),
            config: ConfigOverride::default(),
            hooks: CodecHooks::default(),
            errors: ErrorTree::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    // declarations

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Override the key namespace derived from the path.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.field_spec(FieldSpec::new(name))
    }

    #[must_use]
    pub fn field_with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.field_spec(FieldSpec::new(name).with_default(default))
    }

    #[must_use]
    pub fn field_spec(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a field marked as part of the partition key. Marked fields
    /// form the key in declaration order.
    #[must_use]
    pub fn partition_key_field(self, name: impl Into<String>) -> Self {
        self.field_spec(FieldSpec {
            is_partition_key: true,
            ..FieldSpec::new(name)
        })
    }

    /// Declare a field marked as part of the sort key.
    #[must_use]
    pub fn sort_key_field(self, name: impl Into<String>) -> Self {
        self.field_spec(FieldSpec {
            is_sort_key: true,
            ..FieldSpec::new(name)
        })
    }

    /// Declare the partition key as an explicit ordered field list.
    #[must_use]
    pub fn partition_key<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        match &self.partition_key {
            Some(existing) => self.errors.add(DefinitionError::DuplicatePartitionKey {
                existing: existing.join(", "),
            }),
            None => self.partition_key = Some(fields),
        }
        self
    }

    /// Declare the sort key as an explicit ordered field list.
    #[must_use]
    pub fn sort_key<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        match &self.sort_key {
            Some(existing) => self.errors.add(DefinitionError::DuplicateSortKey {
                existing: existing.join(", "),
            }),
            None => self.sort_key = Some(fields),
        }
        self
    }

    #[must_use]
    pub fn index(mut self, index: SecondaryIndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    /// Belong to an already-built parent type.
    #[must_use]
    pub fn belongs_to(self, parent: &Arc<EntityType>) -> Self {
        self.set_parent(ParentRef::Built(Arc::clone(parent)))
    }

    /// Belong to a parent registered by path in the same registry.
    #[must_use]
    pub fn belongs_to_path(self, parent: impl Into<String>) -> Self {
        self.set_parent(ParentRef::Path(parent.into()))
    }

    /// Child fields matching the parent's partition-key fields by position.
    #[must_use]
    pub fn foreign_key<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.foreign_key = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn sort_key_strategy(mut self, strategy: SortKeyStrategy) -> Self {
        self.sort_key_strategy = strategy;
        self
    }

    /// Per-entity config layer, applied over the process layer.
    #[must_use]
    pub fn config(mut self, layer: ConfigOverride) -> Self {
        self.config = layer;
        self
    }

    #[must_use]
    pub const fn before_encode(mut self, hook: fn(Entity) -> Entity) -> Self {
        self.hooks.before_encode = Some(hook);
        self
    }

    #[must_use]
    pub const fn after_decode(mut self, hook: fn(Entity) -> Entity) -> Self {
        self.hooks.after_decode = Some(hook);
        self
    }

    fn set_parent(mut self, parent: ParentRef) -> Self {
        match &self.parent {
            Some(existing) => self.errors.add(DefinitionError::DuplicateRelationship {
                existing: existing.path().to_string(),
            }),
            None => self.parent = Some(parent),
        }
        self
    }

    // build

    /// Validate and build. A parent given by path cannot be resolved here;
    /// register the builder with a `Registry` instead.
    pub fn build(self) -> Result<EntityType, ErrorTree> {
        self.build_with(|_| None)
    }

    /// Validate and build, resolving a path-declared parent through `lookup`.
    pub(crate) fn build_with(
        self,
        lookup: impl Fn(&str) -> Option<Arc<EntityType>>,
    ) -> Result<EntityType, ErrorTree> {
        let mut errs = self.errors.clone();

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| EntityType::name_from_path(&self.path));
        if let Err(err) = validate_entity_name(&name) {
            errs.add(err);
        }

        let table = match &self.table {
            Some(table) if !table.is_empty() => table.clone(),
            _ => {
                errs.add(DefinitionError::MissingTable);
                String::new()
            }
        };

        self.check_fields(&mut errs);

        let partition_key = self.resolve_key(KeyRole::Partition, &mut errs);
        let sort_key = self.resolve_key(KeyRole::Sort, &mut errs);

        self.check_indexes(&mut errs);

        let relationship = self.resolve_relationship(&lookup, &mut errs);

        let config = config::resolve(&self.config);
        if let Err(err) = config.check() {
            errs.add(err.into());
        }

        errs.result()?;

        Ok(EntityType {
            path: self.path,
            name,
            table,
            fields: self.fields,
            partition_key,
            sort_key,
            indexes: self.indexes,
            relationship,
            config,
            hooks: self.hooks,
        })
    }

    fn check_fields(&self, errs: &mut ErrorTree) {
        let mut seen = BTreeSet::new();

        for field in &self.fields {
            if let Err(err) = validate_ident("field", &field.name) {
                errs.add(err);
            }
            if !seen.insert(field.name.as_str()) {
                errs.add(DefinitionError::DuplicateField {
                    field: field.name.clone(),
                });
            }
        }
    }

    // Marked fields and an explicit list are two declarations of one key.
    fn resolve_key(&self, role: KeyRole, errs: &mut ErrorTree) -> Option<KeySpec> {
        let marked: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| role.is_marked(f))
            .map(|f| f.name.as_str())
            .collect();
        let explicit = match role {
            KeyRole::Partition => self.partition_key.as_ref(),
            KeyRole::Sort => self.sort_key.as_ref(),
        };

        let spec = match (explicit, marked.is_empty()) {
            (None, true) => return None,
            (None, false) => KeySpec::marked(marked),
            (Some(fields), true) => KeySpec::explicit(fields.iter().map(String::as_str)),
            (Some(_), false) => {
                errs.add(role.duplicate(marked.join(", ")));
                return None;
            }
        };

        self.check_key_fields(role.context(), &spec.fields, errs);

        Some(spec)
    }

    fn check_key_fields(&self, context: &str, fields: &[String], errs: &mut ErrorTree) {
        if fields.is_empty() {
            errs.add(DefinitionError::EmptyKey {
                context: context.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for field in fields {
            if !seen.insert(field.as_str()) {
                errs.add(DefinitionError::RepeatedKeyField {
                    context: context.to_string(),
                    field: field.clone(),
                });
            }
            self.require_field(context, field, errs);
        }
    }

    fn check_indexes(&self, errs: &mut ErrorTree) {
        let mut seen = BTreeSet::new();

        for index in &self.indexes {
            if let Err(err) = validate_ident("index", &index.name) {
                errs.add(err);
            }
            if !seen.insert(index.name.as_str()) {
                errs.add(DefinitionError::DuplicateIndex {
                    index: index.name.clone(),
                });
            }

            let context = format!("index '{}'", index.name);
            for field in index.referenced_fields() {
                self.require_field(&context, field, errs);
            }
        }
    }

    fn resolve_relationship(
        &self,
        lookup: &impl Fn(&str) -> Option<Arc<EntityType>>,
        errs: &mut ErrorTree,
    ) -> Option<RelationshipSpec> {
        let Some(parent_ref) = &self.parent else {
            if self.foreign_key.is_some() {
                errs.add(DefinitionError::ForeignKeyWithoutParent);
            }
            return None;
        };

        let parent = match parent_ref {
            ParentRef::Built(ty) => Arc::clone(ty),
            ParentRef::Path(path) => {
                let Some(ty) = lookup(path) else {
                    errs.add(DefinitionError::UnknownParent {
                        parent: path.clone(),
                    });
                    return None;
                };
                ty
            }
        };

        let foreign_key_fields = self.foreign_key_fields(&parent, errs)?;

        Some(RelationshipSpec {
            parent,
            foreign_key_fields,
            sort_key_strategy: self.sort_key_strategy,
        })
    }

    // Declared foreign keys match the parent key positionally; otherwise a
    // single-field parent key is matched by name.
    fn foreign_key_fields(
        &self,
        parent: &EntityType,
        errs: &mut ErrorTree,
    ) -> Option<Vec<String>> {
        let parent_key = parent.partition_key_fields();

        if let Some(declared) = &self.foreign_key {
            if declared.len() != parent_key.len() {
                errs.add(DefinitionError::ForeignKeyArity {
                    parent: parent.path.clone(),
                    expected: parent_key.len(),
                    found: declared.len(),
                });
                return None;
            }
            let context = format!("foreign key to '{}'", parent.path);
            for field in declared {
                self.require_field(&context, field, errs);
            }
            return Some(declared.clone());
        }

        match parent_key {
            [] => Some(Vec::new()),
            [field] if self.has_field(field) => Some(vec![field.clone()]),
            [field] => {
                errs.add(DefinitionError::ForeignKeyInference {
                    parent: parent.path.clone(),
                    reason: format!("no field named '{field}'"),
                });
                None
            }
            _ => {
                errs.add(DefinitionError::ForeignKeyInference {
                    parent: parent.path.clone(),
                    reason: "parent partition key is composite; declare the foreign key"
                        .to_string(),
                });
                None
            }
        }
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    fn require_field(&self, context: &str, field: &str, errs: &mut ErrorTree) {
        if !self.has_field(field) {
            errs.add(DefinitionError::MissingField {
                context: context.to_string(),
                field: field.to_string(),
            });
        }
    }
}

///
/// KeyRole
///

#[derive(Clone, Copy)]
enum KeyRole {
    Partition,
    Sort,
}

impl KeyRole {
    const fn context(self) -> &'static str {
        match self {
            Self::Partition => "partition key",
            Self::Sort => "sort key",
        }
    }

    const fn is_marked(self, field: &FieldSpec) -> bool {
        match self {
            Self::Partition => field.is_partition_key,
            Self::Sort => field.is_sort_key,
        }
    }

    fn duplicate(self, existing: String) -> DefinitionError {
        match self {
            Self::Partition => DefinitionError::DuplicatePartitionKey { existing },
            Self::Sort => DefinitionError::DuplicateSortKey { existing },
        }
    }
}
