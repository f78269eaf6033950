use crate::model::entity::EntityType;
use std::sync::Arc;

///
/// RelationshipSpec
///
/// Belongs-to rule: the child's partition key is generated with the
/// parent's partition-key algorithm, reading values off the child.
///
/// `foreign_key_fields` lists child fields positionally matching the
/// parent's partition-key fields.
///

#[derive(Clone, Debug)]
pub struct RelationshipSpec {
    pub parent: Arc<EntityType>,
    pub foreign_key_fields: Vec<String>,
    pub sort_key_strategy: SortKeyStrategy,
}

impl RelationshipSpec {
    /// The single foreign-key field, when the parent key is not composite.
    #[must_use]
    pub fn foreign_key_field(&self) -> Option<&str> {
        match self.foreign_key_fields.as_slice() {
            [field] => Some(field),
            _ => None,
        }
    }

    /// Pairs of (parent partition-key field, child field).
    pub fn key_mapping(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parent
            .partition_key_fields()
            .iter()
            .map(String::as_str)
            .zip(self.foreign_key_fields.iter().map(String::as_str))
    }
}

///
/// SortKeyStrategy
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortKeyStrategy {
    /// Child sort key is prefixed with the child type name.
    #[default]
    Prefix,

    /// Child sort key is used unchanged.
    AsDefined,
}
