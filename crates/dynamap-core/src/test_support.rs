//! Entity-type fixtures shared by unit tests.

use crate::{
    config::KeyConfig,
    model::{
        entity::{CodecHooks, EntityType},
        field::{FieldSpec, KeySpec},
        index::SecondaryIndexSpec,
        relation::{RelationshipSpec, SortKeyStrategy},
    },
};
use std::sync::Arc;

/// Build a type with the given fields and key lists; empty key lists mean
/// no key spec.
pub(crate) fn entity_type(path: &str, fields: &[&str], pk: &[&str], sk: &[&str]) -> EntityType {
    let fields = fields
        .iter()
        .map(|name| FieldSpec {
            is_partition_key: pk.contains(name),
            is_sort_key: sk.contains(name),
            ..FieldSpec::new(*name)
        })
        .collect();
    let key = |names: &[&str]| (!names.is_empty()).then(|| KeySpec::explicit(names.iter().copied()));

    EntityType {
        path: path.to_string(),
        name: EntityType::name_from_path(path),
        table: "items".to_string(),
        fields,
        partition_key: key(pk),
        sort_key: key(sk),
        indexes: Vec::new(),
        relationship: None,
        config: KeyConfig::default(),
        hooks: CodecHooks::default(),
    }
}

/// `app::TestItem { id, name }`, partition `[id]`, sort `[name]`.
pub(crate) fn test_item() -> EntityType {
    entity_type("app::TestItem", &["id", "name"], &["id"], &["name"])
}

/// `app::Event` with a composite partition key and a three-level sort key.
pub(crate) fn event() -> EntityType {
    entity_type(
        "app::Event",
        &["tenant", "region", "year", "month", "day", "title"],
        &["tenant", "region"],
        &["year", "month", "day"],
    )
}

/// `app::User` with one two-key index and one partition-only index.
pub(crate) fn user() -> EntityType {
    let mut ty = entity_type(
        "app::User",
        &["id", "email", "created_at", "status"],
        &["id"],
        &[],
    );
    ty.indexes = vec![
        SecondaryIndexSpec::new("email_index", "email").sort_key("created_at"),
        SecondaryIndexSpec::new("status_index", "status"),
    ];

    ty
}

/// `app::Order` belonging to `app::User` through `user_id`.
pub(crate) fn order(strategy: SortKeyStrategy) -> EntityType {
    let mut ty = entity_type(
        "app::Order",
        &["id", "user_id", "order_date", "total"],
        &["id"],
        &["order_date"],
    );
    ty.relationship = Some(RelationshipSpec {
        parent: Arc::new(user()),
        foreign_key_fields: vec!["user_id".to_string()],
        sort_key_strategy: strategy,
    });

    ty
}
