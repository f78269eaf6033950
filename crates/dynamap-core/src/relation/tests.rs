use super::*;
use crate::{
    config::ConfigOverride,
    key::generate_partition_key,
    model::relation::RelationshipSpec,
    test_support::{entity_type, order, user},
};
use std::sync::Arc;

fn relationship(ty: &EntityType) -> &RelationshipSpec {
    ty.relationship.as_ref().expect("fixture has a relationship")
}

#[test]
fn child_partition_key_matches_parent_key() {
    let parent = user();
    let child = order(SortKeyStrategy::Prefix);
    let user_instance = Entity::empty(&parent.path).with("id", "u1");
    let order_instance = Entity::empty(&child.path)
        .with("id", "o9")
        .with("user_id", "u1");

    let parent_pk = generate_partition_key(&user_instance, &parent, &parent.config);
    let child_pk = generate_child_partition_key(&order_instance, relationship(&child));

    assert_eq!(child_pk, "user#u1");
    assert_eq!(child_pk, parent_pk);
}

#[test]
fn child_partition_key_uses_parent_config() {
    let mut parent = user();
    parent.config = parent
        .config
        .with_override(&ConfigOverride::default().key_separator("|"));
    let mut child = order(SortKeyStrategy::Prefix);
    child.relationship = Some(RelationshipSpec {
        parent: Arc::new(parent),
        foreign_key_fields: vec!["user_id".to_string()],
        sort_key_strategy: SortKeyStrategy::Prefix,
    });
    let instance = Entity::empty(&child.path).with("user_id", "u1");

    assert_eq!(
        generate_child_partition_key(&instance, relationship(&child)),
        "user|u1"
    );
}

#[test]
fn composite_parent_key_reads_positional_foreign_keys() {
    let parent = entity_type(
        "app::Account",
        &["org", "account_id"],
        &["org", "account_id"],
        &[],
    );
    let mut child = entity_type(
        "app::Invoice",
        &["org_ref", "acct_ref", "number"],
        &["number"],
        &["number"],
    );
    child.relationship = Some(RelationshipSpec {
        parent: Arc::new(parent),
        foreign_key_fields: vec!["org_ref".to_string(), "acct_ref".to_string()],
        sort_key_strategy: SortKeyStrategy::AsDefined,
    });
    let instance = Entity::empty(&child.path).with("org_ref", "acme");

    assert_eq!(
        generate_child_partition_key(&instance, relationship(&child)),
        "account#acme#empty"
    );
}

#[test]
fn prefix_strategy_prepends_child_type_name() {
    let child = order(SortKeyStrategy::Prefix);
    let instance = Entity::empty(&child.path).with("order_date", "2024-01-15");

    let sk = generate_child_sort_key(&instance, &child, relationship(&child), &child.config);

    assert_eq!(sk, "order#2024-01-15");
}

#[test]
fn prefix_strategy_with_empty_own_key_is_type_name() {
    let child = order(SortKeyStrategy::Prefix);
    let instance = Entity::empty(&child.path);

    let sk = generate_child_sort_key(&instance, &child, relationship(&child), &child.config);

    assert_eq!(sk, "order");
    assert!(sk.starts_with(&children_prefix(&child)));
}

#[test]
fn child_sort_keys_exclude_prefix_sharing_siblings() {
    let child = order(SortKeyStrategy::Prefix);
    let dated = Entity::empty(&child.path).with("order_date", "2024-01-15");
    let own = generate_child_sort_key(&dated, &child, relationship(&child), &child.config);

    assert!(is_child_sort_key(&own, &child));
    assert!(is_child_sort_key("order", &child));
    assert!(!is_child_sort_key("orderline#X1", &child));
    assert!(!is_child_sort_key("orderline", &child));
    assert!(!is_child_sort_key("user#u1", &child));
    assert!("orderline#X1".starts_with(&children_prefix(&child)));
}

#[test]
fn child_sort_key_check_uses_the_child_separator() {
    let mut child = order(SortKeyStrategy::Prefix);
    child.config = child
        .config
        .with_override(&ConfigOverride::default().key_separator("|"));

    assert!(is_child_sort_key("order|2024", &child));
    assert!(!is_child_sort_key("order#2024", &child));
}

#[test]
fn as_defined_strategy_keeps_own_sort_key() {
    let child = order(SortKeyStrategy::AsDefined);
    let instance = Entity::empty(&child.path).with("order_date", "2024-01-15");

    let sk = generate_child_sort_key(&instance, &child, relationship(&child), &child.config);

    assert_eq!(sk, "2024-01-15");
}

#[test]
fn resolve_primary_key_follows_the_relationship() {
    let child = order(SortKeyStrategy::Prefix);
    let instance = Entity::empty(&child.path)
        .with("id", "o9")
        .with("user_id", "u1")
        .with("order_date", "2024-01-15");

    let key = resolve_primary_key(&instance, &child);

    assert_eq!(key.pk, "user#u1");
    assert_eq!(key.sk.as_deref(), Some("order#2024-01-15"));
}

#[test]
fn resolve_primary_key_without_relationship_uses_own_keys() {
    let ty = user();
    let instance = Entity::empty(&ty.path).with("id", "u1");

    let key = resolve_primary_key(&instance, &ty);

    assert_eq!(key.pk, "user#u1");
    assert_eq!(key.sk, None);
}

#[test]
fn as_defined_child_without_sort_key_has_none() {
    let mut child = entity_type("app::Profile", &["user_id"], &["user_id"], &[]);
    child.relationship = Some(RelationshipSpec {
        parent: Arc::new(user()),
        foreign_key_fields: vec!["user_id".to_string()],
        sort_key_strategy: SortKeyStrategy::AsDefined,
    });
    let instance = Entity::empty(&child.path).with("user_id", "u1");

    let key = resolve_primary_key(&instance, &child);

    assert_eq!(key.pk, "user#u1");
    assert_eq!(key.sk, None);
}
