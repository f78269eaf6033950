use dynamap_schema::{
    DefinitionError, EntityBuilder, Registry,
    prelude::{SecondaryIndexSpec, SortKeyStrategy},
};
use proptest::prelude::*;

fn user() -> EntityBuilder {
    EntityBuilder::new("app::User")
        .table("main")
        .partition_key_field("id")
        .field("email")
        .index(SecondaryIndexSpec::new("email_index", "email"))
}

fn order() -> EntityBuilder {
    EntityBuilder::new("app::Order")
        .table("main")
        .partition_key_field("id")
        .sort_key_field("order_date")
        .field("user_id")
        .belongs_to_path("app::User")
        .foreign_key(["user_id"])
}

fn line_item() -> EntityBuilder {
    EntityBuilder::new("app::LineItem")
        .table("main")
        .partition_key_field("sku")
        .field("id")
        .belongs_to_path("app::Order")
        .sort_key_strategy(SortKeyStrategy::AsDefined)
}

#[test]
fn children_resolve_parents_registered_later() {
    let schema = Registry::new()
        .register(line_item())
        .register(order())
        .register(user())
        .finalize()
        .expect("schema builds");

    assert_eq!(schema.len(), 3);

    let order = schema.get("app::Order").expect("order");
    let rel = order.relationship.as_ref().expect("order has a parent");
    assert_eq!(rel.parent.path, "app::User");
    assert_eq!(rel.foreign_key_fields, ["user_id"]);

    let item = schema.get("app::LineItem").expect("line item");
    let rel = item.relationship.as_ref().expect("line item has a parent");
    assert_eq!(rel.foreign_key_fields, ["id"]);
    assert_eq!(rel.sort_key_strategy, SortKeyStrategy::AsDefined);
}

#[test]
fn children_of_lists_direct_children() {
    let schema = Registry::new()
        .register(user())
        .register(order())
        .register(line_item())
        .finalize()
        .expect("schema builds");

    let children: Vec<&str> = schema
        .children_of("app::User")
        .into_iter()
        .map(|ty| ty.path.as_str())
        .collect();

    assert_eq!(children, ["app::Order"]);
    assert!(schema.children_of("app::LineItem").is_empty());
    assert_eq!(
        schema.get_by_name("main", "lineitem").map(|ty| ty.path.as_str()),
        Some("app::LineItem")
    );
}

#[test]
fn unknown_parent_path_is_reported_under_the_child() {
    let err = Registry::new()
        .register(order())
        .finalize()
        .expect_err("parent missing");

    let child = err.child("app::Order").expect("errors routed to child");
    assert_eq!(
        child.errors(),
        [DefinitionError::UnknownParent {
            parent: "app::User".to_string()
        }]
    );
}

#[test]
fn belongs_to_cycles_are_rejected() {
    let a = EntityBuilder::new("app::A")
        .table("main")
        .partition_key_field("id")
        .belongs_to_path("app::B");
    let b = EntityBuilder::new("app::B")
        .table("main")
        .partition_key_field("id")
        .belongs_to_path("app::A");

    let err = Registry::new()
        .register(a)
        .register(b)
        .finalize()
        .expect_err("cycle");

    assert_eq!(err.len(), 1, "{err}");
    assert!(err.contains(|e| matches!(
        e,
        DefinitionError::RelationshipCycle { path } if path == &["app::A", "app::B", "app::A"]
    )));
}

#[test]
fn self_reference_is_a_cycle() {
    let err = Registry::new()
        .register(
            EntityBuilder::new("app::Node")
                .table("main")
                .partition_key_field("id")
                .belongs_to_path("app::Node"),
        )
        .finalize()
        .expect_err("self cycle");

    assert!(err.contains(|e| matches!(e, DefinitionError::RelationshipCycle { .. })));
}

#[test]
fn duplicate_paths_are_rejected() {
    let err = Registry::new()
        .register(user())
        .register(user())
        .finalize()
        .expect_err("duplicate path");

    assert!(err.contains(|e| matches!(
        e,
        DefinitionError::DuplicateEntityPath { path } if path == "app::User"
    )));
}

#[test]
fn names_must_be_unique_per_table() {
    let err = Registry::new()
        .register(user())
        .register(
            EntityBuilder::new("billing::User")
                .table("main")
                .partition_key_field("id"),
        )
        .finalize()
        .expect_err("name clash");

    assert!(err.contains(|e| matches!(
        e,
        DefinitionError::DuplicateEntityName { name, table, .. } if name == "user" && table == "main"
    )));
}

#[test]
fn same_name_in_other_tables_is_fine() {
    let schema = Registry::new()
        .register(user())
        .register(
            EntityBuilder::new("billing::User")
                .table("billing")
                .partition_key_field("id"),
        )
        .finalize()
        .expect("distinct tables");

    assert!(schema.get_by_name("billing", "user").is_some());
}

#[test]
fn a_failed_parent_does_not_cascade() {
    let broken_user = EntityBuilder::new("app::User")
        .partition_key_field("id")
        .field("user_id");

    let err = Registry::new()
        .register(broken_user)
        .register(order())
        .finalize()
        .expect_err("parent has no table");

    assert!(err.child("app::User").is_some());
    assert!(err.child("app::Order").is_none());
}

proptest! {
    #[test]
    fn registration_order_does_not_matter(order_ix in Just(vec![0usize, 1, 2]).prop_shuffle()) {
        let builders = [user(), order(), line_item()];
        let registry = order_ix
            .into_iter()
            .fold(Registry::new(), |reg, ix| reg.register(builders[ix].clone()));

        let schema = registry.finalize().expect("schema builds");

        prop_assert_eq!(schema.len(), 3);
        let parents: Vec<Option<String>> = schema
            .iter()
            .map(|ty| ty.relationship.as_ref().map(|r| r.parent.path.clone()))
            .collect();
        prop_assert_eq!(
            parents,
            vec![
                Some("app::Order".to_string()),
                Some("app::User".to_string()),
                None,
            ]
        );
    }
}
