use super::*;
use crate::{
    test_support::{test_item, user},
    value::Value,
};

#[test]
fn find_index_returns_the_named_index() {
    let ty = user();

    let index = find_index(&ty, "email_index").expect("index should exist");

    assert_eq!(index.partition_key_field, "email");
    assert_eq!(index.sort_key_field.as_deref(), Some("created_at"));
}

#[test]
fn unknown_index_lists_available_names_sorted() {
    let ty = user();

    let err = find_index(&ty, "missing").unwrap_err();

    let IndexError::NotFound { available, .. } = &err else {
        panic!("expected NotFound, got {err:?}");
    };
    assert_eq!(available, &["email_index", "status_index"]);
    assert!(err.to_string().contains("email_index, status_index"));
}

#[test]
fn unknown_index_on_type_without_indexes_says_none() {
    let err = find_index(&test_item(), "any").unwrap_err();

    assert!(err.to_string().ends_with("available indexes: none"));
}

#[test]
fn lookup_is_deterministic() {
    let ty = user();

    let first = find_index(&ty, "status_index").map(|i| i.name.clone());
    let second = find_index(&ty, "status_index").map(|i| i.name.clone());

    assert_eq!(first, second);
    assert_eq!(find_index(&ty, "nope"), find_index(&ty, "nope"));
}

#[test]
fn missing_partition_field_is_reported_before_sort_field() {
    let ty = user();
    let index = find_index(&ty, "email_index").unwrap();
    let entity = Entity::empty(&ty.path).with("email", Value::Null);

    let err = validate(&entity, index, true).unwrap_err();

    assert_eq!(
        err,
        IndexError::MissingPartitionKey {
            index: "email_index".to_string(),
            field: "email".to_string(),
        }
    );
    assert!(err.to_string().contains("'email'"));
    assert!(!err.to_string().contains("created_at"));
}

#[test]
fn sort_condition_on_partition_only_index_fails() {
    let ty = user();
    let index = find_index(&ty, "status_index").unwrap();
    let entity = Entity::empty(&ty.path).with("status", "active");

    assert_eq!(
        validate(&entity, index, true),
        Err(IndexError::NoSortKey {
            index: "status_index".to_string(),
        })
    );
    assert_eq!(validate(&entity, index, false), Ok(()));
}

#[test]
fn sort_field_is_required_only_when_requested() {
    let ty = user();
    let index = find_index(&ty, "email_index").unwrap();
    let entity = Entity::empty(&ty.path).with("email", "a@b.c");

    assert_eq!(validate(&entity, index, false), Ok(()));
    assert!(matches!(
        validate(&entity, index, true),
        Err(IndexError::MissingSortKey { ref field, .. }) if field == "created_at"
    ));

    let entity = entity.with("created_at", "2024-01-15");
    assert_eq!(validate(&entity, index, true), Ok(()));
}

#[test]
fn validate_by_name_runs_lookup_first() {
    let ty = user();
    let entity = Entity::empty(&ty.path);

    assert!(matches!(
        validate_by_name(&entity, &ty, "missing", true),
        Err(IndexError::NotFound { .. })
    ));
    assert!(matches!(
        validate_by_name(&entity, &ty, "email_index", true),
        Err(IndexError::MissingPartitionKey { .. })
    ));
}

#[test]
fn index_keys_are_raw_values() {
    let ty = user();
    let email = find_index(&ty, "email_index").unwrap();
    let status = find_index(&ty, "status_index").unwrap();
    let entity = Entity::empty(&ty.path)
        .with("email", "a@b.c")
        .with("created_at", 1_700_000_000_i64);

    assert_eq!(generate_index_partition_key(&entity, email), "a@b.c");
    assert_eq!(
        generate_index_sort_key(&entity, email).as_deref(),
        Some("1700000000")
    );
    assert_eq!(generate_index_partition_key(&entity, status), "empty");
    assert_eq!(generate_index_sort_key(&entity, status), None);
}
