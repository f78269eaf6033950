//! Typed store operations over a [`Transport`].
//!
//! A session derives keys and key conditions through the core, encodes and
//! decodes entities with the attribute-value codec, and reports each store
//! call through the metrics sink.

use crate::{
    Error,
    transport::{DeleteItem, GetItem, PutItem, QueryRequest, Request, Response, Transport},
};
use dynamap_core::{
    error::{ErrorOrigin, InternalError},
    index,
    key::{self, PrimaryKey},
    model::{
        entity::{Entity, EntityType},
        relation::SortKeyStrategy,
    },
    obs::{ExecKind, MetricsEvent, Span, record},
    query::{KeyConditionBuilder, QueryOptions},
    relation,
    value::{AttributeValue, Item, decode_item_into, encode_entity},
};
use tracing::debug;

///
/// QueryPage
/// One page of decoded query results.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Entity>,
    /// Pass back as `exclusive_start_key` to read the next page.
    pub last_evaluated_key: Option<Item>,
}

impl QueryPage {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

///
/// Session
///

#[derive(Debug)]
pub struct Session<T> {
    transport: T,
}

impl<T: Transport> Session<T> {
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Write an instance; its key attributes are added to the encoded item.
    pub fn put(&self, entity: &Entity, ty: &EntityType) -> Result<PrimaryKey, Error> {
        let mut span = Span::new(ExecKind::Put, &ty.path);
        ensure_instance(entity, ty)?;

        let key = primary_key(entity, ty);
        let mut item = encode_entity(entity, ty)?;
        item.extend(key::key_attributes(&key, &ty.config));

        self.execute(Request::PutItem(PutItem {
            table_name: ty.table.clone(),
            item,
        }))?;

        span.set_items(1);
        span.finish();

        Ok(key)
    }

    /// Read the instance whose key fields match `lookup`.
    pub fn get(&self, lookup: &Entity, ty: &EntityType) -> Result<Option<Entity>, Error> {
        let mut span = Span::new(ExecKind::Get, &ty.path);
        ensure_instance(lookup, ty)?;

        let key = primary_key(lookup, ty);
        let response = self.execute(Request::GetItem(GetItem {
            table_name: ty.table.clone(),
            key: key::key_attributes(&key, &ty.config),
        }))?;

        let entity = response
            .item
            .map(|item| decode_item_into(&item, ty))
            .transpose()?;

        let items = u64::from(entity.is_some());
        record(MetricsEvent::ItemsDecoded {
            entity_path: &ty.path,
            items,
        });
        span.set_items(items);
        span.finish();

        Ok(entity)
    }

    /// Delete the instance whose key fields match `lookup`.
    pub fn delete(&self, lookup: &Entity, ty: &EntityType) -> Result<PrimaryKey, Error> {
        let span = Span::new(ExecKind::Delete, &ty.path);
        ensure_instance(lookup, ty)?;

        let key = primary_key(lookup, ty);
        self.execute(Request::DeleteItem(DeleteItem {
            table_name: ty.table.clone(),
            key: key::key_attributes(&key, &ty.config),
        }))?;
        span.finish();

        Ok(key)
    }

    /// Query the partition `lookup` belongs to.
    ///
    /// A sort operator given without a value applies to the sort key derived
    /// from `lookup`, which may be partial.
    pub fn query(
        &self,
        lookup: &Entity,
        ty: &EntityType,
        options: &QueryOptions,
    ) -> Result<QueryPage, Error> {
        let span = Span::new(ExecKind::Query, &ty.path);
        ensure_instance(lookup, ty)?;

        let PrimaryKey { pk, sk } = primary_key(lookup, ty);
        let options = options
            .clone()
            .fill_sort_key(sk.filter(|sk| !sk.is_empty()));
        let condition = KeyConditionBuilder::for_config(&ty.config).build(&pk, &options)?;
        record(MetricsEvent::QueryBuilt { index: false });

        self.run_query(span, ty, QueryRequest::new(ty.table.clone(), condition), |_| true)
    }

    /// Query a secondary index using the index key values on `lookup`.
    ///
    /// A sort operator given without a value applies to the index sort field
    /// on `lookup`, which must then be populated.
    pub fn query_index(
        &self,
        lookup: &Entity,
        ty: &EntityType,
        index_name: &str,
        options: &QueryOptions,
    ) -> Result<QueryPage, Error> {
        let span = Span::new(ExecKind::Query, &ty.path);
        ensure_instance(lookup, ty)?;

        let index = index::find_index(ty, index_name)?;
        let requires_sort_key = if index.has_sort_key() {
            options.needs_sort_value()
        } else {
            options.has_sort_condition()
        };
        index::validate(lookup, index, requires_sort_key)?;

        let pk = index::generate_index_partition_key(lookup, index);
        let options = options
            .clone()
            .fill_sort_key(index::generate_index_sort_key(lookup, index));
        let condition = KeyConditionBuilder::for_index(index).build(&pk, &options)?;
        record(MetricsEvent::QueryBuilt { index: true });

        self.run_query(span, ty, QueryRequest::new(ty.table.clone(), condition), |_| true)
    }

    /// Query the children of `parent` stored in its partition.
    ///
    /// With the `Prefix` strategy and no caller sort condition, the query is
    /// narrowed to the child type's sort-key prefix. Under `Prefix`, rows
    /// written by sibling types whose names share that prefix are skipped.
    pub fn query_children(
        &self,
        parent: &Entity,
        parent_ty: &EntityType,
        child_ty: &EntityType,
        options: &QueryOptions,
    ) -> Result<QueryPage, Error> {
        let span = Span::new(ExecKind::Query, &child_ty.path);
        ensure_instance(parent, parent_ty)?;

        let Some(relationship) = child_ty
            .relationship
            .as_ref()
            .filter(|rel| rel.parent.path == parent_ty.path)
        else {
            return Err(InternalError::validation(
                ErrorOrigin::Relation,
                format!(
                    "'{}' does not belong to '{}'",
                    child_ty.path, parent_ty.path
                ),
            )
            .into());
        };

        let pk = key::generate_partition_key(parent, parent_ty, &parent_ty.config);
        record(MetricsEvent::KeysGenerated {
            entity_path: &parent_ty.path,
        });

        let prefixed = relationship.sort_key_strategy == SortKeyStrategy::Prefix;
        let narrowed;
        let options = if prefixed && !options.has_sort_condition() {
            narrowed = options
                .clone()
                .begins_with(relation::children_prefix(child_ty));
            &narrowed
        } else {
            options
        };

        let condition = KeyConditionBuilder::for_config(&child_ty.config).build(&pk, options)?;
        record(MetricsEvent::QueryBuilt { index: false });

        let sk_attr = &child_ty.config.sort_key_attr_name;
        self.run_query(
            span,
            child_ty,
            QueryRequest::new(child_ty.table.clone(), condition),
            |item| {
                !prefixed
                    || item
                        .get(sk_attr)
                        .and_then(AttributeValue::as_s)
                        .is_some_and(|sk| relation::is_child_sort_key(sk, child_ty))
            },
        )
    }

    // Decode the response rows that `keep` accepts.
    fn run_query(
        &self,
        mut span: Span<'_>,
        ty: &EntityType,
        request: QueryRequest,
        keep: impl Fn(&Item) -> bool,
    ) -> Result<QueryPage, Error> {
        let response = self.execute(Request::Query(request))?;

        let returned = response.items.len();
        let items = response
            .items
            .iter()
            .filter(|item| keep(*item))
            .map(|item| decode_item_into(item, ty))
            .collect::<Result<Vec<_>, _>>()?;

        if items.len() < returned {
            debug!(
                entity = %ty.path,
                skipped = returned - items.len(),
                "skipped rows of other types"
            );
        }

        let count = items.len() as u64;
        record(MetricsEvent::ItemsDecoded {
            entity_path: &ty.path,
            items: count,
        });
        span.set_items(count);
        span.finish();

        Ok(QueryPage {
            items,
            last_evaluated_key: response.last_evaluated_key,
        })
    }

    fn execute(&self, request: Request) -> Result<Response, Error> {
        let operation = request.operation();
        let table = request.table_name().to_string();
        debug!(operation, table = %table, "executing store request");

        match self.transport.execute(request) {
            Ok(response) => {
                debug!(
                    operation,
                    table = %table,
                    items = response.items.len(),
                    found = response.item.is_some(),
                    "store request complete"
                );
                Ok(response)
            }
            Err(err) => {
                debug!(operation, table = %table, error = %err, "store request failed");
                Err(err.into())
            }
        }
    }
}

fn ensure_instance(entity: &Entity, ty: &EntityType) -> Result<(), Error> {
    if entity.is_instance_of(ty) {
        return Ok(());
    }

    Err(InternalError::validation(
        ErrorOrigin::Schema,
        format!(
            "instance of '{}' used with type '{}'",
            entity.entity_path(),
            ty.path
        ),
    )
    .into())
}

fn primary_key(entity: &Entity, ty: &EntityType) -> PrimaryKey {
    let key = relation::resolve_primary_key(entity, ty);
    record(MetricsEvent::KeysGenerated {
        entity_path: &ty.path,
    });

    key
}
