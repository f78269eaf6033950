//! Key-condition expression building.
//!
//! Produces the condition string and value bindings the store's query call
//! expects. Placeholders `:pk`, `:sk` and `:sk_end` belong to the builder;
//! everything else the caller passes through is merged verbatim.


use crate::{
    config::KeyConfig,
    model::index::SecondaryIndexSpec,
    value::{AttributeValue, Item},
};
use derive_more::Display;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

pub const PK_PLACEHOLDER: &str = ":pk";
pub const SK_PLACEHOLDER: &str = ":sk";
pub const SK_END_PLACEHOLDER: &str = ":sk_end";

const RESERVED_PLACEHOLDERS: [&str; 3] = [PK_PLACEHOLDER, SK_PLACEHOLDER, SK_END_PLACEHOLDER];

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] InvalidQuery),
}

///
/// InvalidQuery
/// Caller-supplied options that cannot form a key condition.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum InvalidQuery {
    #[error("sort operator {operator} given without a sort key value")]
    OperatorWithoutSortKey { operator: SortOperator },

    #[error("BETWEEN requires sort_key_end")]
    BetweenWithoutEnd,

    #[error("expression attribute value '{placeholder}' is reserved for the key condition")]
    ReservedPlaceholder { placeholder: String },

    #[error("sort key condition against '{index}', which has no sort key")]
    NoSortKeyAttribute { index: String },
}

///
/// SortOperator
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum SortOperator {
    #[default]
    #[display("=")]
    FullMatch,
    #[display("begins_with")]
    BeginsWith,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
    #[display("BETWEEN")]
    Between,
}

impl SortOperator {
    // Condition fragment on the sort attribute.
    fn condition(self, attr: &str) -> String {
        match self {
            Self::BeginsWith => format!("begins_with({attr}, {SK_PLACEHOLDER})"),
            Self::Between => format!("{attr} BETWEEN {SK_PLACEHOLDER} AND {SK_END_PLACEHOLDER}"),
            Self::FullMatch | Self::Lt | Self::Lte | Self::Gt | Self::Gte => {
                format!("{attr} {self} {SK_PLACEHOLDER}")
            }
        }
    }
}

///
/// QueryOptions
///
/// Caller options for one key-condition query. `sort_operator` defaults to
/// `FullMatch` whenever a sort value is given.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryOptions {
    pub sort_key: Option<String>,
    pub sort_operator: Option<SortOperator>,
    pub sort_key_end: Option<String>,
    pub scan_forward: bool,
    pub limit: Option<u32>,
    pub exclusive_start_key: Option<Item>,
    pub filter_expression: Option<String>,
    pub projection_expression: Option<String>,
    pub expression_attribute_names: BTreeMap<String, String>,
    pub expression_attribute_values: BTreeMap<String, AttributeValue>,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sort_key(mut self, value: impl Into<String>) -> Self {
        self.sort_key = Some(value.into());
        self
    }

    #[must_use]
    pub const fn sort_operator(mut self, operator: SortOperator) -> Self {
        self.sort_operator = Some(operator);
        self
    }

    #[must_use]
    pub fn sort_key_end(mut self, value: impl Into<String>) -> Self {
        self.sort_key_end = Some(value.into());
        self
    }

    /// Shorthand for `BeginsWith` on `prefix`.
    #[must_use]
    pub fn begins_with(self, prefix: impl Into<String>) -> Self {
        self.sort_key(prefix).sort_operator(SortOperator::BeginsWith)
    }

    /// Shorthand for `Between` on `[start, end]`.
    #[must_use]
    pub fn between(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.sort_key(start)
            .sort_key_end(end)
            .sort_operator(SortOperator::Between)
    }

    #[must_use]
    pub const fn scan_forward(mut self, forward: bool) -> Self {
        self.scan_forward = forward;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn exclusive_start_key(mut self, key: Item) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    #[must_use]
    pub fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn projection_expression(mut self, expression: impl Into<String>) -> Self {
        self.projection_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn attribute_name(
        mut self,
        placeholder: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), name.into());
        self
    }

    #[must_use]
    pub fn attribute_value(
        mut self,
        placeholder: impl Into<String>,
        value: AttributeValue,
    ) -> Self {
        self.expression_attribute_values
            .insert(placeholder.into(), value);
        self
    }

    /// Whether these options put a condition on the sort key.
    #[must_use]
    pub const fn has_sort_condition(&self) -> bool {
        self.sort_key.is_some() || self.sort_operator.is_some()
    }

    /// Whether an operator is set with no sort value to apply it to.
    #[must_use]
    pub const fn needs_sort_value(&self) -> bool {
        self.sort_operator.is_some() && self.sort_key.is_none()
    }

    /// Use `value` as the sort value when an operator was given without one.
    /// An explicit sort value always wins.
    #[must_use]
    pub fn fill_sort_key(mut self, value: Option<String>) -> Self {
        if self.needs_sort_value() {
            self.sort_key = value;
        }
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sort_key: None,
            sort_operator: None,
            sort_key_end: None,
            scan_forward: true,
            limit: None,
            exclusive_start_key: None,
            filter_expression: None,
            projection_expression: None,
            expression_attribute_names: BTreeMap::new(),
            expression_attribute_values: BTreeMap::new(),
        }
    }
}

///
/// KeyCondition
/// Built key condition plus the passthrough query parameters.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyCondition {
    pub index_name: Option<String>,
    pub expression: String,
    pub attribute_names: BTreeMap<String, String>,
    pub attribute_values: BTreeMap<String, AttributeValue>,
    pub filter_expression: Option<String>,
    pub projection_expression: Option<String>,
    pub scan_forward: bool,
    pub limit: Option<u32>,
    pub exclusive_start_key: Option<Item>,
}

///
/// KeyConditionBuilder
///
/// Holds the attribute names the condition is written against: the table's
/// key attributes or one secondary index's key fields.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyConditionBuilder {
    index_name: Option<String>,
    partition_key_attr: String,
    sort_key_attr: Option<String>,
}

impl KeyConditionBuilder {
    /// Builder over the default `pk`/`sk` attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_attributes(
            KeyConfig::DEFAULT_PARTITION_KEY_ATTR,
            KeyConfig::DEFAULT_SORT_KEY_ATTR,
        )
    }

    #[must_use]
    pub fn with_attributes(
        partition_key_attr: impl Into<String>,
        sort_key_attr: impl Into<String>,
    ) -> Self {
        Self {
            index_name: None,
            partition_key_attr: partition_key_attr.into(),
            sort_key_attr: Some(sort_key_attr.into()),
        }
    }

    /// Builder over the configured table key attributes.
    #[must_use]
    pub fn for_config(config: &KeyConfig) -> Self {
        Self::with_attributes(
            config.partition_key_attr_name.clone(),
            config.sort_key_attr_name.clone(),
        )
    }

    /// Builder over a secondary index's key fields.
    #[must_use]
    pub fn for_index(index: &SecondaryIndexSpec) -> Self {
        Self {
            index_name: Some(index.name.clone()),
            partition_key_attr: index.partition_key_field.clone(),
            sort_key_attr: index.sort_key_field.clone(),
        }
    }

    /// Build the key condition for one partition.
    pub fn build(
        &self,
        partition_key: &str,
        options: &QueryOptions,
    ) -> Result<KeyCondition, QueryError> {
        if let Some(placeholder) = options
            .expression_attribute_values
            .keys()
            .find(|key| RESERVED_PLACEHOLDERS.contains(&key.as_str()))
        {
            return Err(InvalidQuery::ReservedPlaceholder {
                placeholder: placeholder.clone(),
            }
            .into());
        }

        let mut expression = format!("{} = {PK_PLACEHOLDER}", self.partition_key_attr);
        let mut values = BTreeMap::from([(
            PK_PLACEHOLDER.to_string(),
            AttributeValue::S(partition_key.to_string()),
        )]);

        if let Some((fragment, bindings)) = self.sort_condition(options)? {
            expression.push_str(" AND ");
            expression.push_str(&fragment);
            values.extend(bindings);
        }

        values.extend(options.expression_attribute_values.clone());

        Ok(KeyCondition {
            index_name: self.index_name.clone(),
            expression,
            attribute_names: options.expression_attribute_names.clone(),
            attribute_values: values,
            filter_expression: options.filter_expression.clone(),
            projection_expression: options.projection_expression.clone(),
            scan_forward: options.scan_forward,
            limit: options.limit,
            exclusive_start_key: options.exclusive_start_key.clone(),
        })
    }

    // Sort fragment and its bindings, if the options ask for one.
    fn sort_condition(
        &self,
        options: &QueryOptions,
    ) -> Result<Option<(String, Vec<(String, AttributeValue)>)>, InvalidQuery> {
        let Some(value) = &options.sort_key else {
            return match options.sort_operator {
                Some(operator) => Err(InvalidQuery::OperatorWithoutSortKey { operator }),
                None => Ok(None),
            };
        };

        let attr = self
            .sort_key_attr
            .as_deref()
            .ok_or_else(|| InvalidQuery::NoSortKeyAttribute {
                index: self
                    .index_name
                    .clone()
                    .unwrap_or_else(|| self.partition_key_attr.clone()),
            })?;

        let operator = options.sort_operator.unwrap_or_default();
        let mut bindings = vec![(SK_PLACEHOLDER.to_string(), AttributeValue::S(value.clone()))];

        if operator == SortOperator::Between {
            let end = options
                .sort_key_end
                .as_ref()
                .ok_or(InvalidQuery::BetweenWithoutEnd)?;
            bindings.push((SK_END_PLACEHOLDER.to_string(), AttributeValue::S(end.clone())));
        }

        Ok(Some((operator.condition(attr), bindings)))
    }
}

impl Default for KeyConditionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a key condition over the default `pk`/`sk` attributes.
pub fn build(partition_key: &str, options: &QueryOptions) -> Result<KeyCondition, QueryError> {
    KeyConditionBuilder::new().build(partition_key, options)
}
