//! Store collaborator boundary.
//!
//! The library never talks to a store itself. Sessions build request
//! descriptors and hand them to a [`Transport`]; the descriptors serialise
//! to the store's PascalCase JSON request shape.

use dynamap_core::{
    query::KeyCondition,
    value::{AttributeValue, Item},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// Transport
///

pub trait Transport {
    fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}

///
/// TransportError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TransportError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected by store: {0}")]
    Rejected(String),

    #[error("malformed store response: {0}")]
    MalformedResponse(String),
}

///
/// Request
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Request {
    GetItem(GetItem),
    PutItem(PutItem),
    DeleteItem(DeleteItem),
    Query(QueryRequest),
}

impl Request {
    /// Store operation name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::GetItem(_) => "GetItem",
            Self::PutItem(_) => "PutItem",
            Self::DeleteItem(_) => "DeleteItem",
            Self::Query(_) => "Query",
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::GetItem(req) => &req.table_name,
            Self::PutItem(req) => &req.table_name,
            Self::DeleteItem(req) => &req.table_name,
            Self::Query(req) => &req.table_name,
        }
    }

    /// Render the request body alone, without the operation wrapper.
    pub fn body_json(&self) -> Result<JsonValue, serde_json::Error> {
        match self {
            Self::GetItem(req) => serde_json::to_value(req),
            Self::PutItem(req) => serde_json::to_value(req),
            Self::DeleteItem(req) => serde_json::to_value(req),
            Self::Query(req) => serde_json::to_value(req),
        }
    }
}

///
/// GetItem
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItem {
    pub table_name: String,
    pub key: Item,
}

///
/// PutItem
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItem {
    pub table_name: String,
    pub item: Item,
}

///
/// DeleteItem
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItem {
    pub table_name: String,
    pub key: Item,
}

///
/// QueryRequest
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRequest {
    pub table_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    pub key_condition_expression: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_names: BTreeMap<String, String>,

    pub expression_attribute_values: BTreeMap<String, AttributeValue>,

    pub scan_index_forward: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Item>,
}

impl QueryRequest {
    #[must_use]
    pub fn new(table_name: impl Into<String>, condition: KeyCondition) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: condition.index_name,
            key_condition_expression: condition.expression,
            filter_expression: condition.filter_expression,
            projection_expression: condition.projection_expression,
            expression_attribute_names: condition.attribute_names,
            expression_attribute_values: condition.attribute_values,
            scan_index_forward: condition.scan_forward,
            limit: condition.limit,
            exclusive_start_key: condition.exclusive_start_key,
        }
    }
}

///
/// Response
///
/// `item` answers GetItem, `items` answers Query; writes leave both empty.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Item>,
}

impl Response {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_item(item: Item) -> Self {
        Self {
            item: Some(item),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_items(items: Vec<Item>, last_evaluated_key: Option<Item>) -> Self {
        Self {
            items,
            last_evaluated_key,
            ..Self::default()
        }
    }

    /// Parse a store response from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|err| TransportError::MalformedResponse(err.to_string()))
    }
}
