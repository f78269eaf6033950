//! Core engine for dynamap: key generation, secondary-index and relationship
//! key derivation, key-condition building, and the attribute-value codec.
//!
//! Everything in this crate is pure and synchronous. Functions take the
//! entity instance, its type metadata and an explicit [`KeyConfig`], and
//! never consult ambient configuration.
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod index;
pub mod key;
pub mod model;
pub mod obs;
pub mod query;
pub mod relation;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::KeyConfig;

///
/// CONSTANTS
///

/// Segment substituted into partition and index keys for null or absent values.
pub const EMPTY_SEGMENT: &str = "empty";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or codec helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::KeyConfig,
        model::{
            entity::{Entity, EntityType},
            field::{FieldSpec, KeySource, KeySpec},
            index::{Projection, SecondaryIndexSpec},
            relation::{RelationshipSpec, SortKeyStrategy},
        },
        query::{QueryOptions, SortOperator},
        value::{AttributeValue, Item, Value},
    };
}
