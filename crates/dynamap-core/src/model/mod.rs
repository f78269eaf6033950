//! Runtime data model definitions.
//!
//! These are the immutable shapes every core function consumes. They are
//! produced by the schema layer (`dynamap-schema`), which owns definition
//! time validation; nothing here re-checks them at call time.
//!
//! In general:
//! - the schema layer defines *what exists*
//! - `model` defines *what runs*

pub mod entity;
pub mod field;
pub mod index;
pub mod relation;
