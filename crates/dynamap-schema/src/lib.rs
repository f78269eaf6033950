//! Entity definition for dynamap: fluent builders, a two-phase registry for
//! belongs-to relationships declared by path, and layered key config.
//!
//! Everything here runs at definition time. A successfully built
//! `EntityType` is immutable and carries its resolved config.

pub mod builder;
pub mod config;
pub mod error;
pub mod registry;
pub mod validate;

pub use builder::{EntityBuilder, ParentRef};
pub use error::{DefinitionError, ErrorTree};
pub use registry::{Registry, Schema};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        builder::EntityBuilder,
        error::ErrorTree,
        registry::{Registry, Schema},
    };
    pub use dynamap_core::prelude::*;
}
