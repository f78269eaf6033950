//! ## Crate layout
//! - `core`: key generation, index and relationship keys, key conditions,
//!   the attribute-value codec and metrics.
//! - `schema`: entity builders, the registry and layered key config.
//! - `transport`: the store collaborator boundary and request descriptors.
//! - `session`: typed put/get/delete/query over a transport.
//!
//! The `prelude` module carries the vocabulary most callers need.

pub use dynamap_core as core;
pub use dynamap_schema as schema;

pub mod error;
pub mod session;
pub mod transport;

pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{Error, ErrorKind, ErrorOrigin},
        session::{QueryPage, Session},
        transport::{Request, Response, Transport, TransportError},
    };
    pub use dynamap_core::{key::PrimaryKey, prelude::*};
    pub use dynamap_schema::{EntityBuilder, Registry, Schema};
}
