use crate::{index::IndexError, query::QueryError, value::CodecError};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured engine error with a stable classification.
/// Module errors convert into this shape at crate boundaries.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a caller-recoverable validation error.
    pub fn validation(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, origin, message)
    }

    /// Construct a codec-origin error for malformed wire data.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Codec, ErrorOrigin::Codec, message)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        Self::codec(err.to_string())
    }
}

impl From<IndexError> for InternalError {
    fn from(err: IndexError) -> Self {
        Self::validation(ErrorOrigin::Index, err.to_string())
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        Self::validation(ErrorOrigin::Query, err.to_string())
    }
}

///
/// ErrorClass
///
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    /// Entity type construction failed; a programmer error.
    Definition,
    /// Call-time input does not meet a documented prerequisite.
    Validation,
    /// Wire data does not match the attribute-value contract.
    Codec,
}

///
/// ErrorOrigin
///
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Index,
    Query,
    Relation,
    Schema,
    Transport,
}
