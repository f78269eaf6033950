use crate::transport::TransportError;
use derive_more::Display;
use dynamap_core::{
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    index::IndexError,
    query::QueryError,
    value::CodecError,
};
use dynamap_schema::ErrorTree;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<IndexError> for Error {
    fn from(err: IndexError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ErrorTree> for Error {
    fn from(err: ErrorTree) -> Self {
        Self::new(ErrorKind::Definition, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Self::new(ErrorKind::Transport, ErrorOrigin::Transport, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// An entity type is malformed; fix the definition.
    Definition,

    /// Call-time input does not meet a documented prerequisite.
    Validation,

    /// Stored data does not match the attribute-value contract.
    Codec,

    /// The store collaborator failed.
    Transport,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Definition => Self::Definition,
            ErrorClass::Validation => Self::Validation,
            ErrorClass::Codec => Self::Codec,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Codec,
    Index,
    Query,
    Relation,
    Schema,
    Transport,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Codec => Self::Codec,
            CoreErrorOrigin::Index => Self::Index,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Relation => Self::Relation,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Transport => Self::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamap_core::query::InvalidQuery;
    use dynamap_schema::DefinitionError;

    #[test]
    fn query_errors_surface_as_validation() {
        let err: Error = QueryError::from(InvalidQuery::BetweenWithoutEnd).into();

        assert!(err.is_validation());
        assert_eq!(err.origin, ErrorOrigin::Query);
    }

    #[test]
    fn definition_errors_keep_every_message() {
        let mut tree = ErrorTree::new();
        tree.add_for("app::User", DefinitionError::MissingTable);
        tree.add_for("app::Order", DefinitionError::ForeignKeyWithoutParent);

        let err: Error = tree.into();

        assert_eq!(err.kind, ErrorKind::Definition);
        assert!(err.message.contains("app::User: no table bound"));
        assert!(err.message.contains("app::Order: foreign key given"));
    }

    #[test]
    fn transport_errors_are_wrapped() {
        let err: Error = TransportError::Unavailable("connection reset".to_string()).into();

        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.origin, ErrorOrigin::Transport);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn every_core_class_keeps_its_kind() {
        let pairs = [
            (ErrorClass::Definition, ErrorKind::Definition),
            (ErrorClass::Validation, ErrorKind::Validation),
            (ErrorClass::Codec, ErrorKind::Codec),
        ];

        for (class, kind) in pairs {
            assert_eq!(ErrorKind::from(class), kind);
            assert_eq!(class.to_string(), kind.to_string());
        }
    }

    #[test]
    fn codec_errors_surface_as_codec() {
        let err: Error = CodecError::EmptySet.into();

        assert_eq!(err.kind, ErrorKind::Codec);
        assert_eq!(err.origin, ErrorOrigin::Codec);
    }
}
