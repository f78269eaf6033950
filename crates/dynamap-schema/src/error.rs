use dynamap_core::config::ConfigError;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};
use thiserror::Error as ThisError;

///
/// DefinitionError
///
/// One definition-time problem with an entity type. These are programmer
/// errors; they surface from `EntityBuilder::build` or `Registry::finalize`
/// and never at call time.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DefinitionError {
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("no table bound")]
    MissingTable,

    #[error("field '{field}' declared more than once")]
    DuplicateField { field: String },

    #[error("partition key already declared as [{existing}]")]
    DuplicatePartitionKey { existing: String },

    #[error("sort key already declared as [{existing}]")]
    DuplicateSortKey { existing: String },

    #[error("{context} lists no fields")]
    EmptyKey { context: String },

    #[error("{context} lists field '{field}' more than once")]
    RepeatedKeyField { context: String, field: String },

    #[error("index '{index}' declared more than once")]
    DuplicateIndex { index: String },

    #[error("{context} references unknown field '{field}'")]
    MissingField { context: String, field: String },

    #[error("cannot infer foreign key to '{parent}': {reason}")]
    ForeignKeyInference { parent: String, reason: String },

    #[error("foreign key to '{parent}' lists {found} field(s), parent partition key has {expected}")]
    ForeignKeyArity {
        parent: String,
        expected: usize,
        found: usize,
    },

    #[error("foreign key given without a belongs-to relationship")]
    ForeignKeyWithoutParent,

    #[error("belongs-to relationship already declared to '{existing}'")]
    DuplicateRelationship { existing: String },

    #[error("parent '{parent}' is not registered")]
    UnknownParent { parent: String },

    #[error("belongs-to cycle: {}", .path.join(" -> "))]
    RelationshipCycle { path: Vec<String> },

    #[error("entity path '{path}' registered more than once")]
    DuplicateEntityPath { path: String },

    #[error("duplicate entity name '{name}' in table '{table}' for '{first}' and '{second}'")]
    DuplicateEntityName {
        name: String,
        table: String,
        first: String,
        second: String,
    },

    #[error("invalid key config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

///
/// ErrorTree
///
/// Aggregated definition errors, grouped by route (entity path, then
/// nested context). Validation collects everything it finds instead of
/// stopping at the first problem.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    errors: Vec<DefinitionError>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at this level.
    pub fn add(&mut self, err: DefinitionError) {
        self.errors.push(err);
    }

    /// Record an error under a child route.
    pub fn add_for(&mut self, route: impl Into<String>, err: DefinitionError) {
        self.children.entry(route.into()).or_default().add(err);
    }

    /// Merge a whole tree under a child route; empty trees are skipped.
    pub fn merge_for(&mut self, route: impl Into<String>, tree: Self) {
        if tree.is_empty() {
            return;
        }

        let slot = self.children.entry(route.into()).or_default();
        slot.errors.extend(tree.errors);
        for (child, sub) in tree.children {
            slot.merge_for(child, sub);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of errors, nested routes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Errors recorded directly at this level.
    #[must_use]
    pub fn errors(&self) -> &[DefinitionError] {
        &self.errors
    }

    #[must_use]
    pub fn child(&self, route: &str) -> Option<&Self> {
        self.children.get(route)
    }

    /// Every error with its route, depth first, routes in sorted order.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, &DefinitionError)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a DefinitionError)>) {
        for err in &self.errors {
            out.push((prefix.to_string(), err));
        }
        for (route, child) in &self.children {
            let nested = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix} > {route}")
            };
            child.flatten_into(&nested, out);
        }
    }

    /// Whether any error anywhere in the tree matches.
    pub fn contains(&self, mut pred: impl FnMut(&DefinitionError) -> bool) -> bool {
        self.flatten().into_iter().any(|(_, err)| pred(err))
    }

    /// `Ok` when nothing was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (route, err)) in self.flatten().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{err}")?;
            } else {
                write!(f, "{route}: {err}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

impl From<DefinitionError> for ErrorTree {
    fn from(err: DefinitionError) -> Self {
        let mut tree = Self::new();
        tree.add(err);

        tree
    }
}
