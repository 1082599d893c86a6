//! Errors produced while evaluating mapped types.
//!
//! None of these are fatal to a checker run. The caller reports them at the
//! mapped type's location and continues with [`MappedTypeError::recovery_type`].

use crate::types::{PrimitiveKeyKind, TypeId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappedTypeError {
    /// The binder's source is not a subtype of `string | number | symbol`.
    InvalidMappedSource { offending_type: TypeId },
    /// The key source needs an indexer of a second primitive key kind, but an
    /// object has room for only one indexer.
    AmbiguousIndexerConflict {
        existing: PrimitiveKeyKind,
        incoming: PrimitiveKeyKind,
    },
    /// Expansion of a self-referential mapped type exhausted the evaluation
    /// budget.
    RecursionBudgetExceeded { depth: u32 },
    /// The key source produced more named keys than the configured maximum.
    KeyLimitExceeded { count: usize, limit: usize },
}

impl MappedTypeError {
    /// Type substituted for the mapped type after the error is reported.
    pub fn recovery_type(&self) -> TypeId {
        TypeId::MIXED
    }
}

impl std::fmt::Display for MappedTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappedTypeError::InvalidMappedSource { offending_type } => write!(
                f,
                "mapped type source (type #{}) is incompatible with `string | number | symbol`",
                offending_type.0
            ),
            MappedTypeError::AmbiguousIndexerConflict { existing, incoming } => write!(
                f,
                "mapped type needs a `{}` indexer but already has a `{}` indexer",
                incoming.name(),
                existing.name()
            ),
            MappedTypeError::RecursionBudgetExceeded { depth } => write!(
                f,
                "mapped type expansion exceeded the recursion budget at depth {depth}"
            ),
            MappedTypeError::KeyLimitExceeded { count, limit } => write!(
                f,
                "mapped type produces {count} keys, more than the maximum of {limit}"
            ),
        }
    }
}

impl std::error::Error for MappedTypeError {}

#[cfg(test)]
#[path = "../tests/error_tests.rs"]
mod tests;
