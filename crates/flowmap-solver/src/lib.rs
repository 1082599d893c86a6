//! Mapped-Type Evaluation Engine
//!
//! This crate computes the result of Flow-style mapped types,
//! `{[K in S]: T}`, for a structural type checker. It uses:
//!
//! - **Custom `TypeData`**: Structural type representation with interning
//! - **Threaded substitutions**: type parameters stay visible to the
//!   evaluator, so distribution and homomorphism follow how a source was
//!   written
//! - **Cycle Detection**: Coinductive semantics for recursive aliases, with a
//!   shared recursion budget for runaway expansion
//!
//! Key benefits:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Evaluation is a pure type-to-type transformation; results are fresh
//!   interned types and inputs are never mutated
//! - Independent evaluators can run in parallel over one interner
mod diagnostics;
mod error;
mod evaluate;
pub mod evaluate_rules;
mod format;
mod instantiate;
mod intern;
mod options;
pub mod recursion;
mod resolver;
pub mod types;
mod value_builder;

pub use diagnostics::{DiagnosticBuilder, SourceSpan, TypeDiagnostic};
pub use error::MappedTypeError;
pub use evaluate::TypeEvaluator;
pub use evaluate_rules::distribution::{Branch, DistributionPlan};
pub use evaluate_rules::key_source::{KeySource, LiteralKey, SourceSyntax};
pub use evaluate_rules::mapped::evaluate_one;
pub use evaluate_rules::modifiers::resolve_modifiers;
pub use format::TypeFormatter;
pub use instantiate::{TypeInstantiator, TypeSubstitution, instantiate_type};
pub use intern::{TypeDatabase, TypeInterner};
pub use options::EvaluatorOptions;
pub use resolver::{AliasDef, AliasTable, NoopResolver, TypeResolver};
pub use types::*;
pub use value_builder::ValueBuilder;

// Test modules: Most are loaded by their source files via #[path = "tests/..."] declarations.
// Only include modules here that aren't loaded elsewhere to avoid duplicate_mod warnings.
// diagnostics_tests: loaded from diagnostics.rs
// error_tests: loaded from error.rs
// distribution_tests: loaded from evaluate_rules/distribution.rs
// evaluate_tests: loaded from evaluate.rs
// format_tests: loaded from format.rs
// index_access_tests: loaded from evaluate_rules/index_access.rs
// instantiate_tests: loaded from instantiate.rs
// intern_tests: loaded from intern.rs
// key_source_tests: loaded from evaluate_rules/key_source.rs
// modifiers_tests: loaded from evaluate_rules/modifiers.rs
// options_tests: loaded from options.rs
// recursion_tests: loaded from recursion.rs
// types_tests: loaded from types.rs
#[cfg(test)]
#[path = "../tests/mapped_tests.rs"]
mod mapped_tests;
#[cfg(test)]
#[path = "../tests/mapped_distribution_tests.rs"]
mod mapped_distribution_tests;
#[cfg(test)]
#[path = "../tests/mapped_recursion_tests.rs"]
mod mapped_recursion_tests;
#[cfg(test)]
#[path = "../tests/parallel_tests.rs"]
mod parallel_tests;
#[cfg(test)]
#[path = "../tests/test_utils.rs"]
mod test_utils;
