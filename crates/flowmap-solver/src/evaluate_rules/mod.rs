//! Evaluation rules for meta-types.
//!
//! Each submodule extends [`TypeEvaluator`](crate::TypeEvaluator) or provides
//! the pure helpers it is built from.

pub mod distribution;
pub mod index_access;
pub mod key_source;
pub mod mapped;
pub mod modifiers;
