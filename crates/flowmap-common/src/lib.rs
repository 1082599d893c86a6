//! Common types and utilities for the flowmap type engine.
//!
//! This crate provides foundational types used across all flowmap crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Evaluation limits and thresholds
//! - Diagnostic codes and message templates
//! - Tracing subscriber bootstrap

// String interning for property names and string literals
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic codes and message templates
pub mod diagnostics;
pub use diagnostics::{DiagnosticMessage, format_message, get_message_template};

// Tracing subscriber setup
pub mod tracing_config;
