//! Diagnostic generation for mapped type errors.
//!
//! The evaluator returns [`MappedTypeError`] values; this module renders them
//! into user-facing [`TypeDiagnostic`]s using the message templates in
//! `flowmap_common::diagnostics`. Types in messages are printed with the
//! [`TypeFormatter`].

use crate::error::MappedTypeError;
use crate::format::TypeFormatter;
use crate::intern::TypeDatabase;
use flowmap_common::diagnostics::{diagnostic_codes as codes, format_message, get_message_template};
use std::sync::Arc;

/// A source location span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start position (byte offset)
    pub start: u32,
    /// Length in bytes
    pub length: u32,
    /// File path or name
    pub file: Arc<str>,
}

impl SourceSpan {
    pub fn new(file: impl Into<Arc<str>>, start: u32, length: u32) -> Self {
        SourceSpan {
            start,
            length,
            file: file.into(),
        }
    }
}

/// A type checking error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDiagnostic {
    pub message: String,
    pub code: u32,
    /// Primary source location
    pub span: Option<SourceSpan>,
}

impl TypeDiagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>, code: u32) -> Self {
        TypeDiagnostic {
            message: message.into(),
            code,
            span: None,
        }
    }

    /// Add a source span to this diagnostic.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Builder for mapped type diagnostics.
pub struct DiagnosticBuilder<'a> {
    formatter: TypeFormatter<'a>,
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        DiagnosticBuilder {
            formatter: TypeFormatter::new(interner),
        }
    }

    /// Render an evaluator error.
    pub fn mapped_type_error(&mut self, error: &MappedTypeError) -> TypeDiagnostic {
        match error {
            MappedTypeError::InvalidMappedSource { offending_type } => {
                let type_str = self.formatter.format(*offending_type);
                self.render(codes::MAPPED_TYPE_SOURCE_INCOMPATIBLE_WITH_KEY_TYPES, &[&type_str])
            }
            MappedTypeError::AmbiguousIndexerConflict { existing, incoming } => self.render(
                codes::MAPPED_TYPE_MULTIPLE_INDEXER_KINDS,
                &[existing.name(), incoming.name()],
            ),
            MappedTypeError::RecursionBudgetExceeded { depth } => {
                self.render(codes::MAPPED_TYPE_EXPANSION_TOO_DEEP, &[&depth.to_string()])
            }
            MappedTypeError::KeyLimitExceeded { count, limit } => self.render(
                codes::MAPPED_TYPE_TOO_MANY_KEYS,
                &[&count.to_string(), &limit.to_string()],
            ),
        }
    }

    fn render(&self, code: u32, args: &[&str]) -> TypeDiagnostic {
        let message = match get_message_template(code) {
            Some(template) => format_message(template, args),
            None => format!("error {code}"),
        };
        TypeDiagnostic::error(message, code)
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
