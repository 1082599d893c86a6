//! Tracing subscriber bootstrap.
//!
//! Nothing is installed unless `FLOWMAP_LOG` (or `RUST_LOG`) holds a filter.
//! `FLOWMAP_LOG_FORMAT` picks the layout:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`, one level per nested
//!   mapped-type expansion
//! - `json`: one JSON object per event
//!
//! ```bash
//! FLOWMAP_LOG=flowmap_solver=trace FLOWMAP_LOG_FORMAT=tree cargo test -p flowmap-solver
//! ```

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to [`LogFormat::Text`].
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Captured per test by the test harness.
    TestHarness,
}

/// Subscriber settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl TracingSettings {
    /// `None` when no filter is set.
    pub fn from_env() -> Option<Self> {
        Self::from_vars(
            std::env::var("FLOWMAP_LOG").ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var("FLOWMAP_LOG_FORMAT").ok(),
        )
    }

    /// `FLOWMAP_LOG` takes precedence over `RUST_LOG`.
    pub fn from_vars(
        flowmap_log: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
    ) -> Option<Self> {
        let filter = flowmap_log.or(rust_log)?;
        Some(TracingSettings {
            filter,
            format: LogFormat::parse(format.as_deref().unwrap_or_default()),
        })
    }

    /// Install the global subscriber. Returns `false` if one was already
    /// installed.
    pub fn install(&self, sink: LogSink) -> bool {
        let filter = EnvFilter::builder().parse_lossy(&self.filter);
        let writer = || match sink {
            LogSink::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogSink::TestHarness => BoxMakeWriter::new(fmt::TestWriter::new()),
        };

        let registry = Registry::default().with(filter);
        let installed = match self.format {
            LogFormat::Tree => registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_indent_lines(true)
                        .with_deferred_spans(true)
                        .with_targets(true)
                        .with_writer(writer()),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(writer()))
                .try_init(),
            LogFormat::Text => registry.with(fmt::layer().with_writer(writer())).try_init(),
        };
        installed.is_ok()
    }
}

/// Install a stderr subscriber if the environment asks for one.
pub fn init_tracing() {
    if let Some(settings) = TracingSettings::from_env() {
        settings.install(LogSink::Stderr);
    }
}

/// Like [`init_tracing`], but output is captured by the test harness. Safe
/// to call from every test.
pub fn init_test_tracing() {
    if let Some(settings) = TracingSettings::from_env() {
        settings.install(LogSink::TestHarness);
    }
}
