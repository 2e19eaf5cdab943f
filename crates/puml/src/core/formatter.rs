//! Core formatter trait for diagram output
//!
//! This trait defines the interface for turning parsed diagrams into
//! displayable text (JSON, outlines, ...).

use anyhow::Result;

/// Core trait for diagram formatters
///
/// # Example
/// ```
/// use puml::core::Formatter;
/// use puml::plugins::class::DefaultFormatter;
///
/// let output = DefaultFormatter::new().format(&[]).unwrap();
/// assert_eq!(output, "[]");
/// ```
pub trait Formatter<D>: Send + Sync {
    /// Format a sequence of parsed diagrams
    fn format(&self, diagrams: &[D]) -> Result<String>;

    /// Get the name of this formatter
    fn name(&self) -> &'static str;
}
