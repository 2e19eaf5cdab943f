//! Core parser trait for diagram markup
//!
//! This trait defines the interface for parsing diagram markup language
//! into structured data.

use anyhow::Result;

/// Core trait for diagram parsers
///
/// A PlantUML source file may hold several `@startuml` blocks, so a parser
/// returns every diagram it finds rather than filling a single database.
///
/// # Example
/// ```
/// use puml::core::Parser;
/// use puml::plugins::class::PlantUmlParser;
///
/// let parser = PlantUmlParser::new();
/// let diagrams = parser.parse("@startuml\nclass A\n@enduml").unwrap();
/// assert_eq!(diagrams.len(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// The parsed value for one diagram
    type Output;

    /// Parse diagram markup into every diagram it contains, in source order
    fn parse(&self, input: &str) -> Result<Vec<Self::Output>>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input can be parsed by this parser
    fn can_parse(&self, input: &str) -> bool;
}
