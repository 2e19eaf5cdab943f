//! puml - Convert PlantUML class diagrams to JSON
//!
//! A library for parsing PlantUML class diagram text into a structured model
//! and serializing it as JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use puml::{format, parse};
//!
//! let input = "@startuml\nclass Order\nOrder --> Item\n@enduml";
//! let diagrams = parse(input).unwrap();
//! let json = format(&diagrams).unwrap();
//! println!("{}", json);
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use puml::prelude::*;
//!
//! let input = "@startuml\nclass Order {\n  -id : Long\n}\n@enduml";
//!
//! let parser = PlantUmlParser::new();
//! let diagrams = parser.parse(input).unwrap();
//!
//! // Access the parsed data
//! assert_eq!(diagrams[0].class_count(), 1);
//! assert_eq!(diagrams[0].get_class("Order").unwrap().members.len(), 1);
//!
//! // Render a text outline
//! let outline = OutlineFormatter::new().format(&diagrams).unwrap();
//! assert!(outline.contains("class Order"));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{DiagramError, Formatter, Parser};
    pub use crate::plugins::class::{
        Class, ClassKind, DefaultFormatter, Diagram, Element, Member, OutlineFormatter,
        PlantUmlParser, Relationship, RelationshipKind,
    };
}

/// Parse PlantUML text into one diagram per `@startuml ... @enduml` block
///
/// Text outside of blocks is ignored, so input without any block yields an
/// empty vector.
///
/// # Example
/// ```rust
/// use puml::parse;
///
/// let diagrams = parse("@startuml\nclass A\n@enduml\n@startuml\nclass B\n@enduml").unwrap();
/// assert_eq!(diagrams.len(), 2);
/// assert!(parse("no diagrams here").unwrap().is_empty());
/// ```
pub fn parse(input: &str) -> anyhow::Result<Vec<plugins::class::Diagram>> {
    use crate::core::Parser as _;
    use crate::plugins::class::PlantUmlParser;

    PlantUmlParser::new().parse(input)
}

/// Format a diagram sequence with the default (JSON) formatter
///
/// # Example
/// ```rust
/// let json = puml::format(&[]).unwrap();
/// assert_eq!(json, "[]");
/// ```
pub fn format(diagrams: &[plugins::class::Diagram]) -> anyhow::Result<String> {
    use crate::core::Formatter as _;
    use crate::plugins::class::DefaultFormatter;

    DefaultFormatter::new().format(diagrams)
}

/// Format a diagram sequence as an indented text outline
pub fn format_outline(diagrams: &[plugins::class::Diagram]) -> anyhow::Result<String> {
    use crate::core::Formatter as _;
    use crate::plugins::class::OutlineFormatter;

    OutlineFormatter::new().format(diagrams)
}
