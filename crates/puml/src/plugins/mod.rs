//! Diagram type plugins
//!
//! Each plugin provides the model, parser and formatters for one diagram type.

pub mod class;

pub use class::*;
