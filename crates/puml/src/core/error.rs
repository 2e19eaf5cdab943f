//! Core error types for diagram processing
//!
//! This module defines common error types used throughout the parse and output pipeline.

use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Format error: {message}")]
    FormatError { message: String },

    #[error("No @startuml block found in {source_name}")]
    EmptyInput { source_name: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Unknown diagram type: {diagram_type}")]
    UnknownDiagramType { diagram_type: String },
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a new format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }

    /// Create an error for input that holds no diagram
    pub fn empty_input(source_name: impl Into<String>) -> Self {
        Self::EmptyInput {
            source_name: source_name.into(),
        }
    }

    /// Line number of a parse error, if this is one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::ParseError { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DiagramError {
    fn from(err: serde_json::Error) -> Self {
        Self::format_error(err.to_string())
    }
}
