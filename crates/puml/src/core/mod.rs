//! Core abstractions for diagram processing
//!
//! This module defines the traits every diagram plugin implements, plus the
//! shared error, logging, and output helpers.

pub mod chumsky_utils;
mod error;
mod formatter;
pub mod logging;
mod output;
mod parser;

pub use error::*;
pub use formatter::*;
pub use logging::*;
pub use output::*;
pub use parser::*;
