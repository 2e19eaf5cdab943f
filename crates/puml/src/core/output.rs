//! JSON output helpers shared by the library API and the CLI

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use super::DiagramError;

/// Sibling JSON path for an input file.
///
/// Only the trailing extension is replaced; the directory and every other
/// dot in the file name are preserved. A name without an extension gets
/// `.json` appended.
///
/// ```
/// use std::path::Path;
/// use puml::json_output_path;
///
/// assert_eq!(json_output_path(Path::new("dir/model.puml")), Path::new("dir/model.json"));
/// assert_eq!(json_output_path(Path::new("model")), Path::new("model.json"));
/// ```
pub fn json_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// Serialize a value as pretty-printed JSON with 2-space indentation
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| DiagramError::from(e).into())
}
