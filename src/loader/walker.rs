//! Input path resolution.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

/// Extension of files picked up from a directory (case-sensitive).
pub const CSV_EXTENSION: &str = "csv";

/// Resolve `input` to the files to load.
///
/// A directory yields its immediate `*.csv` regular files in sorted order; a
/// regular file yields itself whatever its extension.
pub fn resolve_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let dir = input.to_str().ok_or_else(|| {
            Error::Config(format!(
                "input directory '{}' is not valid UTF-8",
                input.display()
            ))
        })?;
        let pattern = format!("{}/*.{}", Pattern::escape(dir), CSV_EXTENSION);
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let paths = glob::glob_with(&pattern, options)
            .map_err(|e| Error::Config(format!("invalid glob pattern '{}': {}", pattern, e)))?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    } else if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        Err(Error::NotFound(input.to_path_buf()))
    }
}

/// Table name for a file: its base name without the extension.
pub fn table_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Config(format!(
                "cannot derive a table name from '{}'",
                path.display()
            ))
        })
}
