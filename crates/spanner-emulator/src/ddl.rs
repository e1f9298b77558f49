//! Schema text handling.

use crate::Result;
use std::path::Path;

/// Split schema text into individual statements.
///
/// Pieces are separated by `;`, trimmed, and blank pieces are dropped.
/// Order is preserved. The splitter does not understand quoting: a `;`
/// inside a string literal splits the statement. Schema text fed to the
/// emulator is plain DDL, which never contains one.
pub fn parse_ddl(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a schema file and split it with [`parse_ddl`].
pub fn load_ddl_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_ddl(&text))
}
