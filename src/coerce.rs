//! Raw cell coercion
//!
//! Cells arrive from the document parsers as raw strings or explicit
//! nulls. This module turns them into numbers where possible, stripping
//! the currency formatting common in financial tables (`$`, thousands
//! separators, stray spaces). Coercion is total: malformed input yields
//! "missing", never an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw cell as produced by the parsers.
///
/// Serializes untagged, so a row round-trips as plain JSON
/// (`"$1,234.56"` or `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A raw string value, possibly numeric with formatting
    Text(String),
    /// Explicitly absent
    Null,
}

impl CellValue {
    /// Whether this cell is the explicit null marker
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// An input row: column name to raw cell. Columns may vary row to row;
/// no schema is declared in advance.
pub type Row = BTreeMap<String, CellValue>;

/// Coerce a raw cell to a float.
///
/// Strips `$`, `,`, and spaces, then parses. Returns `None` for nulls and
/// anything that still fails to parse.
pub fn to_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Null => None,
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            cleaned.parse::<f64>().ok()
        }
    }
}

/// Boolean form of [`to_numeric`], used during feature selection.
pub fn is_numeric(value: &CellValue) -> bool {
    to_numeric(value).is_some()
}
