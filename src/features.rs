//! Numeric feature selection
//!
//! Scans a leading sample of rows to decide which columns carry numeric
//! data worth feeding to the outlier model. Structural columns emitted by
//! the parsers (page numbers, table ids, ...) never qualify no matter how
//! numeric they look.

use crate::coerce::{is_numeric, Row};
use std::collections::HashSet;

/// Column names (lowercased) that identify structure, not measurements.
const RESERVED_COLUMNS: [&str; 4] = ["page", "table", "row_index", "id"];

/// Number of leading rows inspected when picking feature columns.
const SAMPLE_SIZE: usize = 50;

/// Select the columns to use as model features.
///
/// A column qualifies if at least one sampled row holds a numeric value in
/// it — union across the sample, so a column with occasional blanks still
/// counts. Result order is first-encounter order over the sample, which
/// keeps repeated runs deterministic. The set is fixed for the whole run;
/// rows beyond the sample cannot add columns.
pub fn select_features(rows: &[Row]) -> Vec<String> {
    let sample = rows.len().min(SAMPLE_SIZE);
    let mut selected: HashSet<&str> = HashSet::new();
    let mut features: Vec<String> = Vec::new();

    for row in &rows[..sample] {
        for (name, value) in row {
            if selected.contains(name.as_str()) {
                continue;
            }
            if RESERVED_COLUMNS.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            if is_numeric(value) {
                selected.insert(name.as_str());
                features.push(name.clone());
            }
        }
    }

    features
}
