//! Feature matrix assembly
//!
//! Turns string-keyed rows into a dense numeric matrix restricted to the
//! selected feature columns. Missing cells become `f64::NAN` sentinels,
//! never zero, so downstream imputation can tell them apart from real
//! zeros.

use crate::coerce::{to_numeric, Row};
use crate::error::{DetectError, Result};
use ndarray::Array2;

/// Dense numeric view of the input rows.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// One row per eligible input row, one column per feature name.
    /// Missing cells are `NAN`.
    pub x: Array2<f64>,
    /// Original input-row index for each matrix row.
    /// `row_index_map.len() == x.nrows()`.
    pub row_index_map: Vec<usize>,
}

/// Build the feature matrix.
///
/// Rows where every feature cell is missing are dropped entirely; they
/// never reach the model and can never be flagged. Column order follows
/// `feature_names`.
pub fn build_matrix(rows: &[Row], feature_names: &[String]) -> Result<FeatureMatrix> {
    let n_features = feature_names.len();
    let mut values: Vec<f64> = Vec::with_capacity(rows.len() * n_features);
    let mut row_index_map: Vec<usize> = Vec::new();
    let mut row_values: Vec<f64> = Vec::with_capacity(n_features);

    for (i, row) in rows.iter().enumerate() {
        row_values.clear();
        let mut has_data = false;

        for name in feature_names {
            match row.get(name).and_then(to_numeric) {
                Some(v) => {
                    has_data = true;
                    row_values.push(v);
                }
                None => row_values.push(f64::NAN),
            }
        }

        if has_data {
            values.extend_from_slice(&row_values);
            row_index_map.push(i);
        }
    }

    let n_rows = row_index_map.len();
    let x = Array2::from_shape_vec((n_rows, n_features), values)
        .map_err(|e| DetectError::ShapeError(e.to_string()))?;

    Ok(FeatureMatrix { x, row_index_map })
}
