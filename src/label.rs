//! Anomaly records and score labeling
//!
//! Turns the model's flagged rows into the record shape the surrounding
//! pipeline stores verbatim: severity, a human-readable description, and
//! structured evidence attributing the flag to the most deviant feature.

use crate::coerce::Row;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Decision scores at or below this cutoff are labeled high severity.
const HIGH_SEVERITY_CUTOFF: f64 = -0.1;

/// How strongly a flagged row deviates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// Structured evidence attached to every anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Always `"isolation_forest"`
    pub algorithm: String,
    /// Decision score (more negative = more anomalous)
    pub anomaly_score: f64,
    /// Feature with the largest absolute standardized value
    pub key_feature: String,
    /// Imputed, unscaled value of the key feature
    pub feature_value: f64,
    /// Standardized value of the key feature
    pub z_score_approx: f64,
}

/// One flagged row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Index into the original input rows
    pub row_index: usize,
    /// Always `"ml_outlier"`
    pub anomaly_type: String,
    pub severity: Severity,
    pub description: String,
    /// The original row exactly as given to the engine
    pub raw_json: Row,
    pub evidence: Evidence,
}

pub(crate) fn severity_for(decision_score: f64) -> Severity {
    if decision_score > HIGH_SEVERITY_CUTOFF {
        Severity::Medium
    } else {
        Severity::High
    }
}

/// Build anomaly records for the flagged matrix rows.
///
/// `flagged` holds matrix-row indices sorted ascending, which makes the
/// output ascend by original row index as well (`row_index_map` is
/// monotonic by construction). The key feature is the one with the
/// largest absolute standardized value — a heuristic, but the detection
/// decision itself never depends on it.
#[allow(clippy::too_many_arguments)]
pub fn label_outliers(
    flagged: &[usize],
    decision_scores: &Array1<f64>,
    scaled: &Array2<f64>,
    imputed: &Array2<f64>,
    feature_names: &[String],
    row_index_map: &[usize],
    rows: &[Row],
) -> Vec<Anomaly> {
    flagged
        .iter()
        .map(|&i| {
            let score = decision_scores[i];

            // First-wins argmax over |z|, matching the attribution the
            // description is written against.
            let mut key_idx = 0;
            for j in 1..feature_names.len() {
                if scaled[[i, j]].abs() > scaled[[i, key_idx]].abs() {
                    key_idx = j;
                }
            }

            let key_feature = feature_names[key_idx].clone();
            let feature_value = imputed[[i, key_idx]];
            let z_score_approx = scaled[[i, key_idx]];
            let row_index = row_index_map[i];

            Anomaly {
                row_index,
                anomaly_type: "ml_outlier".to_string(),
                severity: severity_for(score),
                description: format!(
                    "Statistical outlier detected by ML model. Unusual {}: {:.2}",
                    key_feature, feature_value
                ),
                raw_json: rows[row_index].clone(),
                evidence: Evidence {
                    algorithm: "isolation_forest".to_string(),
                    anomaly_score: score,
                    key_feature,
                    feature_value,
                    z_score_approx,
                },
            }
        })
        .collect()
}
