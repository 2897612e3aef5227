//! Top-level detection engine
//!
//! Wires the pipeline stages together and owns the engine boundary:
//! configuration, the minimum-sample gate, and fault absorption.
//! Detection is best-effort enrichment of document processing, so nothing
//! here ever propagates a failure to the caller.

use crate::coerce::Row;
use crate::error::Result;
use crate::features::select_features;
use crate::forest::IsolationForest;
use crate::label::{label_outliers, Anomaly};
use crate::matrix::build_matrix;
use crate::preprocess::{MeanImputer, StandardScaler};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

/// Engine configuration. Every knob has a working default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Expected fraction of outliers in the data
    pub contamination: f64,
    /// Minimum row count below which detection is skipped entirely
    pub min_samples: usize,
    /// Seed for all randomized model choices
    pub random_seed: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            min_samples: 20,
            random_seed: 42,
        }
    }
}

impl DetectorConfig {
    /// Set the expected outlier fraction
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Set the minimum row count required to run detection
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }
}

/// Unsupervised anomaly detector over tabular rows.
///
/// Each [`detect_anomalies`](Self::detect_anomalies) call builds a fresh
/// model and matrices scoped to that call and discards them on return.
/// The detector itself holds only configuration, so one instance can
/// serve concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct UnsupervisedAnomalyDetector {
    config: DetectorConfig,
}

impl UnsupervisedAnomalyDetector {
    /// Create a detector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with the given configuration
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run detection over `rows`.
    ///
    /// Returns flagged rows in input order. The result is empty when the
    /// input is smaller than `min_samples`, no numeric feature columns
    /// exist, or the model faults internally — faults are logged and
    /// absorbed, never propagated.
    pub fn detect_anomalies(&self, rows: &[Row]) -> Vec<Anomaly> {
        if rows.len() < self.config.min_samples {
            info!(
                rows = rows.len(),
                min_samples = self.config.min_samples,
                "Skipping ML detection: insufficient data"
            );
            return Vec::new();
        }

        match catch_unwind(AssertUnwindSafe(|| self.run_pipeline(rows))) {
            Ok(Ok(anomalies)) => {
                info!(
                    anomalies = anomalies.len(),
                    rows = rows.len(),
                    "ML detection finished"
                );
                anomalies
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Anomaly detection failed; returning no anomalies");
                Vec::new()
            }
            Err(_) => {
                warn!("Anomaly detection panicked; returning no anomalies");
                Vec::new()
            }
        }
    }

    fn run_pipeline(&self, rows: &[Row]) -> Result<Vec<Anomaly>> {
        let feature_names = select_features(rows);
        if feature_names.is_empty() {
            warn!("No numeric features found for ML detection");
            return Ok(Vec::new());
        }

        let fm = build_matrix(rows, &feature_names)?;
        if fm.x.nrows() < 2 {
            info!(
                eligible_rows = fm.x.nrows(),
                "Too few eligible rows to score"
            );
            return Ok(Vec::new());
        }

        let mut imputer = MeanImputer::new();
        let imputed = imputer.fit_transform(&fm.x)?;
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&imputed)?;

        let mut forest = IsolationForest::new()
            .with_contamination(self.config.contamination)
            .with_seed(self.config.random_seed);
        forest.fit(&scaled)?;

        let decision_scores = forest.decision_function(&scaled)?;
        let flagged = forest.outlier_indices(&decision_scores);

        Ok(label_outliers(
            &flagged,
            &decision_scores,
            &scaled,
            &imputed,
            &feature_names,
            &fm.row_index_map,
            rows,
        ))
    }
}
