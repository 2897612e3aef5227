//! findetect — unsupervised anomaly detection for tabular financial data
//!
//! Flags rows that are statistically unusual relative to the rest of a
//! document, with no labeled training data. The pipeline runs strictly
//! forward:
//!
//! - [`coerce`] — raw cell to numeric coercion (currency stripping)
//! - [`features`] — numeric feature column selection
//! - [`matrix`] — dense feature matrix assembly
//! - [`preprocess`] — mean imputation and standardization
//! - [`forest`] — isolation forest model, built from scratch
//! - [`label`] — anomaly records, severity, and feature attribution
//! - [`detector`] — the engine boundary tying it all together
//!
//! Document parsing, persistence, and serving live outside this crate: it
//! consumes ready-made rows and produces anomaly records, nothing more.
//! Every detection run is stateless and deterministic for a fixed seed.
//!
//! ```
//! use findetect::prelude::*;
//!
//! let rows: Vec<Row> = (0..25)
//!     .map(|i| {
//!         let amount = if i == 7 { "$100,000.00" } else { "$100.00" };
//!         [("Amount".to_string(), CellValue::from(amount))]
//!             .into_iter()
//!             .collect()
//!     })
//!     .collect();
//!
//! let detector = UnsupervisedAnomalyDetector::new();
//! let anomalies = detector.detect_anomalies(&rows);
//! assert_eq!(anomalies.len(), 1);
//! assert_eq!(anomalies[0].row_index, 7);
//! ```

pub mod error;

pub mod coerce;
pub mod detector;
pub mod features;
pub mod forest;
pub mod label;
pub mod matrix;
pub mod preprocess;

pub use error::{DetectError, Result};

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::coerce::{CellValue, Row};
    pub use crate::detector::{DetectorConfig, UnsupervisedAnomalyDetector};
    pub use crate::error::{DetectError, Result};
    pub use crate::forest::IsolationForest;
    pub use crate::label::{Anomaly, Evidence, Severity};
}
