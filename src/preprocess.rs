//! Missing-value imputation and feature standardization
//!
//! Both transforms fit on the same matrix they transform. The engine is
//! single-batch and unsupervised, so there is no train/test split to
//! respect.

use crate::error::{DetectError, Result};
use ndarray::Array2;

/// Replaces `NAN` cells with the column mean.
#[derive(Debug, Clone, Default)]
pub struct MeanImputer {
    means: Option<Vec<f64>>,
}

impl MeanImputer {
    /// Create an unfitted imputer
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute per-column means over the non-missing values.
    ///
    /// A column with no observed values at all gets a mean of 0.0 so the
    /// pipeline stays total.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let mut means = Vec::with_capacity(x.ncols());

        for col in x.columns() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for &v in col.iter() {
                if !v.is_nan() {
                    sum += v;
                    count += 1;
                }
            }
            means.push(if count > 0 { sum / count as f64 } else { 0.0 });
        }

        self.means = Some(means);
        Ok(())
    }

    /// Replace every missing cell with its column mean
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let means = self.means.as_ref().ok_or(DetectError::ModelNotFitted)?;
        if means.len() != x.ncols() {
            return Err(DetectError::ShapeError(format!(
                "imputer fitted on {} columns, got {}",
                means.len(),
                x.ncols()
            )));
        }

        let mut out = x.clone();
        for (j, mut col) in out.columns_mut().into_iter().enumerate() {
            for v in col.iter_mut() {
                if v.is_nan() {
                    *v = means[j];
                }
            }
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Fitted per-column parameters
#[derive(Debug, Clone)]
struct ScalerParams {
    center: f64,
    scale: f64,
}

/// Standardizes each column to zero mean and unit variance.
///
/// Uses the population standard deviation (divide by N). A zero-variance
/// column keeps a scale of 1.0, so its centered values stay at 0 instead
/// of turning into infinities.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    params: Option<Vec<ScalerParams>>,
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute per-column mean and population standard deviation.
    /// Expects an imputed matrix; `NAN` cells here are a caller bug and
    /// will poison the fitted parameters.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n = x.nrows();
        let mut params = Vec::with_capacity(x.ncols());

        for col in x.columns() {
            if n == 0 {
                params.push(ScalerParams {
                    center: 0.0,
                    scale: 1.0,
                });
                continue;
            }
            let mean = col.sum() / n as f64;
            let var = col.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            params.push(ScalerParams {
                center: mean,
                scale: if std == 0.0 { 1.0 } else { std },
            });
        }

        self.params = Some(params);
        Ok(())
    }

    /// Apply `(x - mean) / std` per column
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let params = self.params.as_ref().ok_or(DetectError::ModelNotFitted)?;
        if params.len() != x.ncols() {
            return Err(DetectError::ShapeError(format!(
                "scaler fitted on {} columns, got {}",
                params.len(),
                x.ncols()
            )));
        }

        let mut out = x.clone();
        for (j, mut col) in out.columns_mut().into_iter().enumerate() {
            let p = &params[j];
            for v in col.iter_mut() {
                *v = (*v - p.center) / p.scale;
            }
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}
