//! Isolation forest outlier model
//!
//! Ensemble of random partitioning trees. Points that isolate in few
//! splits (short average path length) are anomalous; dense clusters take
//! many splits to separate. Built from scratch — only a seeded RNG is
//! required, no external statistics library.

use crate::error::{DetectError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// A single isolation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IsolationTree {
    /// Internal node with a random split
    Internal {
        /// Feature index for the split
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Left subtree (values < threshold)
        left: Box<IsolationTree>,
        /// Right subtree (values >= threshold)
        right: Box<IsolationTree>,
    },
    /// Leaf holding however many points were never separated
    External {
        /// Number of samples that reached this node during building
        size: usize,
    },
}

impl IsolationTree {
    /// Build a tree over `indices` into `x`, recursing to `max_height`.
    fn build(
        x: &Array2<f64>,
        indices: &[usize],
        height: usize,
        max_height: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let n_samples = indices.len();

        if height >= max_height || n_samples <= 1 {
            return IsolationTree::External { size: n_samples };
        }

        // Only features with spread in the current point set can split it.
        let mut splittable: Vec<(usize, f64, f64)> = Vec::new();
        for feature in 0..x.ncols() {
            let mut min_val = f64::INFINITY;
            let mut max_val = f64::NEG_INFINITY;
            for &i in indices {
                let v = x[[i, feature]];
                min_val = min_val.min(v);
                max_val = max_val.max(v);
            }
            if max_val > min_val {
                splittable.push((feature, min_val, max_val));
            }
        }

        // All points identical on every feature: nothing left to isolate.
        if splittable.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let (feature, min_val, max_val) = splittable[rng.gen_range(0..splittable.len())];
        let threshold = rng.gen_range(min_val..max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] < threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let left = Box::new(Self::build(x, &left_indices, height + 1, max_height, rng));
        let right = Box::new(Self::build(x, &right_indices, height + 1, max_height, rng));

        IsolationTree::Internal {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Path length for a sample: depth to its leaf plus the `c(size)`
    /// correction for leaves that still hold several points.
    pub fn path_length(&self, sample: &[f64], current_height: usize) -> f64 {
        match self {
            IsolationTree::External { size } => current_height as f64 + Self::c(*size),
            IsolationTree::Internal {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    left.path_length(sample, current_height + 1)
                } else {
                    right.path_length(sample, current_height + 1)
                }
            }
        }
    }

    /// Expected path length of an unsuccessful BST search over `n` points:
    /// `c(n) = 2*H(n-1) - 2*(n-1)/n`, with the harmonic number
    /// approximated as `ln(n-1) + gamma`.
    fn c(n: usize) -> f64 {
        if n <= 1 {
            0.0
        } else if n == 2 {
            1.0
        } else {
            let n_f = n as f64;
            2.0 * ((n_f - 1.0).ln() + EULER_GAMMA) - 2.0 * (n_f - 1.0) / n_f
        }
    }
}

/// Isolation forest with contamination-based outlier selection.
///
/// The model is scoped to one detection run: fit it, score, drop it.
/// Nothing is shared between instances, so concurrent runs are safe as
/// long as each builds its own forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Number of trees in the ensemble
    n_estimators: usize,
    /// Sub-sample size cap per tree
    max_samples: usize,
    /// Expected proportion of outliers
    contamination: f64,
    /// Base seed; tree `i` uses `seed + i`
    seed: u64,
    /// Fitted trees
    trees: Option<Vec<IsolationTree>>,
    /// Actual sub-sample size used at fit time
    sub_sample_size: Option<usize>,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl IsolationForest {
    /// Create a forest with default settings (100 trees, 256-point
    /// sub-samples, 5% contamination, seed 42)
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            seed: 42,
            trees: None,
            sub_sample_size: None,
        }
    }

    /// Set number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    /// Set the sub-sample size cap per tree
    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n.max(1);
        self
    }

    /// Set contamination ratio
    pub fn with_contamination(mut self, c: f64) -> Self {
        self.contamination = c.clamp(0.0, 0.5);
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the ensemble over `x`.
    ///
    /// Each tree draws its own sub-sample of rows without replacement and
    /// grows to depth `ceil(log2(sub_sample_size))`. Trees are built in
    /// parallel; each gets an independent RNG stream derived from the base
    /// seed, so the result is deterministic regardless of scheduling.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n_rows = x.nrows();
        if x.ncols() == 0 || n_rows < 2 {
            return Err(DetectError::ShapeError(format!(
                "matrix of {} rows x {} columns is too small to fit",
                n_rows,
                x.ncols()
            )));
        }

        let sub_sample_size = self.max_samples.min(n_rows);
        let max_height = (sub_sample_size as f64).log2().ceil() as usize;
        let base_seed = self.seed;

        let trees: Vec<IsolationTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let indices = index::sample(&mut rng, n_rows, sub_sample_size).into_vec();
                IsolationTree::build(x, &indices, 0, max_height, &mut rng)
            })
            .collect();

        self.trees = Some(trees);
        self.sub_sample_size = Some(sub_sample_size);
        Ok(())
    }

    /// Raw anomaly scores in [0, 1]: `2^(-E[h(x)] / c(n))`.
    /// Near 1 means strongly anomalous, near 0.5 means normal.
    pub fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let trees = self.trees.as_ref().ok_or(DetectError::ModelNotFitted)?;
        let sub_sample_size = self.sub_sample_size.ok_or(DetectError::ModelNotFitted)?;
        let c_n = IsolationTree::c(sub_sample_size);

        let scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                let avg_path_length: f64 = trees
                    .iter()
                    .map(|tree| tree.path_length(&sample, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                2.0_f64.powf(-avg_path_length / c_n)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }

    /// Decision-function convention used downstream: `0.5 - score`, so
    /// more negative means more anomalous.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.score_samples(x)?.mapv(|s| 0.5 - s))
    }

    /// Matrix-row indices flagged as outliers: the
    /// `round(contamination * n)` lowest decision scores, ties broken by
    /// row order. Returned sorted ascending.
    pub fn outlier_indices(&self, decision_scores: &Array1<f64>) -> Vec<usize> {
        let n = decision_scores.len();
        let n_outliers = ((self.contamination * n as f64).round() as usize).min(n);
        if n_outliers == 0 {
            return Vec::new();
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            decision_scores[a]
                .partial_cmp(&decision_scores[b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut flagged: Vec<usize> = order.into_iter().take(n_outliers).collect();
        flagged.sort_unstable();
        flagged
    }
}
