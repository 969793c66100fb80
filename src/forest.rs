//! Seeded isolation-forest outlier ensemble
//!
//! The trainer and scorer treat this as a black-box statistical primitive:
//! `fit(X) -> params`, `decision_function(X') -> scores`,
//! `predict(X') -> labels`. Labels follow the usual outlier convention,
//! -1 for outliers and +1 for inliers. The ensemble is fully serializable,
//! so a persisted model reproduces its decisions exactly after reload.
//!
//! Anomaly scoring follows Liu et al.: points that isolate in short random
//! partition paths score as outliers. `score_samples` returns the negated
//! anomaly score (higher = more normal, in [-1, 0]); `decision_function`
//! subtracts the contamination quantile of the training scores, so negative
//! values classify as outliers.

use ndarray::{Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of trees in the ensemble
const N_ESTIMATORS: usize = 100;

/// Subsample size per tree (capped at the row count)
const MAX_SAMPLES: usize = 256;

/// Label assigned to outliers by [`IsolationForest::predict`]
pub const OUTLIER_LABEL: i32 = -1;

/// Label assigned to inliers by [`IsolationForest::predict`]
pub const INLIER_LABEL: i32 = 1;

/// One node of an isolation tree, arena-encoded for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// A single randomized partition tree
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    /// Path length of a point: traversal depth plus the average-path-length
    /// correction for the leaf it lands in.
    fn path_length(&self, point: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if point[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Fitted isolation-forest parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    max_samples: usize,
    contamination: f64,
    /// Contamination quantile of the training score_samples
    offset: f64,
    seed: u64,
}

impl IsolationForest {
    /// Fit the ensemble on a standardized matrix. Deterministic for a fixed
    /// seed: the same data and seed always produce the same trees and offset.
    pub fn fit(x: &Array2<f64>, contamination: f64, seed: u64) -> Self {
        let n_rows = x.nrows();
        let max_samples = MAX_SAMPLES.min(n_rows);
        let depth_limit = (max_samples.max(2) as f64).log2().ceil().max(1.0) as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let trees = (0..N_ESTIMATORS)
            .map(|_| {
                let sample = rand::seq::index::sample(&mut rng, n_rows, max_samples).into_vec();
                let mut nodes = Vec::new();
                build_node(x, &sample, 0, depth_limit, &mut rng, &mut nodes);
                IsolationTree { nodes }
            })
            .collect();

        let mut forest = Self {
            trees,
            max_samples,
            contamination,
            offset: 0.0,
            seed,
        };
        let mut train_scores = forest.score_samples(x);
        train_scores.sort_by(|a, b| a.total_cmp(b));
        forest.offset = percentile(&train_scores, 100.0 * contamination);
        forest
    }

    /// Negated anomaly score per row: higher means more normal, in [-1, 0]
    pub fn score_samples(&self, x: &Array2<f64>) -> Vec<f64> {
        let norm = average_path_length(self.max_samples);
        x.rows()
            .into_iter()
            .map(|row| {
                let mean_path = self
                    .trees
                    .iter()
                    .map(|t| t.path_length(row))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                let anomaly = if norm > 0.0 {
                    2f64.powf(-mean_path / norm)
                } else {
                    0.5
                };
                -anomaly
            })
            .collect()
    }

    /// score_samples shifted by the training offset; negative = outlier
    pub fn decision_function(&self, x: &Array2<f64>) -> Vec<f64> {
        self.score_samples(x)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }

    /// -1 for outliers, +1 for inliers
    pub fn predict(&self, x: &Array2<f64>) -> Vec<i32> {
        self.decision_function(x)
            .into_iter()
            .map(|d| if d < 0.0 { OUTLIER_LABEL } else { INLIER_LABEL })
            .collect()
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Recursively grow one tree into the arena, returning the node index
fn build_node(
    x: &Array2<f64>,
    rows: &[usize],
    depth: usize,
    depth_limit: usize,
    rng: &mut ChaCha8Rng,
    nodes: &mut Vec<Node>,
) -> usize {
    if rows.len() <= 1 || depth >= depth_limit {
        nodes.push(Node::Leaf { size: rows.len() });
        return nodes.len() - 1;
    }

    // Only features that still vary over this partition can split it.
    let splittable: Vec<(usize, f64, f64)> = (0..x.ncols())
        .filter_map(|j| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &i in rows {
                min = min.min(x[[i, j]]);
                max = max.max(x[[i, j]]);
            }
            (max > min).then_some((j, min, max))
        })
        .collect();

    if splittable.is_empty() {
        nodes.push(Node::Leaf { size: rows.len() });
        return nodes.len() - 1;
    }

    let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(min..max);

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.iter().partition(|&&i| x[[i, feature]] < threshold);

    // Reserve the split slot before recursing so child indices are stable.
    let idx = nodes.len();
    nodes.push(Node::Leaf { size: 0 });
    let left = build_node(x, &left_rows, depth + 1, depth_limit, rng, nodes);
    let right = build_node(x, &right_rows, depth + 1, depth_limit, rng, nodes);
    nodes[idx] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    idx
}

/// Average unsuccessful-search path length in a BST of n nodes, c(n).
/// Normalizes raw path lengths to the 0-1 anomaly score.
fn average_path_length(n: usize) -> f64 {
    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolation percentile of an ascending-sorted slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}
