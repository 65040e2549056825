//! Isolation forest for joint (multi-column) outliers.
//!
//! Each tree recursively splits a random subsample on a random feature at a
//! random threshold. Points that get isolated after few splits are unusual.
//! The anomaly score of a point is `2^(-E[h(x)] / c(psi))`, where `E[h(x)]`
//! is its mean path length over the ensemble and `c(psi)` the expected path
//! length of an unsuccessful BST search over `psi` points.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Subsample size per tree (capped at the number of rows).
    pub sample_size: usize,
    /// Expected share of outliers; sets the score cut-off.
    pub contamination: f64,
    /// Seed for the tree-building RNG. Same seed and data give the same labels.
    pub seed: u64,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn path_length(&self, point: &[f64], depth: usize) -> f64 {
        match self {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if point[*feature] <= *threshold {
                    left.path_length(point, depth + 1)
                } else {
                    right.path_length(point, depth + 1)
                }
            }
        }
    }
}

/// `c(n)`: average path length of an unsuccessful search in a BST of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Seeded isolation forest over row-major numeric points.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: IsolationConfig,
}

impl IsolationForest {
    pub fn new(config: IsolationConfig) -> Self {
        Self { config }
    }

    /// Anomaly score in (0, 1] for every point; higher is more anomalous.
    ///
    /// Fewer than two points carry no information and all score 0.5.
    pub fn score(&self, points: &[Vec<f64>]) -> Vec<f64> {
        let n = points.len();
        if n < 2 {
            return vec![0.5; n];
        }

        let psi = self.config.sample_size.clamp(2, n);
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        let mut indices: Vec<usize> = (0..n).collect();

        let trees: Vec<Node> = (0..self.config.n_trees.max(1))
            .map(|_| {
                rng.shuffle(&mut indices);
                let sample = &indices[..psi];
                build(points, sample, 0, height_limit, &mut rng)
            })
            .collect();

        let normaliser = average_path_length(psi);
        debug!(points = n, trees = trees.len(), psi, "scored isolation forest");

        points
            .iter()
            .map(|point| {
                let mean_path = trees
                    .iter()
                    .map(|tree| tree.path_length(point, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                2f64.powf(-mean_path / normaliser)
            })
            .collect()
    }

    /// Scores plus outlier flags: a point is an outlier when its score is
    /// strictly above the `1 - contamination` quantile of all scores.
    pub fn fit_predict(&self, points: &[Vec<f64>]) -> (Vec<f64>, Vec<bool>) {
        let scores = self.score(points);
        let contamination = self.config.contamination.clamp(0.0, 0.5);
        if scores.len() < 2 || contamination == 0.0 {
            let flags = vec![false; scores.len()];
            return (scores, flags);
        }

        let cutoff = stats::quantile(&stats::sorted(&scores), 1.0 - contamination)
            .unwrap_or(f64::INFINITY);
        let flags = scores.iter().map(|s| *s > cutoff).collect();
        (scores, flags)
    }
}

fn build(
    points: &[Vec<f64>],
    sample: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut fastrand::Rng,
) -> Node {
    if depth >= height_limit || sample.len() <= 1 {
        return Node::Leaf { size: sample.len() };
    }

    // Only features that still vary within this node can split it.
    let dims = points[sample[0]].len();
    let spread: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|feature| {
            let (lo, hi) = sample.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                let v = points[i][feature];
                (lo.min(v), hi.max(v))
            });
            (lo < hi).then_some((feature, lo, hi))
        })
        .collect();

    if spread.is_empty() {
        return Node::Leaf { size: sample.len() };
    }

    let (feature, lo, hi) = spread[rng.usize(..spread.len())];
    // threshold lies in [lo, hi), so both sides are non-empty
    let threshold = lo + rng.f64() * (hi - lo);

    let (left, right): (Vec<usize>, Vec<usize>) =
        sample.iter().partition(|&&i| points[i][feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build(points, &left, depth + 1, height_limit, rng)),
        right: Box::new(build(points, &right, depth + 1, height_limit, rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut points: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![10.0 + (i % 7) as f64 * 0.1, 20.0 + (i % 5) as f64 * 0.1])
            .collect();
        points.push(vec![500.0, -300.0]);
        points
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn test_isolated_point_scores_highest() {
        let points = cluster_with_outlier();
        let forest = IsolationForest::new(IsolationConfig::default());
        let (scores, flags) = forest.fit_predict(&points);

        let last = *scores.last().unwrap();
        assert!(scores[..60].iter().all(|s| *s < last));
        assert!(flags[60]);
        assert!(flags.iter().filter(|f| **f).count() <= 7);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let points = cluster_with_outlier();
        let forest = IsolationForest::new(IsolationConfig::default());
        assert_eq!(forest.score(&points), forest.score(&points));
    }

    #[test]
    fn test_degenerate_inputs() {
        let forest = IsolationForest::new(IsolationConfig::default());
        assert!(forest.score(&[]).is_empty());
        let (scores, flags) = forest.fit_predict(&[vec![1.0]]);
        assert_eq!(scores, vec![0.5]);
        assert_eq!(flags, vec![false]);

        // identical points never split
        let same = vec![vec![3.0, 3.0]; 20];
        let (_, flags) = forest.fit_predict(&same);
        assert!(flags.iter().all(|f| !f));
    }
}
