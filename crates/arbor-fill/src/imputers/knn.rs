use std::cmp::Ordering;
use tracing::trace;

/// Neighborhood size for a training set of `n_samples` rows.
///
/// `round(sqrt(n))`, bounded to `[min_k, max_k]`. The result may exceed
/// `n_samples`; prediction then uses every training row.
pub fn neighborhood_size(n_samples: usize, min_k: usize, max_k: usize) -> usize {
    let root = (n_samples as f64).sqrt().round() as usize;
    root.max(min_k).min(max_k)
}

/// Distance-weighted k-nearest-neighbor regressor.
///
/// Weights are proportional to `1 / distance`. Neighbors at zero distance take all of the
/// weight, shared equally among themselves.
pub struct KNNRegressor {
    n_neighbors: usize,
    samples: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl KNNRegressor {
    /// Create a new regressor with the specified number of neighbors
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1), // Ensure at least 1 neighbor
            samples: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Store the training set. Samples and targets pair up by index.
    pub fn fit(mut self, samples: Vec<Vec<f64>>, targets: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), targets.len());
        self.samples = samples;
        self.targets = targets;
        self
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Predict the target for one feature vector. `None` before fitting.
    pub fn predict(&self, query: &[f64]) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }

        // Calculate distances to all training rows
        let mut distances: Vec<(usize, f64)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(idx, sample)| (idx, Self::euclidean_distance(query, sample)))
            .collect();

        // Partial selection of the k nearest; ties fall back to training order
        let k = self.n_neighbors.min(distances.len());
        if k < distances.len() {
            distances.select_nth_unstable_by(k - 1, Self::by_distance);
            distances.truncate(k);
        }
        distances.sort_unstable_by(Self::by_distance);

        let nearest = &distances[..];
        trace!("Predicting from {} neighbors", k);

        let exact: Vec<f64> = nearest
            .iter()
            .filter(|(_, d)| *d == 0.0)
            .map(|(idx, _)| self.targets[*idx])
            .collect();
        if !exact.is_empty() {
            return Some(exact.iter().sum::<f64>() / exact.len() as f64);
        }

        // Weights relative to the closest neighbor, which gets exactly 1.0
        let closest = nearest[0].1;
        if closest.is_finite() {
            let mut weighted_sum = 0.0;
            let mut weight_sum = 0.0;
            for (idx, distance) in nearest {
                let weight = closest / distance;
                weighted_sum += self.targets[*idx] * weight;
                weight_sum += weight;
            }
            Some(weighted_sum / weight_sum)
        } else {
            // Every neighbor is infinitely far; fall back to a plain average
            let sum: f64 = nearest.iter().map(|(idx, _)| self.targets[*idx]).sum();
            Some(sum / k as f64)
        }
    }

    /// Predict for many feature vectors, preserving order.
    pub fn predict_many(&self, queries: &[Vec<f64>]) -> Vec<Option<f64>> {
        queries.iter().map(|q| self.predict(q)).collect()
    }

    fn by_distance(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
        a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
    }

    /// Plain Euclidean distance over the full feature vector.
    fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}
