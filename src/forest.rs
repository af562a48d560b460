use linfa::prelude::*;
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AppError;

/// Bagged ensemble of decision trees over encoded college labels.
///
/// Each tree is fitted on a bootstrap resample of the training rows;
/// prediction is a majority vote across trees, ties resolved toward the
/// smaller label so voting stays deterministic. The expected feature
/// width is stored alongside the trees because it is part of the
/// persisted artifact's meaning.
#[derive(Debug, Serialize, Deserialize)]
pub struct BaggedForest {
    trees: Vec<DecisionTree<f64, usize>>,
    n_features: usize,
}

impl BaggedForest {
    pub fn fit(
        records: &Array2<f64>,
        targets: &Array1<usize>,
        n_trees: usize,
        seed: u64,
    ) -> Result<Self, AppError> {
        let n_rows = records.nrows();
        if n_rows == 0 {
            return Err(AppError::Training("no training rows".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(n_trees);
        for _ in 0..n_trees {
            let indices: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let sample = Dataset::new(
                records.select(Axis(0), &indices),
                targets.select(Axis(0), &indices),
            );
            let tree = DecisionTree::params()
                .fit(&sample)
                .map_err(|e| AppError::Training(e.to_string()))?;
            trees.push(tree);
        }

        Ok(Self {
            trees,
            n_features: records.ncols(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Majority-vote predictions for every row.
    pub fn predict(&self, records: &Array2<f64>) -> Array1<usize> {
        let mut votes: Vec<HashMap<usize, usize>> = vec![HashMap::new(); records.nrows()];
        for tree in &self.trees {
            let predictions = tree.predict(records);
            for (row, label) in predictions.iter().enumerate() {
                *votes[row].entry(*label).or_insert(0) += 1;
            }
        }

        let winners: Vec<usize> = votes
            .into_iter()
            .map(|counts| {
                counts
                    .into_iter()
                    .max_by(|(label_a, count_a), (label_b, count_b)| {
                        count_a.cmp(count_b).then(label_b.cmp(label_a))
                    })
                    .map(|(label, _)| label)
                    .unwrap_or(0)
            })
            .collect();
        Array1::from(winners)
    }

    /// Fraction of rows where the vote matches the target.
    pub fn accuracy(&self, records: &Array2<f64>, targets: &Array1<usize>) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let predictions = self.predict(records);
        let correct = predictions
            .iter()
            .zip(targets.iter())
            .filter(|(p, t)| p == t)
            .count();
        correct as f64 / targets.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<usize>) {
        let records = array![
            [1000.0, 1200.0],
            [1100.0, 1300.0],
            [9000.0, 9500.0],
            [9100.0, 9600.0],
        ];
        let targets = array![0usize, 0, 1, 1];
        (records, targets)
    }

    #[test]
    fn forest_recovers_separable_training_labels() {
        let (records, targets) = separable_data();
        let forest = BaggedForest::fit(&records, &targets, 50, 42).unwrap();

        assert_eq!(forest.n_trees(), 50);
        assert_eq!(forest.n_features(), 2);
        assert_eq!(forest.predict(&records), targets);
        assert!((forest.accuracy(&records, &targets) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fit_is_reproducible_for_a_fixed_seed() {
        let (records, targets) = separable_data();
        let a = BaggedForest::fit(&records, &targets, 10, 7).unwrap();
        let b = BaggedForest::fit(&records, &targets, 10, 7).unwrap();
        let probe = array![[1050.0, 1250.0], [9050.0, 9550.0]];
        assert_eq!(a.predict(&probe), b.predict(&probe));
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let records = Array2::<f64>::zeros((0, 3));
        let targets = Array1::<usize>::from(vec![]);
        let err = BaggedForest::fit(&records, &targets, 5, 1).unwrap_err();
        assert!(matches!(err, AppError::Training(_)));
    }

    #[test]
    fn forest_round_trips_through_json() {
        let (records, targets) = separable_data();
        let forest = BaggedForest::fit(&records, &targets, 5, 3).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let back: BaggedForest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n_features(), 2);
        assert_eq!(back.predict(&records), forest.predict(&records));
    }
}
