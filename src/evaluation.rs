//! Cross-validation scoring and error metrics.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::Regressor;
use crate::types::{PipelineError, Result};

/// Root-mean-square error.
pub fn rmse(predicted: &Array1<f64>, actual: &Array1<f64>) -> Result<f64> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(PipelineError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    let mse = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / predicted.len() as f64;
    Ok(mse.sqrt())
}

/// RMSE in log space: `sqrt(mean((ln(p+1) - ln(a+1))^2))`. The standard
/// leaderboard metric for this target; assumes non-negative values.
pub fn rmsle(predicted: &Array1<f64>, actual: &Array1<f64>) -> Result<f64> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(PipelineError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    let mse = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| {
            let d = (p + 1.0).ln() - (a + 1.0).ln();
            d * d
        })
        .sum::<f64>()
        / predicted.len() as f64;
    Ok(mse.sqrt())
}

/// Shuffled k-fold index splitter with a fixed seed.
pub struct KFold {
    folds: Vec<Vec<usize>>,
}

impl KFold {
    pub fn new(n_rows: usize, k: usize, seed: u64) -> Result<Self> {
        if k < 2 || n_rows < k {
            return Err(PipelineError::LengthMismatch {
                expected: k,
                actual: n_rows,
            });
        }
        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        // First n_rows % k folds take one extra row.
        let base = n_rows / k;
        let extra = n_rows % k;
        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let size = base + usize::from(i < extra);
            folds.push(indices[start..start + size].to_vec());
            start += size;
        }
        Ok(Self { folds })
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// `(train_indices, validation_indices)` per fold.
    pub fn splits<'a>(&'a self) -> impl Iterator<Item = (Vec<usize>, &'a [usize])> + 'a {
        self.folds.iter().enumerate().map(move |(i, validation)| {
            let train: Vec<usize> = self
                .folds
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, fold)| fold.iter().copied())
                .collect();
            (train, validation.as_slice())
        })
    }
}

/// Cross-validated RMSE for one model: per fold, a fresh copy of the model
/// is fitted on the complement and scored on the held-out rows. Returns
/// one RMSE per fold; neither the model nor the data is mutated.
pub fn rmse_cv(
    model: &dyn Regressor,
    x: &Array2<f64>,
    y: &Array1<f64>,
    k: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    if x.nrows() != y.len() {
        return Err(PipelineError::LengthMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    let kfold = KFold::new(x.nrows(), k, seed)?;
    let mut scores = Vec::with_capacity(kfold.len());
    for (train_idx, validation_idx) in kfold.splits() {
        let x_train = x.select(Axis(0), &train_idx);
        let y_train = y.select(Axis(0), &train_idx);
        let x_val = x.select(Axis(0), validation_idx);
        let y_val = y.select(Axis(0), validation_idx);

        let mut fold_model = model.boxed_clone();
        fold_model.fit(&x_train, &y_train)?;
        let predicted = fold_model.predict(&x_val)?;
        scores.push(rmse(&predicted, &y_val)?);
    }
    Ok(scores)
}

pub fn mean_std(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let variance =
        scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / scores.len() as f64;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rmse_of_exact_prediction_is_zero() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(rmse(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn rmse_known_value() {
        let p = array![0.0, 0.0];
        let a = array![3.0, 4.0];
        // mean(9, 16) = 12.5
        assert!((rmse(&p, &a).unwrap() - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rmsle_matches_log_space_rmse() {
        let p = array![std::f64::consts::E - 1.0];
        let a = array![0.0];
        assert!((rmsle(&p, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn kfold_partitions_all_indices() {
        let kfold = KFold::new(10, 3, 41).unwrap();
        assert_eq!(kfold.len(), 3);
        let mut seen: Vec<usize> = kfold.folds.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        // 10 = 4 + 3 + 3
        assert_eq!(kfold.folds[0].len(), 4);
    }

    #[test]
    fn kfold_is_deterministic_for_a_seed() {
        let a = KFold::new(20, 5, 41).unwrap();
        let b = KFold::new(20, 5, 41).unwrap();
        assert_eq!(a.folds, b.folds);
        let c = KFold::new(20, 5, 42).unwrap();
        assert_ne!(a.folds, c.folds);
    }

    #[test]
    fn kfold_rejects_undersized_input() {
        assert!(KFold::new(3, 5, 41).is_err());
        assert!(KFold::new(10, 1, 41).is_err());
    }

    #[test]
    fn splits_keep_validation_out_of_train() {
        let kfold = KFold::new(9, 3, 7).unwrap();
        for (train, validation) in kfold.splits() {
            assert_eq!(train.len() + validation.len(), 9);
            for v in validation {
                assert!(!train.contains(v));
            }
        }
    }
}
