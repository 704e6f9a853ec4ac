//! Kernel ridge regression with a polynomial kernel.
//!
//! Dual formulation: fit solves `(K + alpha*I) a = y` for the dual
//! coefficients with Gaussian elimination (partial pivoting), predict
//! evaluates `K(X, X_train) . a`.

use ndarray::{Array1, Array2};

use crate::models::Regressor;
use crate::types::{KernelRidgeConfig, PipelineError, Result};

#[derive(Debug, Clone)]
pub struct KernelRidge {
    alpha: f64,
    degree: i32,
    coef0: f64,
    fitted: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    x_train: Array2<f64>,
    dual_coefficients: Array1<f64>,
    gamma: f64,
}

impl KernelRidge {
    pub fn new(config: &KernelRidgeConfig) -> Self {
        Self {
            alpha: config.alpha,
            degree: config.degree as i32,
            coef0: config.coef0,
            fitted: None,
        }
    }

    /// `(gamma * <x, z> + coef0) ^ degree` for every pair of rows.
    fn kernel(&self, a: &Array2<f64>, b: &Array2<f64>, gamma: f64) -> Array2<f64> {
        let mut k = a.dot(&b.t());
        k.mapv_inplace(|v| (gamma * v + self.coef0).powi(self.degree));
        k
    }
}

impl Regressor for KernelRidge {
    fn name(&self) -> &str {
        "kernel_ridge"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(PipelineError::LengthMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        let gamma = 1.0 / x.ncols().max(1) as f64;

        let mut k = self.kernel(x, x, gamma);
        for i in 0..n {
            k[[i, i]] += self.alpha;
        }

        let dual = solve_linear_system(&k, y)?;
        self.fitted = Some(FittedState {
            x_train: x.clone(),
            dual_coefficients: dual,
            gamma,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let state = self
            .fitted
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name().to_string()))?;
        let k = self.kernel(x, &state.x_train, state.gamma);
        Ok(k.dot(&state.dual_coefficients))
    }

    fn boxed_clone(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

/// Gaussian elimination with partial pivoting on an augmented copy.
fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let mut augmented = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            augmented[[i, j]] = a[[i, j]];
        }
        augmented[[i, n]] = b[i];
    }

    for i in 0..n {
        let mut max_row = i;
        let mut max_val = augmented[[i, i]].abs();
        for k in (i + 1)..n {
            if augmented[[k, i]].abs() > max_val {
                max_val = augmented[[k, i]].abs();
                max_row = k;
            }
        }
        if max_row != i {
            for j in 0..=n {
                let tmp = augmented[[i, j]];
                augmented[[i, j]] = augmented[[max_row, j]];
                augmented[[max_row, j]] = tmp;
            }
        }

        let pivot = augmented[[i, i]];
        if pivot.abs() < 1e-12 {
            return Err(PipelineError::SingularSystem);
        }
        for k in (i + 1)..n {
            let factor = augmented[[k, i]] / pivot;
            for j in i..=n {
                augmented[[k, j]] -= factor * augmented[[i, j]];
            }
        }
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = augmented[[i, n]];
        for j in (i + 1)..n {
            sum -= augmented[[i, j]] * x[j];
        }
        x[i] = sum / augmented[[i, i]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn solves_a_known_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![5.0, 10.0];
        let x = solve_linear_system(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn singular_system_is_rejected() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(matches!(
            solve_linear_system(&a, &b).unwrap_err(),
            PipelineError::SingularSystem
        ));
    }

    #[test]
    fn interpolates_training_points_with_small_alpha() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 5.0, 10.0]; // x^2 + 1, inside a degree-2 kernel's span
        let mut model = KernelRidge::new(&KernelRidgeConfig {
            alpha: 1e-8,
            degree: 2,
            coef0: 1.0,
        });
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3, "pred {p} vs {t}");
        }
    }

    #[test]
    fn prediction_length_matches_rows() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = KernelRidge::new(&KernelRidgeConfig::default());
        model.fit(&x, &y).unwrap();
        let probe = array![[0.5, 0.5]];
        assert_eq!(model.predict(&probe).unwrap().len(), 1);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = KernelRidge::new(&KernelRidgeConfig::default());
        assert!(matches!(
            model.predict(&array![[1.0]]).unwrap_err(),
            PipelineError::NotFitted(_)
        ));
    }
}
