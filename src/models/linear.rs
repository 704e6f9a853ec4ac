//! Regularized linear models (lasso, elastic net) over robust-scaled
//! features, backed by linfa-elasticnet.

use linfa::dataset::Dataset;
use linfa::traits::Fit;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2, Axis};

use crate::models::Regressor;
use crate::types::{ElasticNetConfig, LassoConfig, PipelineError, Result};

/// Per-column `(x - median) / IQR` scaling, fitted on the training matrix.
/// Keeps the coordinate-descent solver well behaved in the presence of the
/// outliers this dataset is known for.
#[derive(Debug, Clone)]
struct RobustScaler {
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl RobustScaler {
    fn fit(x: &Array2<f64>) -> Self {
        let n_cols = x.ncols();
        let mut center = Array1::zeros(n_cols);
        let mut scale = Array1::ones(n_cols);
        for (j, col) in x.axis_iter(Axis(1)).enumerate() {
            let mut values: Vec<f64> = col.iter().copied().collect();
            values.sort_by(|a, b| a.total_cmp(b));
            center[j] = quantile(&values, 0.5);
            let iqr = quantile(&values, 0.75) - quantile(&values, 0.25);
            scale[j] = if iqr < 1e-10 { 1.0 } else { iqr };
        }
        Self { center, scale }
    }

    fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.center[j]) / self.scale[j];
            }
        }
        out
    }
}

/// Linear interpolation between order statistics, over sorted input.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Elastic-net regression; `l1_ratio` 1.0 is the lasso special case.
#[derive(Debug, Clone)]
pub struct ElasticNetModel {
    name: &'static str,
    penalty: f64,
    l1_ratio: f64,
    scaler: Option<RobustScaler>,
    /// `(hyperplane, intercept)` extracted from the fitted solver.
    coefficients: Option<(Array1<f64>, f64)>,
}

pub type LassoModel = ElasticNetModel;

impl ElasticNetModel {
    pub fn new(config: &ElasticNetConfig) -> Self {
        Self {
            name: "elastic_net",
            penalty: config.penalty,
            l1_ratio: config.l1_ratio,
            scaler: None,
            coefficients: None,
        }
    }

    pub fn lasso(config: &LassoConfig) -> Self {
        Self {
            name: "lasso",
            penalty: config.penalty,
            l1_ratio: 1.0,
            scaler: None,
            coefficients: None,
        }
    }
}

impl Regressor for ElasticNetModel {
    fn name(&self) -> &str {
        self.name
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(PipelineError::LengthMismatch {
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        let scaler = RobustScaler::fit(x);
        let scaled = scaler.transform(x);

        let dataset = Dataset::new(scaled, y.clone());
        let fitted = ElasticNet::params()
            .penalty(self.penalty)
            .l1_ratio(self.l1_ratio)
            .fit(&dataset)
            .map_err(|e| PipelineError::Training {
                model: self.name.to_string(),
                message: e.to_string(),
            })?;

        self.coefficients = Some((fitted.hyperplane().to_owned(), fitted.intercept()));
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (hyperplane, intercept) = self
            .coefficients
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name.to_string()))?;
        let scaler = self
            .scaler
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name.to_string()))?;
        Ok(scaler.transform(x).dot(hyperplane) + *intercept)
    }

    fn boxed_clone(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn robust_scaler_centers_on_median() {
        let x = array![[1.0], [2.0], [3.0], [100.0]];
        let scaler = RobustScaler::fit(&x);
        let scaled = scaler.transform(&x);
        // Median 2.5, IQR = 27.25 - 1.75 = 25.5.
        assert!((scaled[[0, 0]] - (1.0 - 2.5) / 25.5).abs() < 1e-12);
        assert!((scaled[[3, 0]] - (100.0 - 2.5) / 25.5).abs() < 1e-12);
        assert!(scaled[[1, 0]] < 0.0 && scaled[[2, 0]] > 0.0);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = ElasticNetModel::new(&ElasticNetConfig::default());
        let err = model.predict(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted(_)));
    }

    #[test]
    fn recovers_a_linear_relation() {
        // y = 2*x0 + 1 with a tiny penalty; prediction should track closely.
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0, 11.0];
        let mut model = ElasticNetModel::new(&ElasticNetConfig {
            penalty: 1e-6,
            l1_ratio: 0.5,
        });
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 0.2, "pred {p} vs {t}");
        }
    }

    #[test]
    fn lasso_is_the_l1_limit() {
        let model = ElasticNetModel::lasso(&LassoConfig::default());
        assert_eq!(model.name(), "lasso");
        assert_eq!(model.l1_ratio, 1.0);
    }
}
