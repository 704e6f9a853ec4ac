//! Averaging meta-estimator and the fixed-weight blend.

use ndarray::{Array1, Array2};

use crate::models::Regressor;
use crate::types::{PipelineError, Result};

/// Composes N base models behind the single-model contract: `fit` trains
/// an independent copy of every template, `predict` returns the row-wise
/// arithmetic mean of the copies' outputs.
///
/// Templates are never mutated, so the same configured instances can be
/// scored or reused elsewhere. All-or-nothing: any member failure
/// propagates as-is.
pub struct AveragingModels {
    templates: Vec<Box<dyn Regressor>>,
    fitted: Vec<Box<dyn Regressor>>,
}

impl AveragingModels {
    pub fn new(templates: Vec<Box<dyn Regressor>>) -> Self {
        Self {
            templates,
            fitted: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Regressor for AveragingModels {
    fn name(&self) -> &str {
        "averaged_models"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.templates.is_empty() {
            return Err(PipelineError::Training {
                model: self.name().to_string(),
                message: "no base models".to_string(),
            });
        }
        let mut fitted = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            let mut copy = template.boxed_clone();
            copy.fit(x, y)?;
            fitted.push(copy);
        }
        self.fitted = fitted;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.fitted.is_empty() {
            return Err(PipelineError::NotFitted(self.name().to_string()));
        }
        let mut mean: Array1<f64> = Array1::zeros(x.nrows());
        for model in &self.fitted {
            let prediction = model.predict(x)?;
            if prediction.len() != x.nrows() {
                return Err(PipelineError::LengthMismatch {
                    expected: x.nrows(),
                    actual: prediction.len(),
                });
            }
            mean += &prediction;
        }
        mean /= self.fitted.len() as f64;
        Ok(mean)
    }

    fn boxed_clone(&self) -> Box<dyn Regressor> {
        Box::new(Self {
            templates: self.templates.clone(),
            fitted: self.fitted.clone(),
        })
    }
}

/// Fixed-weight blend of prediction vectors, element-wise. All vectors
/// must be the same length, one weight per vector.
pub fn blend(predictions: &[&Array1<f64>], weights: &[f64]) -> Result<Array1<f64>> {
    if predictions.is_empty() || predictions.len() != weights.len() {
        return Err(PipelineError::LengthMismatch {
            expected: weights.len(),
            actual: predictions.len(),
        });
    }
    let n = predictions[0].len();
    let mut out: Array1<f64> = Array1::zeros(n);
    for (prediction, weight) in predictions.iter().zip(weights.iter()) {
        if prediction.len() != n {
            return Err(PipelineError::LengthMismatch {
                expected: n,
                actual: prediction.len(),
            });
        }
        out.scaled_add(*weight, *prediction);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Deterministic stub returning a constant vector; counts fits so the
    /// template-isolation contract is observable.
    #[derive(Clone)]
    struct Stub {
        output: Vec<f64>,
        fit_calls: Arc<AtomicUsize>,
        fitted: bool,
    }

    impl Stub {
        fn new(output: Vec<f64>) -> Self {
            Self {
                output,
                fit_calls: Arc::new(AtomicUsize::new(0)),
                fitted: false,
            }
        }
    }

    impl Regressor for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
            self.fit_calls.fetch_add(1, Ordering::SeqCst);
            self.fitted = true;
            Ok(())
        }

        fn predict(&self, _x: &Array2<f64>) -> Result<Array1<f64>> {
            if !self.fitted {
                return Err(PipelineError::NotFitted("stub".to_string()));
            }
            Ok(Array1::from(self.output.clone()))
        }

        fn boxed_clone(&self) -> Box<dyn Regressor> {
            Box::new(self.clone())
        }
    }

    struct FailingStub;

    impl Regressor for FailingStub {
        fn name(&self) -> &str {
            "failing"
        }

        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
            Err(PipelineError::Training {
                model: "failing".to_string(),
                message: "boom".to_string(),
            })
        }

        fn predict(&self, _x: &Array2<f64>) -> Result<Array1<f64>> {
            Err(PipelineError::NotFitted("failing".to_string()))
        }

        fn boxed_clone(&self) -> Box<dyn Regressor> {
            Box::new(FailingStub)
        }
    }

    fn xy() -> (Array2<f64>, Array1<f64>) {
        (array![[1.0], [2.0], [3.0]], array![1.0, 2.0, 3.0])
    }

    #[test]
    fn predicts_the_mean_of_members() {
        let (x, y) = xy();
        let mut avg = AveragingModels::new(vec![
            Box::new(Stub::new(vec![1.0, 2.0, 3.0])),
            Box::new(Stub::new(vec![3.0, 4.0, 5.0])),
        ]);
        avg.fit(&x, &y).unwrap();
        let pred = avg.predict(&x).unwrap();
        assert_eq!(pred, array![2.0, 3.0, 4.0]);
        assert_eq!(pred.len(), x.nrows());
    }

    #[test]
    fn single_member_is_identity() {
        let (x, y) = xy();
        let mut avg = AveragingModels::new(vec![Box::new(Stub::new(vec![7.0, 8.0, 9.0]))]);
        avg.fit(&x, &y).unwrap();
        assert_eq!(avg.predict(&x).unwrap(), array![7.0, 8.0, 9.0]);
    }

    #[test]
    fn templates_are_not_mutated_by_fit() {
        let (x, y) = xy();
        let template = Stub::new(vec![1.0, 2.0, 3.0]);
        let calls = template.fit_calls.clone();
        let mut avg = AveragingModels::new(vec![Box::new(template)]);

        avg.fit(&x, &y).unwrap();
        avg.fit(&x, &y).unwrap();

        // Copies were fitted, not the stored template: it would refuse to
        // predict (never fitted) while the composite predicts fine.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(avg.templates[0].predict(&x).is_err());
        assert!(avg.predict(&x).is_ok());
    }

    #[test]
    fn unfitted_predict_fails() {
        let avg = AveragingModels::new(vec![Box::new(Stub::new(vec![1.0]))]);
        assert!(matches!(
            avg.predict(&array![[1.0]]).unwrap_err(),
            PipelineError::NotFitted(_)
        ));
    }

    #[test]
    fn member_failure_propagates() {
        let (x, y) = xy();
        let mut avg = AveragingModels::new(vec![
            Box::new(Stub::new(vec![1.0, 2.0, 3.0])),
            Box::new(FailingStub),
        ]);
        assert!(matches!(
            avg.fit(&x, &y).unwrap_err(),
            PipelineError::Training { .. }
        ));
    }

    #[test]
    fn blend_applies_fixed_weights() {
        let p1 = array![10.0];
        let p2 = array![20.0];
        let p3 = array![30.0];
        let out = blend(&[&p1, &p2, &p3], &[0.1, 0.6, 0.3]).unwrap();
        assert!((out[0] - 22.0).abs() < 1e-12);
    }

    #[test]
    fn blend_rejects_mismatched_lengths() {
        let p1 = array![1.0, 2.0];
        let p2 = array![1.0];
        assert!(blend(&[&p1, &p2], &[0.5, 0.5]).is_err());
        assert!(blend(&[&p1], &[0.5, 0.5]).is_err());
        assert!(blend(&[], &[]).is_err());
    }
}
