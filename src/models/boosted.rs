//! Gradient-boosted regression trees, wrapping the `gbdt` crate.
//!
//! One wrapper serves the three configured variants (the boosting member
//! of the averaged ensemble and the two standalone blend members); they
//! differ only in hyperparameters. The gbdt crate works in f32, so all
//! conversions stay inside this module.

use std::sync::Arc;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2, Axis};

use crate::models::Regressor;
use crate::types::{BoostedTreesConfig, PipelineError, Result};

#[derive(Clone)]
pub struct BoostedTrees {
    name: &'static str,
    config: BoostedTreesConfig,
    // Fitted forests are immutable; clones share them.
    fitted: Option<Arc<GBDT>>,
}

impl BoostedTrees {
    pub fn new(name: &'static str, config: BoostedTreesConfig) -> Self {
        Self {
            name,
            config,
            fitted: None,
        }
    }

    fn gbdt_config(&self, n_features: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(n_features);
        cfg.set_max_depth(self.config.max_depth);
        cfg.set_iterations(self.config.iterations);
        cfg.set_shrinkage(self.config.shrinkage as f32);
        cfg.set_data_sample_ratio(self.config.data_sample_ratio);
        cfg.set_feature_sample_ratio(self.config.feature_sample_ratio);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg
    }

    fn to_rows(x: &Array2<f64>) -> Vec<Vec<f32>> {
        x.axis_iter(Axis(0))
            .map(|row| row.iter().map(|v| *v as f32).collect())
            .collect()
    }
}

impl Regressor for BoostedTrees {
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

        let mut training: DataVec = Self::to_rows(x)
            .into_iter()
            .zip(y.iter())
            .map(|(features, target)| {
                Data::new_training_data(features, 1.0, *target as f32, None)
            })
            .collect();

        let mut model = GBDT::new(&self.gbdt_config(x.ncols()));
        model.fit(&mut training);
        self.fitted = Some(Arc::new(model));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self
            .fitted
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name.to_string()))?;
        let test: DataVec = Self::to_rows(x)
            .into_iter()
            .map(|features| Data::new_test_data(features, None))
            .collect();
        let predictions = model.predict(&test);
        Ok(predictions.into_iter().map(f64::from).collect())
    }

    fn boxed_clone(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
