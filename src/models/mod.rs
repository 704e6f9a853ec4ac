//! Regression models and the averaging meta-estimator.

pub mod averaging;
pub mod boosted;
pub mod kernel_ridge;
pub mod linear;

pub use averaging::{blend, AveragingModels};
pub use boosted::BoostedTrees;
pub use kernel_ridge::KernelRidge;
pub use linear::{ElasticNetModel, LassoModel};

use ndarray::{Array1, Array2};

use crate::types::Result;

/// Common contract for every regression model in the pipeline, including
/// the averaging meta-estimator.
///
/// `boxed_clone` duplicates the model's configuration (and fitted state,
/// if any); the meta-estimator and the cross-validation scorer rely on it
/// to fit copies without mutating the originals.
pub trait Regressor: Send {
    fn name(&self) -> &str;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// One prediction per row of `x`. Errors if the model was never fit.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn boxed_clone(&self) -> Box<dyn Regressor>;
}

impl Clone for Box<dyn Regressor> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
