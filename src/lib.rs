//! House sale price regression pipeline: feature engineering, combined
//! train/test preprocessing, a family of regression models, and a
//! fixed-weight prediction ensemble.

pub mod data;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use data::{RawTable, read_csv, write_submission};
pub use models::{blend, AveragingModels, Regressor};
pub use pipeline::run;
pub use types::{PipelineConfig, PipelineError, RatioPolicy, Result};
