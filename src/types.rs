//! Shared types: pipeline configuration and the error taxonomy.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column holding the row identifier in both input tables.
pub const ID_COLUMN: &str = "Id";
/// Target column, present only in the training table.
pub const TARGET_COLUMN: &str = "SalePrice";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column {column} is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("column {0} has no observed values to impute from")]
    EmptyColumn(String),

    #[error("column {0} has a missing value where none is allowed")]
    UnexpectedMissing(String),

    #[error("table has no rows")]
    EmptyTable,

    #[error("train and test tables disagree on feature columns: {0}")]
    Schema(String),

    #[error("model {0} used before fit")]
    NotFitted(String),

    #[error("linear system is singular")]
    SingularSystem,

    #[error("training {model} failed: {message}")]
    Training { model: String, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// How division-derived engineered features treat a zero or missing
/// denominator (and any other non-finite result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioPolicy {
    /// Null out; the cell is filled by imputation like any other missing
    /// value. Default, since a propagated inf/NaN poisons every later
    /// stage.
    NullInvalid,
    /// Keep whatever IEEE arithmetic produces. Reference behavior.
    Propagate,
}

impl Default for RatioPolicy {
    fn default() -> Self {
        RatioPolicy::NullInvalid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoConfig {
    pub penalty: f64,
}

impl Default for LassoConfig {
    fn default() -> Self {
        Self { penalty: 0.0005 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNetConfig {
    pub penalty: f64,
    pub l1_ratio: f64,
}

impl Default for ElasticNetConfig {
    fn default() -> Self {
        Self {
            penalty: 0.0005,
            l1_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelRidgeConfig {
    pub alpha: f64,
    pub degree: u32,
    pub coef0: f64,
}

impl Default for KernelRidgeConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            degree: 2,
            coef0: 2.5,
        }
    }
}

/// Hyperparameters for one gradient-boosted trees model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedTreesConfig {
    pub iterations: usize,
    pub shrinkage: f64,
    pub max_depth: u32,
    pub data_sample_ratio: f64,
    pub feature_sample_ratio: f64,
}

impl BoostedTreesConfig {
    /// The gradient-boosting member of the averaged ensemble.
    pub fn gradient_boosting() -> Self {
        Self {
            iterations: 3000,
            shrinkage: 0.05,
            max_depth: 4,
            data_sample_ratio: 1.0,
            feature_sample_ratio: 1.0,
        }
    }

    /// First standalone blend member (xgboost-style configuration).
    pub fn xgb_style() -> Self {
        Self {
            iterations: 2200,
            shrinkage: 0.05,
            max_depth: 3,
            data_sample_ratio: 0.5213,
            feature_sample_ratio: 0.4603,
        }
    }

    /// Second standalone blend member (lightgbm-style configuration).
    pub fn lgbm_style() -> Self {
        Self {
            iterations: 720,
            shrinkage: 0.05,
            max_depth: 5,
            data_sample_ratio: 0.8,
            feature_sample_ratio: 0.2319,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub lasso: LassoConfig,
    pub elastic_net: ElasticNetConfig,
    pub kernel_ridge: KernelRidgeConfig,
    pub gradient_boosting: BoostedTreesConfig,
    pub xgb_style: BoostedTreesConfig,
    pub lgbm_style: BoostedTreesConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            lasso: LassoConfig::default(),
            elastic_net: ElasticNetConfig::default(),
            kernel_ridge: KernelRidgeConfig::default(),
            gradient_boosting: BoostedTreesConfig::gradient_boosting(),
            xgb_style: BoostedTreesConfig::xgb_style(),
            lgbm_style: BoostedTreesConfig::lgbm_style(),
        }
    }
}

/// Full pipeline configuration. Everything the run needs lives in here;
/// there are no flags or environment knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub output_path: PathBuf,
    /// Columns with too many missing values to impute meaningfully.
    pub sparse_columns: Vec<String>,
    pub ratio_policy: RatioPolicy,
    /// Blend weights for (averaged ensemble, xgb-style, lgbm-style).
    pub ensemble_weights: [f64; 3],
    pub cv_folds: usize,
    pub cv_seed: u64,
    /// Diagnostic cross-validation scoring of every candidate model.
    pub score_models: bool,
    pub models: ModelsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.csv"),
            test_path: PathBuf::from("data/test.csv"),
            output_path: PathBuf::from("ensemble.csv"),
            sparse_columns: ["PoolQC", "MiscFeature", "Alley", "Fence", "FireplaceQu"]
                .into_iter()
                .map(String::from)
                .collect(),
            ratio_policy: RatioPolicy::default(),
            ensemble_weights: [0.1, 0.6, 0.3],
            cv_folds: 5,
            cv_seed: 41,
            score_models: true,
            models: ModelsConfig::default(),
        }
    }
}
