//! End-to-end run: Load → Engineer → Preprocess → Score → Fit → Blend →
//! Write. Each stage takes and returns explicit data; nothing is shared
//! mutably across stages.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use tracing::{info, warn};

use crate::data::{id_strings, read_csv, write_submission, RawTable};
use crate::evaluation::{mean_std, rmse_cv, rmsle};
use crate::models::{
    AveragingModels, BoostedTrees, ElasticNetModel, KernelRidge, Regressor,
};
use crate::preprocessing::{preprocess, target_vector, FeatureEngineer};
use crate::types::{PipelineConfig, PipelineError, Result, ID_COLUMN, TARGET_COLUMN};

/// Verifies the train/test schema and returns the shared feature columns
/// in train order (identifier and target excluded).
fn feature_columns(train: &RawTable, test: &RawTable) -> Result<Vec<String>> {
    let train_features: Vec<String> = train
        .names()
        .iter()
        .filter(|n| *n != ID_COLUMN && *n != TARGET_COLUMN)
        .cloned()
        .collect();
    let train_set: BTreeSet<&String> = train_features.iter().collect();
    let test_set: BTreeSet<&String> = test
        .names()
        .iter()
        .filter(|n| *n != ID_COLUMN && *n != TARGET_COLUMN)
        .collect();

    if train_set != test_set {
        let diff: Vec<&str> = train_set
            .symmetric_difference(&test_set)
            .map(|s| s.as_str())
            .collect();
        return Err(PipelineError::Schema(diff.join(", ")));
    }
    Ok(train_features)
}

fn score(
    model: &dyn Regressor,
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
    seed: u64,
) -> Result<()> {
    let scores = rmse_cv(model, x, y, folds, seed)?;
    let (mean, std) = mean_std(&scores);
    info!(model = model.name(), mean, std, "cross-validation score");
    Ok(())
}

fn fit_and_report(
    model: &mut dyn Regressor,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
) -> Result<Array1<f64>> {
    model.fit(x_train, y_train)?;
    let train_pred = model.predict(x_train)?;
    info!(
        model = model.name(),
        train_rmsle = rmsle(&train_pred, y_train)?,
        "fitted on full training data"
    );
    model.predict(x_test)
}

/// Runs the full pipeline and writes the submission file.
pub fn run(config: &PipelineConfig) -> Result<()> {
    let train = read_csv(&config.train_path)?;
    let test = read_csv(&config.test_path)?;
    info!(
        train_rows = train.height(),
        test_rows = test.height(),
        columns = train.width(),
        "loaded input tables"
    );

    let features = feature_columns(&train, &test)?;
    let n_train = train.height();
    let mut combined = train.select(&features)?.concat(&test.select(&features)?)?;

    FeatureEngineer::new(config.ratio_policy).add_derived_features(&mut combined)?;
    let matrices = preprocess(combined, n_train, &config.sparse_columns)?;
    let y_train = target_vector(&train, TARGET_COLUMN)?;
    info!(
        features = matrices.column_names.len(),
        "preprocessed combined table"
    );

    let models = &config.models;
    let mut averaged = AveragingModels::new(vec![
        Box::new(ElasticNetModel::new(&models.elastic_net)),
        Box::new(BoostedTrees::new("gradient_boosting", models.gradient_boosting.clone())),
        Box::new(KernelRidge::new(&models.kernel_ridge)),
        Box::new(ElasticNetModel::lasso(&models.lasso)),
    ]);
    let mut xgb_style = BoostedTrees::new("xgb_style", models.xgb_style.clone());
    let mut lgbm_style = BoostedTrees::new("lgbm_style", models.lgbm_style.clone());

    if config.score_models {
        if n_train >= config.cv_folds {
            let candidates: Vec<Box<dyn Regressor>> = vec![
                Box::new(ElasticNetModel::lasso(&models.lasso)),
                Box::new(ElasticNetModel::new(&models.elastic_net)),
                Box::new(KernelRidge::new(&models.kernel_ridge)),
                Box::new(BoostedTrees::new(
                    "gradient_boosting",
                    models.gradient_boosting.clone(),
                )),
                Box::new(BoostedTrees::new("xgb_style", models.xgb_style.clone())),
                Box::new(BoostedTrees::new("lgbm_style", models.lgbm_style.clone())),
            ];
            for candidate in &candidates {
                score(
                    candidate.as_ref(),
                    &matrices.train,
                    &y_train,
                    config.cv_folds,
                    config.cv_seed,
                )?;
            }
            score(
                &averaged,
                &matrices.train,
                &y_train,
                config.cv_folds,
                config.cv_seed,
            )?;
        } else {
            warn!(
                rows = n_train,
                folds = config.cv_folds,
                "too few rows for cross-validation scoring, skipping"
            );
        }
    }

    let averaged_pred = fit_and_report(&mut averaged, &matrices.train, &y_train, &matrices.test)?;
    let xgb_pred = fit_and_report(&mut xgb_style, &matrices.train, &y_train, &matrices.test)?;
    let lgbm_pred = fit_and_report(&mut lgbm_style, &matrices.train, &y_train, &matrices.test)?;

    let ensemble = crate::models::blend(
        &[&averaged_pred, &xgb_pred, &lgbm_pred],
        &config.ensemble_weights,
    )?;

    let ids = id_strings(&test, ID_COLUMN)?;
    write_submission(&config.output_path, &ids, &ensemble)?;
    info!(
        rows = ensemble.len(),
        path = %config.output_path.display(),
        "wrote submission"
    );
    Ok(())
}
