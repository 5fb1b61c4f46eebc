//! Model training: grid search over a candidate registry, selection by
//! held-out R², and artifact persistence.

use crate::artifacts::{ArtifactRegistry, Manifest};
use crate::error::{CostwiseError, Result};
use crate::training::forest::RandomForestRegressor;
use crate::training::grid::{ParamGrid, ParamSet};
use crate::training::linear::{LinearRegression, RidgeRegression};
use crate::training::metrics::RegressionMetrics;
use crate::training::cross_validation::KFold;
use crate::training::tree::DecisionTreeRegressor;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which regressor family a candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RegressorKind {
    Linear,
    Ridge,
    DecisionTree,
    RandomForest,
}

/// A fitted (or about-to-be-fitted) regressor, serializable as one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedRegressor {
    Linear(LinearRegression),
    Ridge(RidgeRegression),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
}

impl TrainedRegressor {
    /// Instantiate a regressor of the given kind with grid parameters applied.
    pub fn build(kind: RegressorKind, params: &ParamSet, seed: u64) -> Self {
        match kind {
            RegressorKind::Linear => TrainedRegressor::Linear(LinearRegression::new()),
            RegressorKind::Ridge => {
                let alpha = params.get("alpha").unwrap_or(1.0);
                TrainedRegressor::Ridge(RidgeRegression::new(alpha))
            }
            RegressorKind::DecisionTree => {
                let mut tree = DecisionTreeRegressor::new().with_seed(seed);
                if let Some(depth) = params.get_usize("max_depth") {
                    tree = tree.with_max_depth(depth);
                }
                if let Some(min_leaf) = params.get_usize("min_samples_leaf") {
                    tree = tree.with_min_samples_leaf(min_leaf);
                }
                TrainedRegressor::DecisionTree(tree)
            }
            RegressorKind::RandomForest => {
                let n_estimators = params.get_usize("n_estimators").unwrap_or(100);
                let mut forest = RandomForestRegressor::new(n_estimators).with_seed(seed);
                if let Some(depth) = params.get_usize("max_depth") {
                    forest = forest.with_max_depth(depth);
                }
                if let Some(min_leaf) = params.get_usize("min_samples_leaf") {
                    forest = forest.with_min_samples_leaf(min_leaf);
                }
                TrainedRegressor::RandomForest(forest)
            }
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedRegressor::Linear(m) => m.fit(x, y),
            TrainedRegressor::Ridge(m) => m.fit(x, y),
            TrainedRegressor::DecisionTree(m) => m.fit(x, y),
            TrainedRegressor::RandomForest(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedRegressor::Linear(m) => m.predict(x),
            TrainedRegressor::Ridge(m) => m.predict(x),
            TrainedRegressor::DecisionTree(m) => m.predict(x),
            TrainedRegressor::RandomForest(m) => m.predict(x),
        }
    }
}

/// One entry in the candidate registry.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub kind: RegressorKind,
    pub grid: ParamGrid,
}

impl Candidate {
    pub fn new(name: impl Into<String>, kind: RegressorKind, grid: ParamGrid) -> Self {
        Self {
            name: name.into(),
            kind,
            grid,
        }
    }
}

/// The fixed registry of candidate regressors and their grids.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("linear_regression", RegressorKind::Linear, ParamGrid::new()),
        Candidate::new(
            "ridge_regression",
            RegressorKind::Ridge,
            ParamGrid::new().with("alpha", &[0.01, 0.1, 1.0, 10.0]),
        ),
        Candidate::new(
            "decision_tree",
            RegressorKind::DecisionTree,
            ParamGrid::new()
                .with("max_depth", &[4.0, 8.0, 16.0])
                .with("min_samples_leaf", &[1.0, 5.0]),
        ),
        Candidate::new(
            "random_forest",
            RegressorKind::RandomForest,
            ParamGrid::new()
                .with("n_estimators", &[50.0, 100.0])
                .with("max_depth", &[8.0, 16.0]),
        ),
    ]
}

/// Per-candidate evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub name: String,
    pub best_params: ParamSet,
    /// Mean R² across CV folds for the winning configuration.
    pub cv_r2: f64,
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

/// Full training run outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub candidates: Vec<CandidateReport>,
    pub best_model: String,
    pub best_test_r2: f64,
}

/// Trainer: grid-searches every candidate with k-fold CV, refits the best
/// configuration per candidate, and persists the overall winner (highest
/// test-split R²) through the artifact registry.
///
/// A failing candidate aborts the whole run; there is no partial-failure
/// recovery.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    cv_folds: usize,
    seed: u64,
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelTrainer {
    pub fn new() -> Self {
        Self {
            cv_folds: 3,
            seed: 42,
        }
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run training over arrays whose last column is the target.
    pub fn run(
        &self,
        registry: &ArtifactRegistry,
        candidates: &[Candidate],
        train: &Array2<f64>,
        test: &Array2<f64>,
    ) -> Result<TrainingReport> {
        if candidates.is_empty() {
            return Err(CostwiseError::TrainingError(
                "candidate registry is empty".to_string(),
            ));
        }

        let (x_train, y_train) = split_xy(train)?;
        let (x_test, y_test) = split_xy(test)?;
        if x_train.ncols() != x_test.ncols() {
            return Err(CostwiseError::SchemaMismatch {
                expected: format!("{} feature columns", x_train.ncols()),
                actual: format!("{} feature columns", x_test.ncols()),
            });
        }

        let folds = KFold::new(self.cv_folds)
            .with_seed(self.seed)
            .split(x_train.nrows())?;

        let mut reports = Vec::with_capacity(candidates.len());
        let mut fitted: Vec<TrainedRegressor> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            info!(model = %candidate.name, configurations = candidate.grid.expand().len(), "grid search started");

            let mut best: Option<(ParamSet, f64)> = None;
            for params in candidate.grid.expand() {
                let mut fold_scores = Vec::with_capacity(folds.len());
                for fold in &folds {
                    let x_fit = take_rows(&x_train, &fold.train_indices);
                    let y_fit = take_values(&y_train, &fold.train_indices);
                    let x_val = take_rows(&x_train, &fold.val_indices);
                    let y_val = take_values(&y_train, &fold.val_indices);

                    let mut model = TrainedRegressor::build(candidate.kind, &params, self.seed);
                    model.fit(&x_fit, &y_fit)?;
                    let pred = model.predict(&x_val)?;
                    fold_scores.push(RegressionMetrics::compute(&y_val, &pred).r2);
                }

                let mean_r2 = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                let better = match &best {
                    Some((_, best_r2)) => mean_r2 > *best_r2,
                    None => true,
                };
                if better {
                    best = Some((params, mean_r2));
                }
            }

            let (best_params, cv_r2) = best.ok_or_else(|| {
                CostwiseError::TrainingError(format!("no configurations for {}", candidate.name))
            })?;
            info!(model = %candidate.name, params = %best_params, cv_r2, "best configuration found, refitting");

            // Refit the winning configuration on the full training split
            let mut model = TrainedRegressor::build(candidate.kind, &best_params, self.seed);
            model.fit(&x_train, &y_train)?;

            let train_pred = model.predict(&x_train)?;
            let test_pred = model.predict(&x_test)?;
            let train_metrics = RegressionMetrics::compute(&y_train, &train_pred);
            let test_metrics = RegressionMetrics::compute(&y_test, &test_pred);
            info!(
                model = %candidate.name,
                train_r2 = train_metrics.r2,
                test_r2 = test_metrics.r2,
                "candidate evaluated"
            );

            reports.push(CandidateReport {
                name: candidate.name.clone(),
                best_params,
                cv_r2,
                train: train_metrics,
                test: test_metrics,
            });
            fitted.push(model);
        }

        let best_idx = reports
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                let ra = if a.test.r2.is_nan() { f64::NEG_INFINITY } else { a.test.r2 };
                let rb = if b.test.r2.is_nan() { f64::NEG_INFINITY } else { b.test.r2 };
                ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .ok_or_else(|| CostwiseError::TrainingError("no candidates evaluated".to_string()))?;

        let report = TrainingReport {
            candidates: reports.clone(),
            best_model: reports[best_idx].name.clone(),
            best_test_r2: reports[best_idx].test.r2,
        };

        registry.ensure_dirs()?;
        registry.save_json(&registry.model_path(), &fitted[best_idx])?;
        registry.save_json(&registry.manifest_path(), &Manifest::new(&report.best_model))?;
        registry.save_json(&registry.report_path(), &report)?;
        info!(
            best_model = %report.best_model,
            best_test_r2 = report.best_test_r2,
            path = %registry.model_path().display(),
            "persisted winning model"
        );

        Ok(report)
    }
}

/// Split an array whose last column is the target into features and target.
fn split_xy(arr: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    if arr.ncols() < 2 {
        return Err(CostwiseError::SchemaMismatch {
            expected: "at least 2 columns (features + target)".to_string(),
            actual: format!("{} columns", arr.ncols()),
        });
    }
    let n_features = arr.ncols() - 1;
    let x = arr.slice(ndarray::s![.., ..n_features]).to_owned();
    let y = arr.index_axis(Axis(1), n_features).to_owned();
    Ok((x, y))
}

fn take_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), x.ncols()), |(r, c)| x[[indices[r], c]])
}

fn take_values(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_shape_fn(indices.len(), |r| y[indices[r]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Linear-ish data: y = 3 a - 2 b + 5, with a target column appended.
    fn synthetic_array(n: usize, offset: f64) -> Array2<f64> {
        Array2::from_shape_fn((n, 3), |(r, c)| {
            let a = (r as f64 + offset) % 13.0;
            let b = ((r * 3) as f64 + offset) % 7.0;
            match c {
                0 => a,
                1 => b,
                _ => 3.0 * a - 2.0 * b + 5.0,
            }
        })
    }

    fn small_registry() -> Vec<Candidate> {
        vec![
            Candidate::new("linear_regression", RegressorKind::Linear, ParamGrid::new()),
            Candidate::new(
                "ridge_regression",
                RegressorKind::Ridge,
                ParamGrid::new().with("alpha", &[0.1]),
            ),
        ]
    }

    #[test]
    fn test_trainer_selects_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());

        let train = synthetic_array(60, 0.0);
        let test = synthetic_array(12, 1.0);

        let report = ModelTrainer::new()
            .run(&registry, &small_registry(), &train, &test)
            .unwrap();

        assert_eq!(report.candidates.len(), 2);
        // Exact linear data: both models should fit nearly perfectly
        assert!(report.best_test_r2 > 0.99, "best_test_r2 = {}", report.best_test_r2);
        assert!(registry.model_path().exists());
        assert!(registry.manifest_path().exists());
        assert!(registry.report_path().exists());
    }

    #[test]
    fn test_persisted_model_reloads_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());

        let train = synthetic_array(60, 0.0);
        let test = synthetic_array(12, 1.0);
        ModelTrainer::new()
            .run(&registry, &small_registry(), &train, &test)
            .unwrap();

        let model: TrainedRegressor = registry.load_json(&registry.model_path()).unwrap();
        let (x_test, y_test) = split_xy(&test).unwrap();
        let pred = model.predict(&x_test).unwrap();
        let metrics = RegressionMetrics::compute(&y_test, &pred);
        assert!(metrics.r2 > 0.99);
    }

    #[test]
    fn test_empty_registry_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());
        let train = synthetic_array(30, 0.0);
        let test = synthetic_array(6, 1.0);

        let err = ModelTrainer::new()
            .run(&registry, &[], &train, &test)
            .unwrap_err();
        assert!(matches!(err, CostwiseError::TrainingError(_)));
    }

    #[test]
    fn test_grid_search_prefers_better_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());
        let train = synthetic_array(60, 0.0);
        let test = synthetic_array(12, 1.0);

        let candidates = vec![Candidate::new(
            "ridge_regression",
            RegressorKind::Ridge,
            ParamGrid::new().with("alpha", &[0.001, 1000.0]),
        )];
        let report = ModelTrainer::new()
            .run(&registry, &candidates, &train, &test)
            .unwrap();

        // Heavy shrinkage ruins exact linear data; grid search must pick the small alpha
        assert_eq!(report.candidates[0].best_params.get("alpha"), Some(0.001));
    }
}
