//! Model training: candidate regressors, grid search, cross-validation,
//! and metric reporting.

pub mod cross_validation;
mod forest;
mod grid;
mod linear;
mod metrics;
mod trainer;
mod tree;

pub use cross_validation::{FoldSplit, KFold};
pub use forest::RandomForestRegressor;
pub use grid::{ParamGrid, ParamSet};
pub use linear::{LinearRegression, RidgeRegression};
pub use metrics::RegressionMetrics;
pub use trainer::{
    default_candidates, Candidate, CandidateReport, ModelTrainer, RegressorKind, TrainedRegressor,
    TrainingReport,
};
pub use tree::DecisionTreeRegressor;
