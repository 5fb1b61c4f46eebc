//! costwise - Construction-cost prediction pipeline
//!
//! An end-to-end pipeline that predicts a construction-cost total from a row
//! of mixed categorical/numeric project attributes:
//!
//! - [`data`] - CSV loading and seeded train/test ingestion
//! - [`transform`] - imputation, target encoding, scaling (train-fitted)
//! - [`training`] - grid-searched candidate regressors, selected by test R²
//! - [`inference`] - replays the fitted transformations on request rows
//! - [`server`] - HTTP service exposing `/predict`
//! - [`artifacts`] - shared registry for split files and fitted artifacts
//! - [`schema`] - the fixed column schema both sides must agree on

pub mod artifacts;
pub mod cli;
pub mod data;
pub mod error;
pub mod inference;
pub mod schema;
pub mod server;
pub mod training;
pub mod transform;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{CostwiseError, Result};
