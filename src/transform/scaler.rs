//! Standard scaling for numeric features

use crate::error::{CostwiseError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column parameters learned at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Z-score scaler: `(x - mean) / std`, fit on the training split only.
/// Zero-variance columns scale by 1.0 instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: BTreeMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df.column(col_name).map_err(|_| CostwiseError::SchemaMismatch {
                expected: format!("column '{}'", col_name),
                actual: "missing column".to_string(),
            })?;
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| CostwiseError::DataError(e.to_string()))?;
            let ca = casted
                .f64()
                .map_err(|e| CostwiseError::DataError(e.to_string()))?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column present in the frame.
    /// Builds all replacement columns first, then applies them in one pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CostwiseError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let casted = column
                        .cast(&DataType::Float64)
                        .map_err(|e| CostwiseError::DataError(e.to_string()))?;
                    let ca = casted
                        .f64()
                        .map_err(|e| CostwiseError::DataError(e.to_string()))?;
                    let scaled: Float64Chunked = ca
                        .into_iter()
                        .map(|opt| opt.map(|v| (v - params.mean) / params.std))
                        .collect();
                    Ok(scaled.with_name(col_name.as_str().into()).into_series())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| CostwiseError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
