//! Missing value imputation for numeric columns

use crate::error::{CostwiseError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for computing the per-column fill value at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace nulls with the column mean
    Mean,
    /// Replace nulls with the column median
    Median,
    /// Replace nulls with a constant value
    Constant(f64),
}

/// Numeric imputer. Fill values are learned once from the training split
/// and applied unchanged to any later split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    // BTreeMap keeps artifact serialization byte-stable across runs
    fill_values: BTreeMap<String, f64>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Learn fill values from the given columns.
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

            let fill = match &self.strategy {
                ImputeStrategy::Mean => ca.mean().unwrap_or(0.0),
                ImputeStrategy::Median => ca.median().unwrap_or(0.0),
                ImputeStrategy::Constant(v) => *v,
            };
            self.fill_values.insert(col_name.to_string(), fill);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill nulls in every fitted column present in the frame.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CostwiseError::NotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill) in &self.fill_values {
            if let Ok(column) = df.column(col_name) {
                let casted = column
                    .cast(&DataType::Float64)
                    .map_err(|e| CostwiseError::DataError(e.to_string()))?;
                let ca = casted
                    .f64()
                    .map_err(|e| CostwiseError::DataError(e.to_string()))?;

                let filled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*fill)))
                    .collect();

                let series = filled.with_name(col_name.as_str().into()).into_series();
                result = result
                    .with_column(series)
                    .map_err(|e| CostwiseError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fitted fill value for a column, if any.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values.get(column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_imputation() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[Some(1.0), None, Some(3.0), Some(5.0)],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let result = imputer.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        assert!((col.get(1).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_fill_value_comes_from_fit_split() {
        let train = df!("a" => &[2.0, 4.0]).unwrap();
        let test = DataFrame::new(vec![Column::new("a".into(), &[None::<f64>, Some(10.0)])]).unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        imputer.fit(&train, &["a"]).unwrap();

        // Test-split nulls get the train mean, not the test mean
        let result = imputer.transform(&test).unwrap();
        let col = result.column("a").unwrap().f64().unwrap();
        assert!((col.get(0).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("a" => &[1.0]).unwrap();
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(matches!(imputer.transform(&df), Err(CostwiseError::NotFitted)));
    }
}
