//! Target encoding for categorical columns

use crate::error::{CostwiseError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target encoder: each category maps to the mean of the target variable over
/// the rows that carried it in the training split.
///
/// Categories never seen at fit time (and nulls) map to the global target
/// mean of the training split, so encoding is total and deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEncoder {
    // column name -> (category -> mean target)
    target_means: BTreeMap<String, BTreeMap<String, f64>>,
    global_mean: f64,
    is_fitted: bool,
}

impl Default for TargetEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetEncoder {
    pub fn new() -> Self {
        Self {
            target_means: BTreeMap::new(),
            global_mean: 0.0,
            is_fitted: false,
        }
    }

    /// Fit category means from the given columns against the target.
    /// Call this with the training split only.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str], target: &Series) -> Result<&mut Self> {
        let target_values = target
            .cast(&DataType::Float64)
            .map_err(|e| CostwiseError::DataError(e.to_string()))?;
        let target_ca = target_values
            .f64()
            .map_err(|e| CostwiseError::DataError(e.to_string()))?
            .clone();

        self.global_mean = target_ca.mean().unwrap_or(0.0);

        for col_name in columns {
            let column = df.column(col_name).map_err(|_| CostwiseError::SchemaMismatch {
                expected: format!("column '{}'", col_name),
                actual: "missing column".to_string(),
            })?;
            let ca = column
                .str()
                .map_err(|e| CostwiseError::DataError(e.to_string()))?;

            if ca.len() != target_ca.len() {
                return Err(CostwiseError::SchemaMismatch {
                    expected: format!("{} target rows", ca.len()),
                    actual: format!("{} target rows", target_ca.len()),
                });
            }

            let mut sums: BTreeMap<String, f64> = BTreeMap::new();
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for (cat, target_val) in ca.into_iter().zip((&target_ca).into_iter()) {
                if let (Some(c), Some(t)) = (cat, target_val) {
                    *sums.entry(c.to_string()).or_insert(0.0) += t;
                    *counts.entry(c.to_string()).or_insert(0) += 1;
                }
            }

            let means: BTreeMap<String, f64> = sums
                .into_iter()
                .map(|(category, sum)| {
                    let count = counts.get(&category).copied().unwrap_or(1);
                    (category, sum / count as f64)
                })
                .collect();
            self.target_means.insert(col_name.to_string(), means);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its encoded numeric values.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CostwiseError::NotFitted);
        }

        let mut result = df.clone();
        for (col_name, means) in &self.target_means {
            if let Ok(column) = df.column(col_name) {
                let ca = column
                    .str()
                    .map_err(|e| CostwiseError::DataError(e.to_string()))?;

                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| {
                        v.and_then(|s| means.get(s).copied())
                            .unwrap_or(self.global_mean)
                    })
                    .collect();

                let series = Series::new(col_name.as_str().into(), values);
                result = result
                    .with_column(series)
                    .map_err(|e| CostwiseError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Global training-target mean, the fallback for unseen categories.
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    /// Fitted encoding for a single category, if it was seen at fit time.
    pub fn category_mean(&self, column: &str, category: &str) -> Option<f64> {
        self.target_means.get(column).and_then(|m| m.get(category)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_frame() -> (DataFrame, Series) {
        let df = df!(
            "city" => &["perth", "perth", "sydney", "sydney"],
        )
        .unwrap();
        let target = Series::new("Total".into(), &[10.0, 20.0, 30.0, 50.0]);
        (df, target)
    }

    #[test]
    fn test_category_means() {
        let (df, target) = train_frame();
        let mut encoder = TargetEncoder::new();
        encoder.fit(&df, &["city"], &target).unwrap();

        assert_eq!(encoder.category_mean("city", "perth"), Some(15.0));
        assert_eq!(encoder.category_mean("city", "sydney"), Some(40.0));
        assert!((encoder.global_mean() - 27.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_replaces_with_means() {
        let (df, target) = train_frame();
        let mut encoder = TargetEncoder::new();
        encoder.fit(&df, &["city"], &target).unwrap();

        let encoded = encoder.transform(&df).unwrap();
        let col = encoded.column("city").unwrap().f64().unwrap();
        assert_eq!(col.get(0), Some(15.0));
        assert_eq!(col.get(2), Some(40.0));
    }

    #[test]
    fn test_unseen_category_maps_to_global_mean() {
        let (df, target) = train_frame();
        let mut encoder = TargetEncoder::new();
        encoder.fit(&df, &["city"], &target).unwrap();

        let unseen = df!("city" => &["darwin"]).unwrap();
        let encoded = encoder.transform(&unseen).unwrap();
        let col = encoded.column("city").unwrap().f64().unwrap();
        assert_eq!(col.get(0), Some(27.5));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (df, target) = train_frame();

        let mut a = TargetEncoder::new();
        a.fit(&df, &["city"], &target).unwrap();
        let mut b = TargetEncoder::new();
        b.fit(&df, &["city"], &target).unwrap();

        let json_a = serde_json::to_string(&a).unwrap();
        let json_b = serde_json::to_string(&b).unwrap();
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let encoder = TargetEncoder::new();
        let df = df!("city" => &["perth"]).unwrap();
        assert!(matches!(encoder.transform(&df), Err(CostwiseError::NotFitted)));
    }
}
