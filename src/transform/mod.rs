//! Data transformation: imputation, target encoding, scaling.
//!
//! Everything here is fit on the training split only and replayed verbatim
//! on the test split and at inference time.

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::TargetEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::{DataTransformation, TransformOutput};
pub use scaler::StandardScaler;

use crate::error::{CostwiseError, Result};
use crate::schema;
use ndarray::Array2;
use polars::prelude::*;

/// Extract the schema's feature columns from a frame into a row-major
/// `Array2<f64>`, in schema order regardless of the frame's column order.
///
/// Every feature column must already be numeric (categoricals encoded first).
pub fn to_feature_array(df: &DataFrame) -> Result<Array2<f64>> {
    columns_to_array(df, &schema::FEATURE_COLUMNS)
}

/// Extract named columns into a row-major `Array2<f64>`.
pub fn columns_to_array(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df.column(col_name).map_err(|_| CostwiseError::SchemaMismatch {
                expected: format!("column '{}'", col_name),
                actual: "missing column".to_string(),
            })?;
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| CostwiseError::DataError(e.to_string()))?;
            let values: Vec<f64> = casted
                .f64()
                .map_err(|e| CostwiseError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}
