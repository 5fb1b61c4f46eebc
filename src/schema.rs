//! Fixed column schema for construction-cost records.
//!
//! Column order and names must match exactly between training and inference;
//! every consumer goes through this module instead of carrying its own list.

use crate::error::{CostwiseError, Result};
use polars::prelude::*;

/// Target column predicted by the pipeline.
pub const TARGET_COLUMN: &str = "Total";

/// Auxiliary attribute present in raw data, dropped at transformation time.
pub const AUX_COLUMN: &str = "Attribute 4";

/// Feature columns, in the order the model consumes them.
pub const FEATURE_COLUMNS: [&str; 37] = [
    "Commodity Code",
    "Item Description",
    "Qty",
    "PE Amount",
    "BM Amount",
    "LB hrs",
    "LB Amount",
    "CE Amount",
    "Major SC Amount",
    "Fuel usage (L)",
    "Attribute 1",
    "Attribute 2",
    "Attribute 3",
    "project_number",
    "total_new",
    "Single Unit Price",
    "epic_embodied_carbon",
    "aus_lci_embodied_carbon",
    "carbon_allowance",
    "construction_carbon",
    "Default PE Unit Price",
    "Default BM Unit Price",
    "Default LB Unit Hrs",
    "Default SC Unit Rate",
    "Project Name",
    "Greenfield/ Brownfield",
    "Client",
    "Market Sector/Industry",
    "Latitude",
    "Longitude",
    "Delivery Method",
    "Item Type",
    "Flag",
    "coordinates",
    "state",
    "city",
    "suburb",
];

/// Columns encoded as categories rather than parsed as numbers.
pub const CATEGORICAL_COLUMNS: [&str; 12] = [
    "Commodity Code",
    "Item Description",
    "Project Name",
    "Greenfield/ Brownfield",
    "Client",
    "Market Sector/Industry",
    "Delivery Method",
    "Item Type",
    "coordinates",
    "state",
    "city",
    "suburb",
];

/// Whether a feature column holds categorical data.
pub fn is_categorical(name: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&name)
}

/// Feature columns that hold numeric data, in schema order.
pub fn numeric_feature_columns() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !is_categorical(c))
        .collect()
}

/// Split a comma-separated request payload into raw field values.
pub fn split_payload(payload: &str) -> Vec<String> {
    payload.split(',').map(|s| s.trim().to_string()).collect()
}

/// Zip positional values into a one-row DataFrame matching [`FEATURE_COLUMNS`].
///
/// Categorical columns stay strings; numeric columns must parse as f64.
/// A wrong value count or an unparseable number is a [`CostwiseError::SchemaMismatch`].
pub fn row_from_values(values: &[String]) -> Result<DataFrame> {
    if values.len() != FEATURE_COLUMNS.len() {
        return Err(CostwiseError::SchemaMismatch {
            expected: format!("{} feature values", FEATURE_COLUMNS.len()),
            actual: format!("{} values", values.len()),
        });
    }

    let mut columns = Vec::with_capacity(FEATURE_COLUMNS.len());
    for (name, value) in FEATURE_COLUMNS.iter().zip(values.iter()) {
        if is_categorical(name) {
            columns.push(Column::new((*name).into(), &[value.as_str()]));
        } else {
            let parsed: f64 = value.parse().map_err(|_| CostwiseError::SchemaMismatch {
                expected: format!("numeric value for column '{}'", name),
                actual: format!("'{}'", value),
            })?;
            columns.push(Column::new((*name).into(), &[parsed]));
        }
    }

    DataFrame::new(columns).map_err(|e| CostwiseError::DataError(e.to_string()))
}

/// Flatten a JSON `data` array into string values for [`row_from_values`].
pub fn values_from_json(items: &[serde_json::Value]) -> Result<Vec<String>> {
    items
        .iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s.clone()),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => Err(CostwiseError::SchemaMismatch {
                expected: "string or number in data array".to_string(),
                actual: other.to_string(),
            }),
        })
        .collect()
}
