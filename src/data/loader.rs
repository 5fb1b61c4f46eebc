//! CSV loading and writing

use crate::error::{CostwiseError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader/writer for the pipeline's CSV tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a headered CSV with schema inference.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| CostwiseError::DataError(format!("{}: {}", path.display(), e)))?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| CostwiseError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Write a DataFrame to a headered CSV, creating parent directories.
    pub fn write_csv(&self, df: &DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)
            .map_err(|e| CostwiseError::DataError(format!("{}: {}", path.display(), e)))?;

        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| CostwiseError::DataError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}
