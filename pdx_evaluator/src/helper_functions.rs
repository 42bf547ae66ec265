use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use tracing::debug;

use crate::error::{EvalResult, EvaluationError};

/// Read a tab-separated table with a header row, keeping every column as text.
///
/// Identifiers such as model barcodes must never be reinterpreted as numbers,
/// so the dtype of every column is overwritten with `String`. A row with more
/// cells than the header is rejected rather than truncated.
pub fn read_tsv(path: &Path) -> EvalResult<DataFrame> {
    if !path.exists() {
        return Err(EvaluationError::malformed(path, "file not found"));
    }

    let header_fields = {
        let file = File::open(path)
            .map_err(|e| EvaluationError::malformed(path, format!("unreadable: {e}")))?;
        let mut rdr = BufReader::new(file);
        let mut hdr = String::new();
        rdr.read_line(&mut hdr)
            .map_err(|e| EvaluationError::malformed(path, format!("unreadable: {e}")))?;
        let hdr = hdr.trim_end_matches(&['\r', '\n'][..]);
        if hdr.is_empty() {
            return Err(EvaluationError::malformed(path, "empty file, no header row"));
        }
        hdr.split('\t').count()
    };
    let dtype_override: Arc<Vec<DataType>> = Arc::new(vec![DataType::String; header_fields]);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_dtype_overwrite(Some(dtype_override))
        .map_parse_options(|mut o| {
            o.separator = b'\t';
            o.truncate_ragged_lines = false;
            o
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| EvaluationError::malformed(path, format!("unreadable: {e}")))?;

    debug!("Read {} rows x {} cols from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Fail with the full list of absent columns, not just the first one.
pub fn require_columns(df: &DataFrame, path: &Path, required: &[&str]) -> EvalResult<()> {
    let present = df.get_column_names();
    let missing: Vec<String> = required
        .iter()
        .filter(|&&name| !present.iter().any(|c| c.as_str() == name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EvaluationError::missing_columns(path, missing))
    }
}

/// Text cells of one column, verbatim; only empty cells come back as `None`.
///
/// Identifiers are joined on their exact text, so padding is never stripped.
pub fn text_column(df: &DataFrame, name: &str) -> EvalResult<Vec<Option<String>>> {
    let values = df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.filter(|s| !s.is_empty()).map(str::to_owned))
        .collect();
    Ok(values)
}

/// Numeric cells of one column; any empty or non-finite cell is a malformed input.
pub fn numeric_column(df: &DataFrame, name: &str, path: &Path) -> EvalResult<Vec<f64>> {
    text_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            let cell = cell.ok_or_else(|| {
                EvaluationError::malformed(path, format!("empty value in column '{name}' at row {}", row + 1))
            })?;
            match cell.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(EvaluationError::malformed(
                    path,
                    format!("non-numeric value '{cell}' in column '{name}' at row {}", row + 1),
                )),
            }
        })
        .collect()
}

pub fn ensure_dir(path: &Path) -> EvalResult<()> {
    if !path.exists() {
        create_dir_all(path)?;
    }
    Ok(())
}

pub fn write_tsv(df: &mut DataFrame, path: &Path) -> EvalResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// Write `contents` to `name` inside `dir` and return the full path.
    pub fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }
}
