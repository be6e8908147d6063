use std::path::Path;

use polars::prelude::*;

use crate::error::{MixoError, Result};

/// A headerless spreadsheet, cell for cell.
///
/// Cells are trimmed and empty cells are `None`. Rows are padded to a
/// common width so positional lookups never go out of bounds.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    rows: Vec<Vec<Option<String>>>,
    width: usize,
}

impl RawTable {
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row.into_iter()
                    .map(|cell| cell.and_then(|c| clean_cell(&c)))
                    .collect()
            })
            .collect();
        Self { rows, width }
    }

    /// Convert an all-string DataFrame (as produced by [`read_raw_table`]).
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let height = df.height();
        let mut rows: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(df.width()); height];

        for column in df.get_columns() {
            let values = column.str()?;
            for (i, value) in values.into_iter().enumerate() {
                rows[i].push(value.map(|v| v.to_string()));
            }
        }

        Ok(Self::from_rows(rows))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, index: usize) -> &[Option<String>] {
        &self.rows[index]
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows[row].iter().all(|c| c.is_none())
    }
}

fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// File name of `path` for error context, falling back to the whole path.
pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a CSV file with no header and every column as String dtype.
///
/// The width comes from the first line. A later line with more fields is an
/// input-format error rather than being cut.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0)) // all columns as String
        .map_parse_options(|opts| opts.with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .map_err(|e| MixoError::input_format(&file_label(path), e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read raw table"
    );

    RawTable::from_frame(&df)
}
