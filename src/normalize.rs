use std::collections::HashSet;
use std::path::Path;

use crate::error::{MixoError, Result};
use crate::loader::{file_label, read_raw_table, RawTable};
use crate::model::{genus_of, ObservationColumn, SurveyRow, SurveyTable};
use crate::schema::{markers, RESERVED};

/// Read and normalize a survey CSV.
pub fn load_survey(path: &Path) -> Result<SurveyTable> {
    let table = read_raw_table(path)?;
    normalize_survey(&file_label(path), &table)
}

/// Turn a raw survey sheet into one row per species observation.
///
/// Layout expected (column 0 is the phylum-like column):
///   - a row whose first cell is `Phylum` is the real header; data starts
///     two rows below it
///   - a row with empty phylum and species cells opens a phylum section,
///     the row after it carries the phylum name
///   - `Unknown flagellates` ends the survey
///   - rows containing `TOTAL` are discarded
pub fn normalize_survey(source: &str, table: &RawTable) -> Result<SurveyTable> {
    let header_row = (1..table.height())
        .find(|&r| table.cell(r, 0) == Some(markers::HEADER_ROW))
        .ok_or_else(|| MixoError::missing_marker(source, markers::HEADER_ROW))?;

    let species_col = (0..table.width())
        .find(|&c| table.cell(header_row, c) == Some(markers::SPECIES_HEADER))
        .ok_or_else(|| MixoError::missing_column(source, markers::SPECIES_HEADER))?;
    if species_col == 0 {
        return Err(MixoError::input_format(
            source,
            "species column cannot be the first column",
        ));
    }

    let data_start = header_row + markers::DATA_OFFSET;
    let end = (data_start..table.height())
        .find(|&r| table.cell(r, 0) == Some(markers::END_OF_SURVEY))
        .ok_or_else(|| MixoError::missing_marker(source, markers::END_OF_SURVEY))?;
    let last = (data_start..end)
        .rev()
        .find(|&r| !table.is_blank_row(r))
        .map_or(data_start, |r| r + 1);

    let data: Vec<usize> = (data_start..last)
        .filter(|&r| {
            !table
                .cell(r, 0)
                .is_some_and(|c| c.contains(markers::TOTALS))
        })
        .collect();

    let obs_cols: Vec<usize> = (species_col + 1..table.width())
        .filter(|&c| {
            table.cell(header_row, c).is_some()
                || table.cell(0, c).is_some()
                || data.iter().any(|&r| table.cell(r, c).is_some())
        })
        .collect();
    let columns = observation_columns(table, header_row, &obs_cols);

    let is_marker = |r: usize| table.cell(r, 0).is_none() && table.cell(r, species_col).is_none();

    let mut rows = Vec::new();
    let mut phylum: Option<String> = None;
    for (k, &r) in data.iter().enumerate() {
        if k > 0 && is_marker(data[k - 1]) {
            if let Some(name) = table.cell(r, 0) {
                phylum = Some(name.to_string());
            }
        }

        let Some(species) = table.cell(r, species_col) else {
            continue;
        };
        let Some(phylum) = phylum.as_ref() else {
            return Err(MixoError::input_format(
                source,
                format!("line {}: species '{species}' precedes the first phylum section", r + 1),
            ));
        };

        let counts = obs_cols
            .iter()
            .zip(&columns)
            .map(|(&c, column)| parse_count(source, r, column, table.cell(r, c)))
            .collect::<Result<Vec<f64>>>()?;

        let total = counts.iter().sum();
        rows.push(SurveyRow {
            phylum: phylum.clone(),
            genus: genus_of(species).to_string(),
            species: species.to_string(),
            counts,
            total,
        });
    }

    tracing::info!(
        source = %source,
        rows = rows.len(),
        observation_columns = columns.len(),
        "normalized survey"
    );

    Ok(SurveyTable {
        source: source.to_string(),
        columns,
        rows,
    })
}

/// Strip thousands separators and spaces, empty means zero. NaN and
/// infinities are rejected.
fn parse_count(
    source: &str,
    row: usize,
    column: &ObservationColumn,
    cell: Option<&str>,
) -> Result<f64> {
    let Some(raw) = cell else {
        return Ok(0.0);
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MixoError::Parse {
            file: source.to_string(),
            line: row + 1,
            column: column.name.clone(),
            value: raw.to_string(),
        }),
    }
}

fn observation_columns(table: &RawTable, header_row: usize, cols: &[usize]) -> Vec<ObservationColumn> {
    let mut taken: HashSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();

    cols.iter()
        .map(|&c| {
            let base = table
                .cell(header_row, c)
                .map(str::to_string)
                .unwrap_or_else(|| format!("column_{}", c + 1));
            let mut name = base.clone();
            let mut n = 1;
            while taken.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            taken.insert(name.clone());

            ObservationColumn {
                name,
                label: table.cell(0, c).map(str::to_string),
            }
        })
        .collect()
}
