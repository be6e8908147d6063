use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use polars::prelude::*;
use serde::Deserialize;

use crate::error::{MixoError, Result};
use crate::model::ObservationColumn;
use crate::schema::survey;

/// How many header tiers a rendered report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
    /// Original top label over each column name.
    #[default]
    TwoTier,
    /// Month, station and date above each column name.
    ThreeTier,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportRow {
    Detail(Vec<Cell>),
    Total(Vec<Cell>),
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportColumn {
    pub name: String,
    /// Top-tier label; only observation columns carry one.
    pub label: Option<String>,
}

/// Detail rows interleaved with per-phylum totals and separators.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<ReportRow>,
}

/// Interleave `detail` rows with the matching rows of `totals`.
///
/// `totals` must be the output of [`crate::aggregation::phylum_totals`] over
/// `detail`, so its rows follow the order phyla first appear in `detail`.
pub fn assemble(
    detail: &DataFrame,
    totals: &DataFrame,
    observations: &[ObservationColumn],
) -> Result<Report> {
    let columns: Vec<ReportColumn> = detail
        .get_column_names_str()
        .iter()
        .map(|name| ReportColumn {
            name: name.to_string(),
            label: observations
                .iter()
                .find(|o| o.name == *name)
                .and_then(|o| o.label.clone()),
        })
        .collect();

    let phyla: Vec<&str> = detail
        .column(survey::PHYLUM)?
        .str()?
        .into_iter()
        .map(|p| p.unwrap_or_default())
        .collect();

    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (i, &phylum) in phyla.iter().enumerate() {
        match groups.iter().position(|(p, _)| *p == phylum) {
            Some(g) => groups[g].1.push(i),
            None => groups.push((phylum, vec![i])),
        }
    }
    if groups.len() != totals.height() {
        return Err(MixoError::General(format!(
            "{} phylum groups but {} totals rows",
            groups.len(),
            totals.height()
        )));
    }

    let mut rows = Vec::with_capacity(detail.height() + 2 * groups.len());
    for (g, (_, members)) in groups.iter().enumerate() {
        for &i in members {
            rows.push(ReportRow::Detail(row_cells(detail, &columns, i)?));
        }
        rows.push(ReportRow::Total(row_cells(totals, &columns, g)?));
        rows.push(ReportRow::Blank);
    }

    Ok(Report { columns, rows })
}

/// Cells of one frame row laid out along `columns`; absent columns are empty.
fn row_cells(frame: &DataFrame, columns: &[ReportColumn], row: usize) -> Result<Vec<Cell>> {
    columns
        .iter()
        .map(|c| -> Result<Cell> {
            match frame.column(&c.name) {
                Ok(column) => Ok(to_cell(column.get(row)?)),
                Err(_) => Ok(Cell::Empty),
            }
        })
        .collect()
}

fn to_cell(value: AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => Cell::Empty,
        AnyValue::String(s) => Cell::Text(s.to_string()),
        AnyValue::StringOwned(s) => Cell::Text(s.to_string()),
        AnyValue::Float64(v) => Cell::Number(v),
        other => Cell::Text(other.to_string()),
    }
}

impl Report {
    /// Header rows, top tier first; the last tier is always the column names.
    pub fn header_tiers(&self, layout: HeaderLayout) -> Vec<Vec<String>> {
        let names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        match layout {
            HeaderLayout::TwoTier => {
                let labels = self
                    .columns
                    .iter()
                    .map(|c| c.label.clone().unwrap_or_default())
                    .collect();
                vec![labels, names]
            }
            HeaderLayout::ThreeTier => {
                let mut months = Vec::with_capacity(names.len());
                let mut stations = Vec::with_capacity(names.len());
                let mut dates = Vec::with_capacity(names.len());
                for column in &self.columns {
                    let parsed = column
                        .label
                        .as_deref()
                        .and_then(parse_sampling_label)
                        .or_else(|| parse_sampling_label(&column.name));
                    match parsed {
                        Some(l) => {
                            months.push(l.month);
                            stations.push(l.station);
                            dates.push(l.date);
                        }
                        None => {
                            months.push(String::new());
                            stations.push(column.label.clone().unwrap_or_default());
                            dates.push(String::new());
                        }
                    }
                }
                vec![months, stations, dates, names]
            }
        }
    }

    /// Render header tiers and rows into an all-string frame for writing
    /// without a polars header.
    pub fn to_frame(&self, layout: HeaderLayout) -> Result<DataFrame> {
        let tiers = self.header_tiers(layout);
        let blank = vec![Cell::Empty; self.columns.len()];

        let columns = (0..self.columns.len())
            .map(|j| {
                let mut values: Vec<String> = tiers.iter().map(|t| t[j].clone()).collect();
                for row in &self.rows {
                    let cells = match row {
                        ReportRow::Detail(cells) | ReportRow::Total(cells) => cells,
                        ReportRow::Blank => &blank,
                    };
                    values.push(cells[j].to_string());
                }
                Column::new(format!("column_{}", j + 1).into(), values)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    pub fn detail_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, ReportRow::Detail(_)))
            .count()
    }
}

/// Top-tier label decomposed for the three-tier header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingLabel {
    pub month: String,
    pub station: String,
    pub date: String,
}

/// Sampling month of a date: days from the 26th on count toward the next month.
pub fn sampling_month(date: NaiveDate) -> Month {
    let month = Month::try_from(date.month() as u8).unwrap_or(Month::January);
    if date.day() >= 26 {
        month.succ()
    } else {
        month
    }
}

/// Parse a "M/D/YY" or "M/D/YYYY" token.
pub fn parse_survey_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim_matches(|c: char| !c.is_ascii_digit());
    let mut parts = token.split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Split a label such as "E1 3/27/24" into month, station and date.
///
/// The first date-like token is the date; the remaining tokens form the
/// station code. Labels without a date yield `None`.
pub fn parse_sampling_label(label: &str) -> Option<SamplingLabel> {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    let (pos, date) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| parse_survey_date(t).map(|d| (i, d)))?;

    let station = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(_, t)| *t)
        .collect::<Vec<_>>()
        .join(" ");

    Some(SamplingLabel {
        month: sampling_month(date).name().to_string(),
        station,
        date: tokens[pos].to_string(),
    })
}
