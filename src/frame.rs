//! Polars views of classified and enriched rows.

use polars::prelude::*;

use crate::error::Result;
use crate::model::{ClassifiedRow, EnrichedRow, ObservationColumn};
use crate::schema::{enriched, survey};

/// Status, Phylum, Genus, Species, Total, then one Float64 column per observation.
pub fn classified_frame(
    columns: &[ObservationColumn],
    rows: &[ClassifiedRow],
) -> Result<DataFrame> {
    let mut out = text_columns(rows.iter());
    out.push(Column::new(
        survey::TOTAL.into(),
        rows.iter().map(|r| r.row.total).collect::<Vec<f64>>(),
    ));
    out.extend(observation_series(columns, rows.iter()));
    Ok(DataFrame::new(out)?)
}

/// Classified columns plus MFT, Evidence, Size Class, Volume and Total Biomass.
/// Observations stay last.
pub fn enriched_frame(columns: &[ObservationColumn], rows: &[EnrichedRow]) -> Result<DataFrame> {
    let mut out = text_columns(rows.iter().map(|r| &r.classified));

    let traits: [(&str, fn(&EnrichedRow) -> Option<&str>); 3] = [
        (enriched::MFT, |r| r.mft.as_deref()),
        (enriched::EVIDENCE, |r| r.evidence.as_deref()),
        (enriched::SIZE_CLASS, |r| r.size_class.as_deref()),
    ];
    for (name, get) in traits {
        let values: Vec<Option<&str>> = rows.iter().map(get).collect();
        out.push(Column::new(name.into(), values));
    }

    out.push(Column::new(
        survey::TOTAL.into(),
        rows.iter().map(|r| r.classified.row.total).collect::<Vec<f64>>(),
    ));
    out.push(Column::new(
        enriched::VOLUME.into(),
        rows.iter().map(|r| r.volume).collect::<Vec<Option<f64>>>(),
    ));
    out.push(Column::new(
        enriched::BIOMASS.into(),
        rows.iter().map(|r| r.biomass).collect::<Vec<Option<f64>>>(),
    ));
    out.extend(observation_series(columns, rows.iter().map(|r| &r.classified)));

    Ok(DataFrame::new(out)?)
}

fn text_columns<'r>(rows: impl Iterator<Item = &'r ClassifiedRow> + Clone) -> Vec<Column> {
    let status: Vec<&str> = rows.clone().map(|r| r.status.as_str()).collect();
    let phylum: Vec<&str> = rows.clone().map(|r| r.row.phylum.as_str()).collect();
    let genus: Vec<&str> = rows.clone().map(|r| r.row.genus.as_str()).collect();
    let species: Vec<&str> = rows.map(|r| r.row.species.as_str()).collect();

    vec![
        Column::new(survey::STATUS.into(), status),
        Column::new(survey::PHYLUM.into(), phylum),
        Column::new(survey::GENUS.into(), genus),
        Column::new(survey::SPECIES.into(), species),
    ]
}

fn observation_series<'r>(
    columns: &[ObservationColumn],
    rows: impl Iterator<Item = &'r ClassifiedRow> + Clone,
) -> Vec<Column> {
    columns
        .iter()
        .enumerate()
        .map(|(j, column)| {
            let values: Vec<f64> = rows.clone().map(|r| r.row.counts[j]).collect();
            Column::new(column.name.as_str().into(), values)
        })
        .collect()
}
