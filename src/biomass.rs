use std::f64::consts::PI;

use serde::Deserialize;

use crate::model::{ClassifiedRow, EnrichedRow};
use crate::reference::ReferenceSet;
use crate::schema::allometry;

/// Cell volume in µm³ from length and width/diameter in µm.
///
/// Equal dimensions are treated as a sphere, anything else as a
/// prolate spheroid with `length` along the long axis.
pub fn cell_volume(length: f64, width: f64) -> f64 {
    let radius = width / 2.0;
    if length == width {
        4.0 / 3.0 * PI * radius.powi(3)
    } else {
        4.0 / 3.0 * PI * radius.powi(2) * (length / 2.0)
    }
}

/// Carbon biomass (pgC) of `count` cells of the given volume.
pub fn biomass_pgc(volume: f64, count: f64) -> f64 {
    volume.powf(allometry::EXPONENT) * allometry::COEFFICIENT * count
}

/// Hand-curated traits for species the database cannot supply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BiomassOverride {
    /// Matched as a substring of the row's species name.
    pub pattern: String,
    #[serde(default)]
    pub mft: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub size_class: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
}

impl BiomassOverride {
    pub fn defaults() -> Vec<BiomassOverride> {
        vec![BiomassOverride {
            pattern: "Ochromonas".to_string(),
            mft: Some("CM".to_string()),
            evidence: Some("Curator: known mixotrophic genus".to_string()),
            size_class: Some("nano".to_string()),
            length: None,
            width: None,
        }]
    }
}

/// Joins mixotroph rows with reference traits and estimates biomass.
pub struct BiomassEstimator<'a> {
    reference: &'a ReferenceSet,
    overrides: &'a [BiomassOverride],
}

impl<'a> BiomassEstimator<'a> {
    pub fn new(reference: &'a ReferenceSet, overrides: &'a [BiomassOverride]) -> Self {
        Self {
            reference,
            overrides,
        }
    }

    /// Enrich every mixotroph-status row, preserving order.
    pub fn enrich(&self, rows: &[ClassifiedRow]) -> Vec<EnrichedRow> {
        let enriched: Vec<EnrichedRow> = rows
            .iter()
            .filter(|r| r.status.is_mixotroph())
            .map(|r| self.estimate(r))
            .collect();

        let unresolved = enriched.iter().filter(|r| r.volume.is_none()).count();
        tracing::info!(
            rows = enriched.len(),
            unresolved_volume = unresolved,
            "estimated mixotroph biomass"
        );
        enriched
    }

    pub fn estimate(&self, row: &ClassifiedRow) -> EnrichedRow {
        let species = &row.row.species;

        let (mft, evidence, size_class, measured) =
            if let Some(o) = self.overrides.iter().find(|o| species.contains(&o.pattern)) {
                let measured = match (o.length, o.width) {
                    (Some(l), Some(w)) => Some(cell_volume(l, w)),
                    _ => None,
                };
                (o.mft.clone(), o.evidence.clone(), o.size_class.clone(), measured)
            } else if let Some(entry) = self.reference.get(species) {
                (
                    entry.mft.clone(),
                    entry.evidence.clone(),
                    entry.size_class.clone(),
                    entry.measured_volume(),
                )
            } else {
                (None, None, None, None)
            };

        let volume = measured.or_else(|| {
            size_class
                .as_deref()
                .and_then(|c| self.reference.size_class_volume(c))
        });
        if volume.is_none() {
            tracing::debug!(species = %species, "no volume for mixotroph row");
        }
        let biomass = volume.map(|v| biomass_pgc(v, row.row.total));

        EnrichedRow {
            classified: row.clone(),
            mft,
            evidence,
            size_class,
            volume,
            biomass,
        }
    }
}
