use std::collections::HashMap;

use serde::Deserialize;

use crate::model::{
    ClassifiedRow, ExcludedRow, ExclusionReason, MatchBasis, Status, SurveyRow,
};
use crate::reference::ReferenceSet;

/// Species keywords that remove a row from classification.
const EXCLUDED_KEYWORDS: [&str; 3] = ["unknown", "other", "cysts"];
const LIKE_MARKER: &str = "-like";
const UNSPECIFIED_MARKERS: [&str; 2] = ["sp.", "spp."];

/// Curator-supplied names that bypass the matching rules.
///
/// Every entry is matched as a case-sensitive substring of the species name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub mixotroph_genera: Vec<String>,
    pub mixotroph_species: Vec<String>,
    pub zooplankton_genera: Vec<String>,
    pub zooplankton_species: Vec<String>,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            mixotroph_genera: vec!["Ochromonas".to_string()],
            mixotroph_species: Vec::new(),
            zooplankton_genera: vec!["Protoperidinium".to_string()],
            zooplankton_species: Vec::new(),
        }
    }
}

impl Overrides {
    /// No overrides at all.
    pub fn none() -> Self {
        Self {
            mixotroph_genera: Vec::new(),
            mixotroph_species: Vec::new(),
            zooplankton_genera: Vec::new(),
            zooplankton_species: Vec::new(),
        }
    }

    /// Status forced on a species, if any override names it.
    ///
    /// Mixotroph overrides apply first and zooplankton overrides second, so a
    /// species named by both ends up zooplankton.
    pub fn verdict(&self, species: &str) -> Option<Status> {
        let names = |list: &[String]| list.iter().any(|n| species.contains(n.as_str()));

        let mixotroph = names(&self.mixotroph_genera) || names(&self.mixotroph_species);
        let zooplankton = names(&self.zooplankton_genera) || names(&self.zooplankton_species);

        match (mixotroph, zooplankton) {
            (true, true) => {
                tracing::warn!(
                    species = %species,
                    "species matches both mixotroph and zooplankton overrides, using zooplankton"
                );
                Some(Status::Zooplankton)
            }
            (false, true) => Some(Status::Zooplankton),
            (true, false) => Some(Status::Mixoplankton),
            (false, false) => None,
        }
    }

    /// Every override string, for auditing.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mixotroph_genera
            .iter()
            .chain(&self.mixotroph_species)
            .chain(&self.zooplankton_genera)
            .chain(&self.zooplankton_species)
            .map(String::as_str)
    }
}

/// First-phase verdict on a row, before any reference lookup.
#[derive(Debug, Clone, PartialEq)]
enum RowState {
    Excluded(ExclusionReason),
    Candidate,
}

fn exclusion(row: &SurveyRow, excluded_phyla: &[String]) -> RowState {
    let species = row.species.as_str();
    if let Some(&keyword) = EXCLUDED_KEYWORDS.iter().find(|k| species.contains(**k)) {
        return RowState::Excluded(ExclusionReason::Keyword(keyword));
    }
    if species.contains(LIKE_MARKER) {
        return RowState::Excluded(ExclusionReason::LikeName);
    }
    if UNSPECIFIED_MARKERS.iter().any(|m| species.contains(*m)) {
        return RowState::Excluded(ExclusionReason::Unspecified);
    }
    if excluded_phyla.iter().any(|p| p == &row.phylum) {
        return RowState::Excluded(ExclusionReason::Phylum(row.phylum.clone()));
    }
    RowState::Candidate
}

/// Is `species` contained in some longer reference name?
pub fn is_substring_of_any_reference(species: &str, names: &[String]) -> bool {
    names.iter().any(|name| name.contains(species))
}

/// Is some reference name contained in `species`?
pub fn reference_is_substring_of(species: &str, names: &[String]) -> bool {
    names.iter().any(|name| species.contains(name.as_str()))
}

/// Output of one classification run.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Surviving rows in survey order, each with a terminal status.
    pub rows: Vec<ClassifiedRow>,
    pub excluded: Vec<ExcludedRow>,
}

impl Classification {
    pub fn count(&self, status: Status) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    pub fn mixotrophs(&self) -> impl Iterator<Item = &ClassifiedRow> {
        self.rows.iter().filter(|r| r.status.is_mixotroph())
    }
}

/// Rule cascade assigning each survey row a [`Status`].
pub struct Classifier<'a> {
    reference: &'a ReferenceSet,
    overrides: &'a Overrides,
    excluded_phyla: &'a [String],
}

impl<'a> Classifier<'a> {
    pub fn new(reference: &'a ReferenceSet, overrides: &'a Overrides) -> Self {
        Self {
            reference,
            overrides,
            excluded_phyla: &[],
        }
    }

    pub fn with_excluded_phyla(mut self, phyla: &'a [String]) -> Self {
        self.excluded_phyla = phyla;
        self
    }

    pub fn classify(&self, rows: &[SurveyRow]) -> Classification {
        // Phase one: exclusion and overrides, both judged on the unfiltered rows.
        let mut excluded = Vec::new();
        let mut candidates: Vec<(usize, Option<(Status, MatchBasis)>)> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let forced = self.overrides.verdict(&row.species);
            match (exclusion(row, self.excluded_phyla), forced) {
                (_, Some(status)) => candidates.push((i, Some((status, MatchBasis::Override)))),
                (RowState::Excluded(reason), None) => excluded.push(ExcludedRow {
                    reason,
                    source_index: i,
                    row: row.clone(),
                }),
                (RowState::Candidate, None) => candidates.push((i, None)),
            }
        }

        // Phase two: reference passes over rows still unset, first match wins.
        let names = self.reference.names();

        self.pass(rows, &mut candidates, Status::Mixoplankton, MatchBasis::Exact, |row| {
            self.reference.contains(&row.species)
        });

        let mut genus_hits: HashMap<&str, bool> = HashMap::new();
        for (i, slot) in candidates.iter_mut() {
            if slot.is_some() {
                continue;
            }
            let genus = rows[*i].genus.as_str();
            let hit = *genus_hits
                .entry(genus)
                .or_insert_with(|| self.reference.contains(&format!("{genus} sp.")));
            if hit {
                *slot = Some((Status::UnsureSpInMdb, MatchBasis::GenusSp));
            }
        }

        self.pass(
            rows,
            &mut candidates,
            Status::UnsureInexactName,
            MatchBasis::RowInReference,
            |row| is_substring_of_any_reference(&row.species, names),
        );
        self.pass(
            rows,
            &mut candidates,
            Status::UnsureInexactName,
            MatchBasis::ReferenceInRow,
            |row| reference_is_substring_of(&row.species, names),
        );

        let classified: Vec<ClassifiedRow> = candidates
            .into_iter()
            .map(|(i, slot)| {
                let (status, basis) = slot.unwrap_or((Status::Phytoplankton, MatchBasis::Default));
                ClassifiedRow {
                    status,
                    basis,
                    source_index: i,
                    row: rows[i].clone(),
                }
            })
            .collect();

        let result = Classification {
            rows: classified,
            excluded,
        };
        tracing::info!(
            mixoplankton = result.count(Status::Mixoplankton),
            unsure_sp = result.count(Status::UnsureSpInMdb),
            unsure_inexact = result.count(Status::UnsureInexactName),
            zooplankton = result.count(Status::Zooplankton),
            phytoplankton = result.count(Status::Phytoplankton),
            excluded = result.excluded.len(),
            "classified survey rows"
        );
        result
    }

    fn pass(
        &self,
        rows: &[SurveyRow],
        candidates: &mut [(usize, Option<(Status, MatchBasis)>)],
        status: Status,
        basis: MatchBasis,
        matches: impl Fn(&SurveyRow) -> bool,
    ) {
        for (i, slot) in candidates.iter_mut() {
            if slot.is_none() && matches(&rows[*i]) {
                *slot = Some((status, basis));
            }
        }
    }
}
