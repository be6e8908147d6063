use std::fmt;

use crate::schema::status;

/// One observation column of a survey: a (station, date) count series.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationColumn {
    /// Bottom-tier name, taken from the `Phylum` header row.
    pub name: String,
    /// Top-tier label, taken from the first line of the file.
    pub label: Option<String>,
}

/// A normalized survey row: one species observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    pub phylum: String,
    pub genus: String,
    pub species: String,
    /// Counts aligned with [`SurveyTable::columns`].
    pub counts: Vec<f64>,
    pub total: f64,
}

impl SurveyRow {
    /// Build a row, deriving genus and total.
    pub fn new(phylum: impl Into<String>, species: impl Into<String>, counts: Vec<f64>) -> Self {
        let species = species.into();
        let genus = genus_of(&species).to_string();
        let total = counts.iter().sum();
        Self {
            phylum: phylum.into(),
            genus,
            species,
            counts,
            total,
        }
    }
}

/// First whitespace-delimited token of a species name.
pub fn genus_of(species: &str) -> &str {
    species.split_whitespace().next().unwrap_or("")
}

/// A survey spreadsheet after normalization.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    /// Name of the file the survey came from, used in diagnostics.
    pub source: String,
    pub columns: Vec<ObservationColumn>,
    pub rows: Vec<SurveyRow>,
}

/// Terminal classification of a surviving survey row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Mixoplankton,
    UnsureSpInMdb,
    UnsureInexactName,
    Zooplankton,
    Phytoplankton,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Mixoplankton,
        Status::UnsureSpInMdb,
        Status::UnsureInexactName,
        Status::Zooplankton,
        Status::Phytoplankton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Mixoplankton => status::MIXOPLANKTON,
            Status::UnsureSpInMdb => status::UNSURE_SP_IN_MDB,
            Status::UnsureInexactName => status::UNSURE_INEXACT_NAME,
            Status::Zooplankton => status::ZOOPLANKTON,
            Status::Phytoplankton => status::PHYTOPLANKTON,
        }
    }

    /// Confirmed or possible mixotroph.
    pub fn is_mixotroph(&self) -> bool {
        matches!(
            self,
            Status::Mixoplankton | Status::UnsureSpInMdb | Status::UnsureInexactName
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule assigned a row its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBasis {
    Override,
    Exact,
    GenusSp,
    RowInReference,
    ReferenceInRow,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub status: Status,
    pub basis: MatchBasis,
    /// Position of the row in the normalized survey.
    pub source_index: usize,
    pub row: SurveyRow,
}

/// Why a row was dropped before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Species contains one of "unknown", "other", "cysts".
    Keyword(&'static str),
    /// Species contains "-like".
    LikeName,
    /// Species contains "sp." or "spp.".
    Unspecified,
    /// Phylum is configured as never mixotrophic.
    Phylum(String),
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Keyword(k) => write!(f, "contains '{k}'"),
            ExclusionReason::LikeName => f.write_str("'-like' name"),
            ExclusionReason::Unspecified => f.write_str("unspecified species (sp./spp.)"),
            ExclusionReason::Phylum(p) => write!(f, "excluded phylum '{p}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedRow {
    pub reason: ExclusionReason,
    pub source_index: usize,
    pub row: SurveyRow,
}

/// A mixotroph row joined with reference traits and biomass.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub classified: ClassifiedRow,
    pub mft: Option<String>,
    pub evidence: Option<String>,
    pub size_class: Option<String>,
    /// Per-cell volume in µm³; `None` when unmeasured.
    pub volume: Option<f64>,
    /// Total biomass in pgC; `None` whenever volume is.
    pub biomass: Option<f64>,
}
