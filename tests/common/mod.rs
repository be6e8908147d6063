#![allow(dead_code)]

use mixotrack::loader::RawTable;
use mixotrack::{ReferenceEntry, ReferenceSet, SurveyRow};

pub fn entry(name: &str, size_class: &str, length: &str, width: &str) -> ReferenceEntry {
    let some = |s: &str| (!s.is_empty()).then(|| s.to_string());
    ReferenceEntry {
        mft: Some("CM".to_string()),
        evidence: Some("feeding observed".to_string()),
        size_class: some(size_class),
        length: some(length),
        width: some(width),
        ..ReferenceEntry::new(name)
    }
}

/// A small stand-in for the Mixoplankton Database.
pub fn reference() -> ReferenceSet {
    ReferenceSet::from_entries(vec![
        entry("Akashiwo sanguinea", "micro", "50-70", "40"),
        entry("Chattonella marina", "micro", "", ""),
        entry("Dinobryon sp", "nano", "10", "10"),
        entry("Heterocapsa triquetra", "nano", "20", "16"),
        entry("Karlodinium veneficum", "nano", "12", "10"),
        entry("Prorocentrum minimum var. mariae-lebouriae", "nano", "", ""),
        entry("Tripos furca", "", "", ""),
    ])
}

pub fn row(phylum: &str, species: &str) -> SurveyRow {
    SurveyRow::new(phylum, species, vec![1.0, 2.0])
}

/// Build a table from literal cells; "" is an empty cell.
pub fn table(rows: &[&[&str]]) -> RawTable {
    RawTable::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
            .collect(),
    )
}

/// A survey laid out the way the monthly sheets are.
pub fn survey_table() -> RawTable {
    table(&[
        &["LIS phytoplankton", "", "E1 3/27/24", "H4 3/10/24"],
        &["Counts in cells/L", "", "", ""],
        &["Phylum", "Species", "Mar-A", "Mar-B"],
        &["", "", "cells/L", "cells/L"],
        &["", "", "", ""],
        &["Dinoflagellate", "", "", ""],
        &["", "Akashiwo sanguinea", "1,200", "300"],
        &["", "Karlodinium veneficum", "", "40"],
        &["", "Noctiluca-like", "5", "5"],
        &["TOTAL DINOFLAGELLATES", "", "1,545", "345"],
        &["", "", "", ""],
        &["Chrysophyte", "", "", ""],
        &["", "Ochromonas sp.", "10", "20"],
        &["", "Dinobryon balticum", "1 000", "0"],
        &["", "", "", ""],
        &["Diatom", "", "", ""],
        &["", "Skeletonema costatum", "5000", "7000"],
        &["", "", "", ""],
        &["Unknown flagellates", "", "", ""],
        &["", "flagellates < 5um", "900", "800"],
    ])
}
