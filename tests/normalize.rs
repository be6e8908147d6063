mod common;

use std::fs;

use mixotrack::loader::read_raw_table;
use mixotrack::normalize::{load_survey, normalize_survey};
use mixotrack::MixoError;
use tempfile::TempDir;

use common::{survey_table, table};

#[test]
fn survey_rows_are_resolved() {
    let survey = normalize_survey("march.csv", &survey_table()).unwrap();

    let species: Vec<&str> = survey.rows.iter().map(|r| r.species.as_str()).collect();
    assert_eq!(
        species,
        vec![
            "Akashiwo sanguinea",
            "Karlodinium veneficum",
            "Noctiluca-like",
            "Ochromonas sp.",
            "Dinobryon balticum",
            "Skeletonema costatum",
        ]
    );

    let phyla: Vec<&str> = survey.rows.iter().map(|r| r.phylum.as_str()).collect();
    assert_eq!(
        phyla,
        vec![
            "Dinoflagellate",
            "Dinoflagellate",
            "Dinoflagellate",
            "Chrysophyte",
            "Chrysophyte",
            "Diatom",
        ]
    );

    assert_eq!(survey.rows[0].genus, "Akashiwo");
    assert_eq!(survey.rows[3].genus, "Ochromonas");
}

#[test]
fn counts_are_cleaned_and_totalled() {
    let survey = normalize_survey("march.csv", &survey_table()).unwrap();

    let akashiwo = &survey.rows[0];
    assert_eq!(akashiwo.counts, vec![1200.0, 300.0]);
    assert_eq!(akashiwo.total, 1500.0);

    // empty cell is zero
    assert_eq!(survey.rows[1].counts, vec![0.0, 40.0]);
    // space used as thousands separator
    assert_eq!(survey.rows[4].counts, vec![1000.0, 0.0]);
}

#[test]
fn totals_and_trailing_sections_are_dropped() {
    let survey = normalize_survey("march.csv", &survey_table()).unwrap();
    assert!(survey.rows.iter().all(|r| !r.phylum.contains("TOTAL")));
    assert!(survey.rows.iter().all(|r| !r.species.contains("flagellates")));
}

#[test]
fn observation_columns_keep_both_header_tiers() {
    let survey = normalize_survey("march.csv", &survey_table()).unwrap();
    assert_eq!(survey.columns.len(), 2);
    assert_eq!(survey.columns[0].name, "Mar-A");
    assert_eq!(survey.columns[0].label.as_deref(), Some("E1 3/27/24"));
    assert_eq!(survey.columns[1].label.as_deref(), Some("H4 3/10/24"));
}

#[test]
fn duplicate_and_reserved_column_names_are_renamed() {
    let t = table(&[
        &["", "", "", "", ""],
        &["Phylum", "Species", "Total", "A", "A"],
        &["", "", "", "", ""],
        &["", "", "", "", ""],
        &["Ciliate", "", "", "", ""],
        &["", "Mesodinium rubrum", "1", "2", "3"],
        &["Unknown flagellates", "", "", "", ""],
    ]);
    let survey = normalize_survey("s.csv", &t).unwrap();
    let names: Vec<&str> = survey.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Total.1", "A", "A.1"]);
    assert_eq!(survey.rows[0].total, 6.0);
}

#[test]
fn missing_header_marker_is_fatal() {
    let t = table(&[
        &["", "", ""],
        &["Taxon", "Species", "A"],
        &["Unknown flagellates", "", ""],
    ]);
    match normalize_survey("bad.csv", &t) {
        Err(MixoError::MissingMarker { file, marker }) => {
            assert_eq!(file, "bad.csv");
            assert_eq!(marker, "Phylum");
        }
        other => panic!("expected missing marker, got {other:?}"),
    }
}

#[test]
fn missing_end_marker_is_fatal() {
    let t = table(&[
        &["", "", ""],
        &["Phylum", "Species", "A"],
        &["", "", ""],
        &["", "", ""],
        &["Ciliate", "", ""],
        &["", "Mesodinium rubrum", "4"],
    ]);
    let err = normalize_survey("bad.csv", &t).unwrap_err();
    assert!(matches!(err, MixoError::MissingMarker { ref marker, .. } if marker == "Unknown flagellates"));
}

#[test]
fn unparseable_count_is_fatal() {
    let t = table(&[
        &["", "", ""],
        &["Phylum", "Species", "A"],
        &["", "", ""],
        &["", "", ""],
        &["Ciliate", "", ""],
        &["", "Mesodinium rubrum", "12a"],
        &["Unknown flagellates", "", ""],
    ]);
    match normalize_survey("bad.csv", &t) {
        Err(MixoError::Parse { line, column, value, .. }) => {
            assert_eq!(line, 6);
            assert_eq!(column, "A");
            assert_eq!(value, "12a");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn non_finite_count_is_fatal() {
    for bad in ["NaN", "inf", "-infinity"] {
        let t = table(&[
            &["", "", ""],
            &["Phylum", "Species", "A"],
            &["", "", ""],
            &["", "", ""],
            &["Ciliate", "", ""],
            &["", "Mesodinium rubrum", bad],
            &["Unknown flagellates", "", ""],
        ]);
        match normalize_survey("bad.csv", &t) {
            Err(MixoError::Parse { value, .. }) => assert_eq!(value, bad),
            other => panic!("expected parse error for {bad}, got {other:?}"),
        }
    }
}

#[test]
fn line_wider_than_first_line_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ragged.csv");
    let content = "\
LIS phytoplankton,,E1 3/27/24
Phylum,Species,Mar-A
,,cells/L
,,
Ciliate,,
,Mesodinium rubrum,5,999
Unknown flagellates,,
";
    fs::write(&path, content).unwrap();

    match load_survey(&path) {
        Err(MixoError::InputFormat { file, .. }) => assert_eq!(file, "ragged.csv"),
        other => panic!("expected input format error, got {other:?}"),
    }
}

#[test]
fn species_before_any_phylum_is_fatal() {
    let t = table(&[
        &["", "", ""],
        &["Phylum", "Species", "A"],
        &["", "", ""],
        &["Ciliate", "Mesodinium rubrum", "1"],
        &["Unknown flagellates", "", ""],
    ]);
    let err = normalize_survey("bad.csv", &t).unwrap_err();
    assert!(matches!(err, MixoError::InputFormat { .. }));
}

#[test]
fn csv_file_round_trip_through_loader() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("2024_03.csv");
    let content = "\
LIS phytoplankton,,E1 3/27/24
,,
Phylum,Species,Mar-A
,,cells/L
,,
Dinoflagellate,,
,Akashiwo sanguinea,\"1,200\"
,,
Unknown flagellates,,
";
    fs::write(&path, content).unwrap();

    let raw = read_raw_table(&path).unwrap();
    assert_eq!(raw.width(), 3);
    assert_eq!(raw.cell(2, 0), Some("Phylum"));

    let survey = load_survey(&path).unwrap();
    assert_eq!(survey.source, "2024_03.csv");
    assert_eq!(survey.rows.len(), 1);
    assert_eq!(survey.rows[0].total, 1200.0);
    assert_eq!(survey.rows[0].phylum, "Dinoflagellate");
}
