mod common;

use mixotrack::aggregation::phylum_totals;
use mixotrack::biomass::{BiomassEstimator, BiomassOverride};
use mixotrack::frame::enriched_frame;
use mixotrack::normalize::normalize_survey;
use mixotrack::report::{assemble, Cell, HeaderLayout, Report, ReportRow};
use mixotrack::schema::{enriched, survey};
use mixotrack::{Classifier, Overrides};

use common::{reference, survey_table};

fn march_report() -> Report {
    let table = normalize_survey("march.csv", &survey_table()).unwrap();
    let reference = reference();
    let overrides = Overrides::default();
    let classification = Classifier::new(&reference, &overrides).classify(&table.rows);
    let biomass_overrides = BiomassOverride::defaults();
    let rows = BiomassEstimator::new(&reference, &biomass_overrides).enrich(&classification.rows);

    let detail = enriched_frame(&table.columns, &rows).unwrap();
    let totals = phylum_totals(&detail).unwrap();
    assemble(&detail, &totals, &table.columns).unwrap()
}

fn column(report: &Report, name: &str) -> usize {
    report.columns.iter().position(|c| c.name == name).unwrap()
}

#[test]
fn totals_and_blank_follow_each_group() {
    let report = march_report();
    let kinds: Vec<&str> = report
        .rows
        .iter()
        .map(|r| match r {
            ReportRow::Detail(_) => "D",
            ReportRow::Total(_) => "T",
            ReportRow::Blank => "B",
        })
        .collect();
    assert_eq!(kinds, vec!["D", "D", "T", "B", "D", "D", "T", "B"]);
    assert_eq!(report.detail_count(), 4);
}

#[test]
fn totals_rows_blank_text_columns() {
    let report = march_report();
    let ReportRow::Total(cells) = &report.rows[2] else {
        panic!("expected totals row");
    };
    assert_eq!(
        cells[column(&report, survey::PHYLUM)],
        Cell::Text("TOTAL DINOFLAGELLATES".to_string())
    );
    assert_eq!(cells[column(&report, survey::SPECIES)], Cell::Empty);
    assert_eq!(cells[column(&report, survey::STATUS)], Cell::Empty);
    assert_eq!(cells[column(&report, enriched::MFT)], Cell::Empty);
    assert_eq!(cells[column(&report, survey::TOTAL)], Cell::Number(1540.0));
}

#[test]
fn unresolved_biomass_renders_empty() {
    let report = march_report();
    // Dinobryon balticum: genus match only, no measurements
    let ReportRow::Detail(cells) = &report.rows[5] else {
        panic!("expected detail row");
    };
    assert_eq!(
        cells[column(&report, survey::SPECIES)],
        Cell::Text("Dinobryon balticum".to_string())
    );
    assert_eq!(cells[column(&report, enriched::BIOMASS)], Cell::Empty);
}

#[test]
fn two_tier_header_labels_observations_only() {
    let report = march_report();
    let tiers = report.header_tiers(HeaderLayout::TwoTier);
    assert_eq!(tiers.len(), 2);

    let mar_a = column(&report, "Mar-A");
    assert_eq!(tiers[0][mar_a], "E1 3/27/24");
    assert_eq!(tiers[1][mar_a], "Mar-A");
    assert_eq!(tiers[0][column(&report, survey::STATUS)], "");
    assert_eq!(tiers[0][column(&report, enriched::VOLUME)], "");
    assert_eq!(tiers[1][0], survey::STATUS);
}

#[test]
fn three_tier_header_rolls_late_dates_forward() {
    let report = march_report();
    let tiers = report.header_tiers(HeaderLayout::ThreeTier);
    assert_eq!(tiers.len(), 4);

    let mar_a = column(&report, "Mar-A");
    let mar_b = column(&report, "Mar-B");
    assert_eq!(tiers[0][mar_a], "April");
    assert_eq!(tiers[1][mar_a], "E1");
    assert_eq!(tiers[2][mar_a], "3/27/24");
    assert_eq!(tiers[0][mar_b], "March");
    assert_eq!(tiers[1][mar_b], "H4");
    assert_eq!(tiers[3][mar_b], "Mar-B");
}

#[test]
fn rendered_frame_has_headers_then_rows() {
    let report = march_report();
    let frame = report.to_frame(HeaderLayout::TwoTier).unwrap();
    assert_eq!(frame.width(), report.columns.len());
    assert_eq!(frame.height(), 2 + report.rows.len());

    let first = frame.get_columns()[0].str().unwrap();
    assert_eq!(first.get(1), Some(survey::STATUS));
    assert_eq!(first.get(2), Some("Mixoplankton"));
    // totals row leaves Status blank, as does the separator
    assert_eq!(first.get(4), Some(""));
    assert_eq!(first.get(5), Some(""));
}
