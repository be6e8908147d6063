use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use polars::prelude::*;

use crate::aggregation::phylum_totals;
use crate::biomass::BiomassEstimator;
use crate::classifier::{Classification, Classifier};
use crate::config::PipelineConfig;
use crate::error::{MixoError, Result};
use crate::frame::{classified_frame, enriched_frame};
use crate::loader::RawTable;
use crate::model::{EnrichedRow, SurveyTable};
use crate::normalize::{load_survey, normalize_survey};
use crate::reference::ReferenceSet;
use crate::report::{assemble, Report};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Everything computed for one survey file.
#[derive(Debug, Clone)]
pub struct SurveyRun {
    pub survey: SurveyTable,
    pub classification: Classification,
    pub enriched: Vec<EnrichedRow>,
    /// All classified rows, as written to the main output.
    pub classified: DataFrame,
    /// Per-phylum totals over every classified row.
    pub survey_totals: DataFrame,
    /// Per-phylum totals over mixotroph rows only.
    pub mixotroph_totals: DataFrame,
    pub report: Report,
}

/// Files written for one survey.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub classified: PathBuf,
    pub report: PathBuf,
    pub totals: PathBuf,
}

/// Result of one file of a batch; failures do not stop the batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub result: Result<OutputPaths>,
}

pub struct Pipeline {
    reference: ReferenceSet,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(reference: ReferenceSet, config: PipelineConfig) -> Self {
        Self { reference, config }
    }

    /// Load the reference named by `config.reference_path`.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let path = config
            .reference_path
            .clone()
            .ok_or_else(|| MixoError::Config("reference_path is not set".to_string()))?;
        let reference = ReferenceSet::load(&path, &config.reference_columns)?;
        Ok(Self::new(reference, config))
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run_file(&self, path: &Path) -> Result<SurveyRun> {
        let survey = load_survey(path)?;
        self.run_survey(survey)
    }

    pub fn run_table(&self, source: &str, table: &RawTable) -> Result<SurveyRun> {
        let survey = normalize_survey(source, table)?;
        self.run_survey(survey)
    }

    pub fn run_survey(&self, survey: SurveyTable) -> Result<SurveyRun> {
        let classification = Classifier::new(&self.reference, &self.config.overrides)
            .with_excluded_phyla(&self.config.excluded_phyla)
            .classify(&survey.rows);

        let enriched = BiomassEstimator::new(&self.reference, &self.config.biomass_overrides)
            .enrich(&classification.rows);

        let classified = classified_frame(&survey.columns, &classification.rows)?;
        let survey_totals = phylum_totals(&classified)?;

        let mixotrophs = enriched_frame(&survey.columns, &enriched)?;
        let mixotroph_totals = phylum_totals(&mixotrophs)?;
        let report = assemble(&mixotrophs, &mixotroph_totals, &survey.columns)?;

        Ok(SurveyRun {
            survey,
            classification,
            enriched,
            classified,
            survey_totals,
            mixotroph_totals,
            report,
        })
    }

    /// Write the three output tables for `run` into `out_dir`.
    pub fn write_outputs(
        &self,
        run: &mut SurveyRun,
        out_dir: &Path,
        timestamp: DateTime<Local>,
    ) -> Result<OutputPaths> {
        fs::create_dir_all(out_dir)?;
        let stem = format!("{}-{}", run.survey.source, timestamp.format(TIMESTAMP_FORMAT));
        let paths = OutputPaths {
            classified: out_dir.join(format!("{stem}.csv")),
            report: out_dir.join(format!("{stem}-report.csv")),
            totals: out_dir.join(format!("{stem}-totals.csv")),
        };

        write_csv(&mut run.classified, &paths.classified, true)?;
        write_csv(&mut run.survey_totals, &paths.totals, true)?;
        let mut report = run.report.to_frame(self.config.header_layout)?;
        write_csv(&mut report, &paths.report, false)?;

        tracing::info!(
            source = %run.survey.source,
            output = %paths.classified.display(),
            "wrote survey outputs"
        );
        Ok(paths)
    }

    /// Classify every `*.csv` in `inputs_dir`, in name order.
    ///
    /// A failing file is logged and reported in its outcome; the remaining
    /// files still run. Only an unreadable `inputs_dir` fails the batch.
    pub fn run_batch(&self, inputs_dir: &Path, out_dir: &Path) -> Result<Vec<BatchOutcome>> {
        let mut inputs: Vec<PathBuf> = fs::read_dir(inputs_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        inputs.sort();

        let timestamp = Local::now();
        let outcomes = inputs
            .into_iter()
            .map(|input| {
                let result = self
                    .run_file(&input)
                    .and_then(|mut run| self.write_outputs(&mut run, out_dir, timestamp));
                match &result {
                    Ok(_) => tracing::info!(input = %input.display(), "survey done"),
                    Err(e) => tracing::error!(input = %input.display(), error = %e, "survey failed"),
                }
                BatchOutcome { input, result }
            })
            .collect();

        Ok(outcomes)
    }
}

fn write_csv(df: &mut DataFrame, path: &Path, header: bool) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(header)
        .finish(df)?;
    Ok(())
}
