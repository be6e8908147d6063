//! Python bindings via PyO3
//!
//! ```python
//! from mixotrack import MixoClassifier
//!
//! clf = MixoClassifier("data/mdb.csv", config_path="mixotrack.toml")
//! classified = clf.classify("inputs/2024_03.csv")   # polars DataFrame
//! report = clf.report("inputs/2024_03.csv")
//! failures = clf.run_batch("inputs", "outputs")
//! ```

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use crate::schema;

#[pyclass(name = "MixoClassifier")]
pub struct PyMixoClassifier {
    pipeline: Pipeline,
}

#[pymethods]
impl PyMixoClassifier {
    #[new]
    #[pyo3(signature = (reference_path, config_path=None))]
    fn new(reference_path: &str, config_path: Option<&str>) -> PyResult<Self> {
        let mut config = PipelineConfig::load_or_default(config_path.map(Path::new))?;
        config.reference_path = Some(reference_path.into());
        let pipeline = Pipeline::from_config(config)?;
        Ok(Self { pipeline })
    }

    /// Every surviving row of the survey with its status.
    fn classify(&self, survey_path: &str) -> PyResult<PyDataFrame> {
        let run = self.pipeline.run_file(Path::new(survey_path))?;
        Ok(PyDataFrame(run.classified))
    }

    /// Mixotroph rows with totals and separators, header tiers as leading rows.
    fn report(&self, survey_path: &str) -> PyResult<PyDataFrame> {
        let run = self.pipeline.run_file(Path::new(survey_path))?;
        let df = run.report.to_frame(self.pipeline.config().header_layout)?;
        Ok(PyDataFrame(df))
    }

    fn survey_totals(&self, survey_path: &str) -> PyResult<PyDataFrame> {
        let run = self.pipeline.run_file(Path::new(survey_path))?;
        Ok(PyDataFrame(run.survey_totals))
    }

    fn mixotroph_totals(&self, survey_path: &str) -> PyResult<PyDataFrame> {
        let run = self.pipeline.run_file(Path::new(survey_path))?;
        Ok(PyDataFrame(run.mixotroph_totals))
    }

    /// Process a directory of surveys. Returns (input, error message) for
    /// every file that failed.
    fn run_batch(&self, inputs_dir: &str, out_dir: &str) -> PyResult<Vec<(String, String)>> {
        let outcomes = self
            .pipeline
            .run_batch(Path::new(inputs_dir), Path::new(out_dir))?;
        Ok(outcomes
            .into_iter()
            .filter_map(|o| {
                o.result
                    .err()
                    .map(|e| (o.input.display().to_string(), e.to_string()))
            })
            .collect())
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Survey
    let survey = PyModule::new(m.py(), "survey")?;
    survey.add("STATUS", schema::survey::STATUS)?;
    survey.add("PHYLUM", schema::survey::PHYLUM)?;
    survey.add("GENUS", schema::survey::GENUS)?;
    survey.add("SPECIES", schema::survey::SPECIES)?;
    survey.add("TOTAL", schema::survey::TOTAL)?;
    m.add_submodule(&survey)?;

    // Enriched
    let enriched = PyModule::new(m.py(), "enriched")?;
    enriched.add("MFT", schema::enriched::MFT)?;
    enriched.add("EVIDENCE", schema::enriched::EVIDENCE)?;
    enriched.add("SIZE_CLASS", schema::enriched::SIZE_CLASS)?;
    enriched.add("VOLUME", schema::enriched::VOLUME)?;
    enriched.add("BIOMASS", schema::enriched::BIOMASS)?;
    m.add_submodule(&enriched)?;

    // Status
    let status = PyModule::new(m.py(), "status")?;
    status.add("MIXOPLANKTON", schema::status::MIXOPLANKTON)?;
    status.add("UNSURE_SP_IN_MDB", schema::status::UNSURE_SP_IN_MDB)?;
    status.add("UNSURE_INEXACT_NAME", schema::status::UNSURE_INEXACT_NAME)?;
    status.add("ZOOPLANKTON", schema::status::ZOOPLANKTON)?;
    status.add("PHYTOPLANKTON", schema::status::PHYTOPLANKTON)?;
    m.add_submodule(&status)?;

    Ok(())
}

#[pymodule]
fn mixotrack(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMixoClassifier>()?;
    add_schema_exports(m)?;
    Ok(())
}
