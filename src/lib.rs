//! Classify Long Island Sound plankton surveys against the Mixoplankton
//! Database.
//!
//! A survey runs through normalize → classifier → biomass → aggregation →
//! report; [`pipeline::Pipeline`] strings the stages together per file.

pub mod aggregation;
pub mod biomass;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod schema;

#[cfg(feature = "python")]
mod python;

pub use classifier::{Classification, Classifier, Overrides};
pub use config::PipelineConfig;
pub use error::{MixoError, Result};
pub use model::{ClassifiedRow, EnrichedRow, Status, SurveyRow, SurveyTable};
pub use pipeline::Pipeline;
pub use reference::{ReferenceEntry, ReferenceSet};
