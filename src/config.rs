//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! built-in curator rules:
//!
//! ```toml
//! reference_path = "data/mdb.csv"
//! excluded_phyla = ["Diatom"]
//! header_layout = "three_tier"
//!
//! [overrides]
//! mixotroph_genera = ["Ochromonas", "Dinobryon"]
//! zooplankton_species = ["Protoperidinium bipes"]
//!
//! [[biomass_overrides]]
//! pattern = "Ochromonas"
//! mft = "CM"
//! size_class = "nano"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::biomass::BiomassOverride;
use crate::classifier::Overrides;
use crate::error::{MixoError, Result};
use crate::reference::ReferenceColumns;
use crate::report::HeaderLayout;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Mixoplankton Database CSV.
    pub reference_path: Option<PathBuf>,
    pub overrides: Overrides,
    /// Phyla whose rows never reach the reference passes.
    pub excluded_phyla: Vec<String>,
    pub biomass_overrides: Vec<BiomassOverride>,
    pub reference_columns: ReferenceColumns,
    pub header_layout: HeaderLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_path: None,
            overrides: Overrides::default(),
            excluded_phyla: Vec::new(),
            biomass_overrides: BiomassOverride::defaults(),
            reference_columns: ReferenceColumns::default(),
            header_layout: HeaderLayout::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MixoError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given and present, otherwise fall back to defaults.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                tracing::warn!(path = %p.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(empty) = self.overrides.iter().find(|s| s.trim().is_empty()) {
            return Err(MixoError::Config(format!(
                "override entries must not be blank (got {empty:?})"
            )));
        }
        if self.biomass_overrides.iter().any(|o| o.pattern.trim().is_empty()) {
            return Err(MixoError::Config(
                "biomass override patterns must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
