use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::biomass::cell_volume;
use crate::error::{MixoError, Result};
use crate::loader::{read_raw_table, RawTable};
use crate::schema::reference;

/// Header names of the Mixoplankton Database columns we read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReferenceColumns {
    pub species: String,
    pub mft: String,
    pub evidence: String,
    pub size_class: String,
    pub length: String,
    pub width: String,
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            species: reference::SPECIES_NAME.to_string(),
            mft: reference::MFT.to_string(),
            evidence: reference::EVIDENCE.to_string(),
            size_class: reference::SIZE_CLASS.to_string(),
            length: reference::LENGTH.to_string(),
            width: reference::WIDTH.to_string(),
        }
    }
}

/// One species of the Mixoplankton Database.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceEntry {
    pub species_name: String,
    pub mft: Option<String>,
    pub evidence: Option<String>,
    pub size_class: Option<String>,
    /// Raw measurement strings, e.g. "10-20" or "~15".
    pub length: Option<String>,
    pub width: Option<String>,
}

impl ReferenceEntry {
    pub fn new(species_name: &str) -> Self {
        Self {
            species_name: normalize_species_name(species_name),
            ..Default::default()
        }
    }

    /// Parsed (length, width) in µm.
    pub fn dimensions(&self) -> (Option<f64>, Option<f64>) {
        (
            self.length.as_deref().and_then(parse_measurement),
            self.width.as_deref().and_then(parse_measurement),
        )
    }

    /// Cell volume from the entry's own measurements, if both are usable.
    pub fn measured_volume(&self) -> Option<f64> {
        match self.dimensions() {
            (Some(length), Some(width)) => Some(cell_volume(length, width)),
            _ => None,
        }
    }
}

/// A trailing bare "sp" becomes "sp." so genus lookups line up with survey names.
pub fn normalize_species_name(name: &str) -> String {
    let name = name.trim();
    match name.strip_suffix("sp") {
        Some(head) if head.ends_with(char::is_whitespace) => format!("{name}."),
        _ => name.to_string(),
    }
}

/// Parse a measurement cell into µm.
///
/// Ranges ("10-20", "10–20") resolve to their midpoint; approximation
/// markers and a trailing unit are stripped. Anything else is `None`.
pub fn parse_measurement(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    for unit in ["µm", "μm", "um"] {
        if let Some(stripped) = s.strip_suffix(unit) {
            s = stripped.trim_end();
        }
    }
    for marker in ["ca.", "c.", "~", "≈", "<", ">"] {
        if let Some(stripped) = s.strip_prefix(marker) {
            s = stripped.trim_start();
        }
    }
    if s.is_empty() {
        return None;
    }

    let mut bounds = s.splitn(2, ['-', '–']);
    let low = bounds.next()?.trim();
    match bounds.next() {
        Some(high) => {
            let low: f64 = low.parse().ok()?;
            let high: f64 = high.trim().trim_start_matches('~').parse().ok()?;
            Some((low + high) / 2.0)
        }
        None => low.parse().ok(),
    }
}

/// Size class → mean cell volume over every measured entry of that class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeClassVolumes {
    volumes: HashMap<String, f64>,
}

impl SizeClassVolumes {
    pub fn from_entries(entries: &[ReferenceEntry]) -> Self {
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        for entry in entries {
            let (Some(class), Some(volume)) = (entry.size_class.as_ref(), entry.measured_volume())
            else {
                continue;
            };
            let slot = sums.entry(class.clone()).or_insert((0.0, 0));
            slot.0 += volume;
            slot.1 += 1;
        }

        let volumes = sums
            .into_iter()
            .map(|(class, (sum, n))| (class, sum / n as f64))
            .collect();
        Self { volumes }
    }

    pub fn get(&self, size_class: &str) -> Option<f64> {
        self.volumes.get(size_class).copied()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// The loaded Mixoplankton Database.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
    names: Vec<String>,
    index: HashMap<String, usize>,
    size_classes: SizeClassVolumes,
}

impl ReferenceSet {
    /// Load the database CSV.
    pub fn load(path: &Path, columns: &ReferenceColumns) -> Result<Self> {
        let table = read_raw_table(path)?;
        let source = path.display().to_string();
        let set = Self::from_table(&source, &table, columns)?;
        tracing::info!(
            path = %source,
            species = set.len(),
            size_classes = set.size_classes.len(),
            "loaded mixoplankton database"
        );
        Ok(set)
    }

    /// Parse a headerless table whose real header sits after a two-row preamble.
    pub fn from_table(source: &str, table: &RawTable, columns: &ReferenceColumns) -> Result<Self> {
        if table.height() <= reference::HEADER_ROW {
            return Err(MixoError::input_format(
                source,
                "reference table is shorter than its preamble",
            ));
        }
        let header = table.row(reference::HEADER_ROW);
        let position = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h.as_deref() == Some(name))
                .ok_or_else(|| MixoError::missing_column(source, name))
        };

        let species_col = position(&columns.species)?;
        let mft_col = position(&columns.mft)?;
        let evidence_col = position(&columns.evidence)?;
        let size_col = position(&columns.size_class)?;
        let length_col = position(&columns.length)?;
        let width_col = position(&columns.width)?;

        let owned = |r: usize, c: usize| table.cell(r, c).map(str::to_string);

        let entries = (reference::DATA_START..table.height())
            .filter_map(|r| {
                let name = table.cell(r, species_col)?;
                Some(ReferenceEntry {
                    species_name: normalize_species_name(name),
                    mft: owned(r, mft_col),
                    evidence: owned(r, evidence_col),
                    size_class: owned(r, size_col),
                    length: owned(r, length_col),
                    width: owned(r, width_col),
                })
            })
            .collect();

        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.contains_key(&entry.species_name) {
                tracing::warn!(species = %entry.species_name, "duplicate reference species, keeping first");
                continue;
            }
            index.insert(entry.species_name.clone(), i);
        }
        let names = entries.iter().map(|e| e.species_name.clone()).collect();
        let size_classes = SizeClassVolumes::from_entries(&entries);

        Self {
            entries,
            names,
            index,
            size_classes,
        }
    }

    pub fn contains(&self, species_name: &str) -> bool {
        self.index.contains_key(species_name)
    }

    pub fn get(&self, species_name: &str) -> Option<&ReferenceEntry> {
        self.index.get(species_name).map(|&i| &self.entries[i])
    }

    /// Every species name, in database order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn size_class_volume(&self, size_class: &str) -> Option<f64> {
        self.size_classes.get(size_class)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_sp_gets_a_period() {
        assert_eq!(normalize_species_name("Ochromonas sp"), "Ochromonas sp.");
        assert_eq!(normalize_species_name("Ochromonas sp."), "Ochromonas sp.");
        assert_eq!(normalize_species_name(" Dinobryon sp "), "Dinobryon sp.");
        // "sp" inside a word is left alone
        assert_eq!(normalize_species_name("Karlodinium crisp"), "Karlodinium crisp");
    }

    #[test]
    fn measurements() {
        assert_eq!(parse_measurement("15"), Some(15.0));
        assert_eq!(parse_measurement("10-20"), Some(15.0));
        assert_eq!(parse_measurement("10 – 30"), Some(20.0));
        assert_eq!(parse_measurement("~8"), Some(8.0));
        assert_eq!(parse_measurement("ca. 12 µm"), Some(12.0));
        assert_eq!(parse_measurement("n/a"), None);
        assert_eq!(parse_measurement(""), None);
    }
}
