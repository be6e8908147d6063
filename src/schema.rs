/// Column-name and marker constants for mixotrack.
/// Single source of truth - exported to Python via PyO3.

// ── Survey columns ──────────────────────────────────────────────────────────
pub mod survey {
    pub const STATUS: &str = "Status";
    pub const PHYLUM: &str = "Phylum";
    pub const GENUS: &str = "Genus";
    pub const SPECIES: &str = "Species";
    pub const TOTAL: &str = "Total";
}

// ── Enrichment columns ──────────────────────────────────────────────────────
pub mod enriched {
    pub const MFT: &str = "MFT";
    pub const EVIDENCE: &str = "Evidence";
    pub const SIZE_CLASS: &str = "Size Class";
    pub const VOLUME: &str = "Volume (µm³)";
    pub const BIOMASS: &str = "Total Biomass (pgC)";
}

/// Names no observation column may take.
pub const RESERVED: [&str; 10] = [
    survey::STATUS,
    survey::PHYLUM,
    survey::GENUS,
    survey::SPECIES,
    survey::TOTAL,
    enriched::MFT,
    enriched::EVIDENCE,
    enriched::SIZE_CLASS,
    enriched::VOLUME,
    enriched::BIOMASS,
];

// ── Survey layout markers ───────────────────────────────────────────────────
pub mod markers {
    /// First-column value of the real header row.
    pub const HEADER_ROW: &str = "Phylum";
    pub const SPECIES_HEADER: &str = "Species";
    /// First-column value where the surveyed section ends.
    pub const END_OF_SURVEY: &str = "Unknown flagellates";
    /// Substring identifying precomputed totals rows.
    pub const TOTALS: &str = "TOTAL";
    /// Data begins this many rows below the header row.
    pub const DATA_OFFSET: usize = 2;
}

// ── Mixoplankton database layout ────────────────────────────────────────────
pub mod reference {
    /// Raw row index (headerless read) of the real header.
    pub const HEADER_ROW: usize = 2;
    pub const DATA_START: usize = 3;

    pub const SPECIES_NAME: &str = "Species Name";
    pub const MFT: &str = "MFT";
    pub const EVIDENCE: &str = "Evidence of mixotrophy";
    pub const SIZE_CLASS: &str = "Size class";
    pub const LENGTH: &str = "Length (µm)";
    pub const WIDTH: &str = "Width (µm)";
}

// ── Carbon allometry ────────────────────────────────────────────────────────
pub mod allometry {
    pub const EXPONENT: f64 = 0.939;
    pub const COEFFICIENT: f64 = 0.216;
}

// ── Status labels ───────────────────────────────────────────────────────────
pub mod status {
    pub const MIXOPLANKTON: &str = "Mixoplankton";
    pub const UNSURE_SP_IN_MDB: &str = "Unsure (sp. in mdb)";
    pub const UNSURE_INEXACT_NAME: &str = "Unsure (inexact name)";
    pub const ZOOPLANKTON: &str = "Zooplankton";
    pub const PHYTOPLANKTON: &str = "Phytoplankton";
}
