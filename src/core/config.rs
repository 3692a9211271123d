use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{MowseInterval, PeptideRange};

/// Settings read by the matrix, the row schema and bulk population.
///
/// A matrix copies what it needs out of this at creation time and persists
/// it, so changing a `Config` never alters an existing database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Grid
    pub protein_interval: i64,          // Daltons per protein bucket
    pub peptide_interval: i64,          // Daltons per peptide bucket
    pub minimum_peptide_mass: f64,
    pub maximum_peptide_mass: f64,

    // Row schema
    pub maximum_peptide_length: usize,
    pub protein_identifier_length: usize,

    // Digestion
    pub missed_cleavages: usize,
    pub minimum_peptide_length: usize,
    pub max_variable_mods: usize,

    // Store
    pub open_table_handles: usize,      // LRU capacity for append handles
}

impl Default for Config {
    fn default() -> Self {
        Config {
            protein_interval: 10_000,
            peptide_interval: 1_000,
            minimum_peptide_mass: 500.0,
            maximum_peptide_mass: 5_000.0,

            maximum_peptide_length: 40,
            protein_identifier_length: 20,

            missed_cleavages: 1,
            minimum_peptide_length: 5,
            max_variable_mods: 2,

            open_table_handles: 64,
        }
    }
}

impl Config {
    /// Load a config from a JSON file. Missing keys fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.protein_interval <= 0 || self.peptide_interval <= 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "bucket intervals must be positive (protein={}, peptide={})",
                    self.protein_interval, self.peptide_interval
                ),
            ));
        }
        if self.minimum_peptide_mass > self.maximum_peptide_mass {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "minimum_peptide_mass exceeds maximum_peptide_mass",
            ));
        }
        if self.maximum_peptide_length == 0 || self.protein_identifier_length == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "field widths must be non-zero",
            ));
        }
        if self.open_table_handles == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "open_table_handles must be non-zero"));
        }
        Ok(())
    }

    pub fn interval(&self) -> MowseInterval {
        MowseInterval {
            protein: self.protein_interval,
            peptide: self.peptide_interval,
        }
    }

    pub fn peptide_range(&self) -> PeptideRange {
        PeptideRange::new(self.minimum_peptide_mass, self.maximum_peptide_mass)
    }
}
