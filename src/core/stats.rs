use serde::{Serialize, Deserialize};
use crate::core::types::{PeptideRange, Point, ProteinRange};

/// Grid occupancy for monitoring and capacity planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixStats {
    // Dimensions
    pub protein_range: ProteinRange,
    pub peptide_range: PeptideRange,
    pub protein_buckets: u64,
    pub peptide_buckets: u64,
    pub cells: u64,

    // Occupancy
    pub rows: u64,
    pub non_empty_cells: u64,
    pub largest_cell: Option<(Point, u64)>,
}

impl MatrixStats {
    pub fn fill_ratio(&self) -> f64 {
        if self.cells == 0 {
            return 0.0;
        }
        self.non_empty_cells as f64 / self.cells as f64
    }
}

/// Outcome of a bulk population run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateSummary {
    pub proteins: u64,
    pub peptides: u64,          // Digested peptides, before modification
    pub inserted: u64,          // Rows written (one per modification state)
    pub skipped_mass: u64,      // Outside the peptide mass range
    pub skipped_length: u64,    // Longer than the sequence column
    pub skipped_residue: u64,   // Contains a residue without a known mass
}
