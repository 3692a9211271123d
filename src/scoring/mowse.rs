use std::collections::HashMap;
use crate::core::database::MowseDatabase;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{AxisName, Point};
use crate::matrix::indexes::Indexes;

/// Normalized peptide frequencies per grid cell.
///
/// `f(p, q)` is the row count of cell `(p, q)` divided by the largest row
/// count in protein bucket `p`, so the most common peptide mass of each
/// protein size class scores 1.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    indexes: Indexes,
    counts: HashMap<Point, u64>,
    column_max: HashMap<i64, u64>,
}

impl FrequencyTable {
    pub fn build(db: &MowseDatabase) -> Result<Self> {
        let matrix = db.matrix()?;
        let store = db.store()?;
        let indexes = *matrix.indexes();

        let mut counts = HashMap::new();
        let mut column_max = HashMap::new();
        for p in indexes.protein_rows() {
            let axis = matrix.protein().axis(matrix, store, p)?;
            let mut max = 0;
            for q in indexes.peptide_rows() {
                let count = store.row_count(axis.get_cell(q)?)?;
                if count > 0 {
                    counts.insert(Point::new(p, q), count);
                }
                max = max.max(count);
            }
            column_max.insert(p, max);
        }

        Ok(FrequencyTable { indexes, counts, column_max })
    }

    pub fn count(&self, point: Point) -> u64 {
        self.counts.get(&point).copied().unwrap_or(0)
    }

    pub fn frequency(&self, point: Point) -> f64 {
        match self.column_max.get(&point.protein) {
            Some(&max) if max > 0 => self.count(point) as f64 / max as f64,
            _ => 0.0,
        }
    }

    pub fn indexes(&self) -> &Indexes {
        &self.indexes
    }
}

/// Classic MOWSE score: `50000 / (M * prod f(p, q_i))` over matched peptides.
#[derive(Debug, Clone)]
pub struct MowseScorer {
    pub table: FrequencyTable,
    /// Frequency used for cells with no peptides
    pub floor: f64,
}

impl MowseScorer {
    pub const DEFAULT_FLOOR: f64 = 1e-3;

    pub fn new(table: FrequencyTable) -> Self {
        MowseScorer { table, floor: Self::DEFAULT_FLOOR }
    }

    pub fn score(&self, protein_mass: f64, peptide_masses: &[f64]) -> Result<f64> {
        if !protein_mass.is_finite() || protein_mass <= 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("protein mass must be positive, got {}", protein_mass),
            ));
        }

        let indexes = self.table.indexes();
        let p = indexes.bucket_index(protein_mass, AxisName::Protein);
        let product = peptide_masses.iter().try_fold(1.0, |product, mass| {
            let q = indexes.checked_bucket_index(*mass, AxisName::Peptide)?;
            Ok::<f64, Error>(product * self.table.frequency(Point::new(p, q)).max(self.floor))
        })?;

        Ok(50_000.0 / (protein_mass * product))
    }
}
