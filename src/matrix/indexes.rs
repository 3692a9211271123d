use std::ops::RangeInclusive;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{AxisName, MowseInterval, PeptideRange, Point, ProteinRange};

/// Maps raw masses onto grid coordinates.
///
/// Bucket `k` on an axis of width `w` covers `[k * w, (k + 1) * w)`: masses
/// are floored, so `k * w` maps to bucket `k` and `k * w - 1` to `k - 1`.
/// The grid spans `min_point` to `max_point` inclusive on both axes, which is
/// exactly what [`Indexes::protein_rows`] and [`Indexes::peptide_rows`] enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexes {
    pub interval: MowseInterval,
    pub min_point: Point,
    pub max_point: Point,
}

impl Indexes {
    pub fn from_range(interval: MowseInterval, protein: ProteinRange, peptide: PeptideRange) -> Self {
        let protein_buckets = protein / interval.protein;
        let peptide_buckets = peptide / interval.peptide;

        Indexes {
            interval,
            min_point: Point::new(protein_buckets.min, peptide_buckets.min),
            max_point: Point::new(protein_buckets.max, peptide_buckets.max),
        }
    }

    pub fn protein_rows(&self) -> RangeInclusive<i64> {
        self.min_point.protein..=self.max_point.protein
    }

    pub fn peptide_rows(&self) -> RangeInclusive<i64> {
        self.min_point.peptide..=self.max_point.peptide
    }

    pub fn rows(&self, axis: AxisName) -> RangeInclusive<i64> {
        match axis {
            AxisName::Protein => self.protein_rows(),
            AxisName::Peptide => self.peptide_rows(),
        }
    }

    /// Bucket of `mass` on `axis`.
    pub fn bucket_index(&self, mass: f64, axis: AxisName) -> i64 {
        (mass / self.interval.width(axis) as f64).floor() as i64
    }

    /// [`Indexes::bucket_index`] for masses coming from callers. NaN and
    /// infinities have no bucket.
    pub fn checked_bucket_index(&self, mass: f64, axis: AxisName) -> Result<i64> {
        if !mass.is_finite() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("{} mass must be finite, got {}", axis, mass),
            ));
        }
        Ok(self.bucket_index(mass, axis))
    }

    /// Bucket of `mass` on the axis opposite to `axis`. Used when standing in
    /// one view and stepping into the paired axis.
    pub fn other_axis_bucket_index(&self, mass: f64, axis: AxisName) -> Result<i64> {
        self.checked_bucket_index(mass, axis.other())
    }

    pub fn point(&self, protein_mass: f64, peptide_mass: f64) -> Point {
        Point::new(
            self.bucket_index(protein_mass, AxisName::Protein),
            self.bucket_index(peptide_mass, AxisName::Peptide),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        self.protein_rows().contains(&point.protein) && self.peptide_rows().contains(&point.peptide)
    }

    pub fn bucket_count(&self, axis: AxisName) -> u64 {
        let rows = self.rows(axis);
        (rows.end() - rows.start() + 1) as u64
    }

    pub fn cell_count(&self) -> u64 {
        self.bucket_count(AxisName::Protein) * self.bucket_count(AxisName::Peptide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexes() -> Indexes {
        Indexes::from_range(
            MowseInterval { protein: 10_000, peptide: 1_000 },
            ProteinRange::new(10_000.0, 100_000.0),
            PeptideRange::new(500.0, 5_000.0),
        )
    }

    #[test]
    fn grid_bounds() {
        let indexes = indexes();
        assert_eq!(indexes.min_point, Point::new(1, 0));
        assert_eq!(indexes.max_point, Point::new(10, 5));
        assert_eq!(indexes.protein_rows().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert_eq!(indexes.peptide_rows().count(), 6);
        assert_eq!(indexes.cell_count(), 60);
    }

    #[test]
    fn boundary_masses_floor() {
        let indexes = indexes();
        assert_eq!(indexes.bucket_index(3000.0, AxisName::Peptide), 3);
        assert_eq!(indexes.bucket_index(2999.0, AxisName::Peptide), 2);
        assert_eq!(indexes.bucket_index(2999.999, AxisName::Peptide), 2);
        assert_eq!(indexes.bucket_index(50_000.0, AxisName::Protein), 5);
        assert_eq!(indexes.bucket_index(49_999.0, AxisName::Protein), 4);
    }

    #[test]
    fn other_axis_uses_opposite_width() {
        let indexes = indexes();
        assert_eq!(indexes.other_axis_bucket_index(55_000.0, AxisName::Peptide).unwrap(), 5);
        assert_eq!(indexes.other_axis_bucket_index(2_500.0, AxisName::Protein).unwrap(), 2);
    }

    #[test]
    fn non_finite_masses_have_no_bucket() {
        let indexes = indexes();
        for mass in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = indexes.checked_bucket_index(mass, AxisName::Peptide).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument);
            assert!(indexes.other_axis_bucket_index(mass, AxisName::Protein).is_err());
        }
        assert_eq!(indexes.checked_bucket_index(2_500.0, AxisName::Peptide).unwrap(), 2);
    }

    #[test]
    fn extremes_are_inside_the_grid() {
        let indexes = indexes();
        assert!(indexes.contains(indexes.point(10_000.0, 500.0)));
        assert!(indexes.contains(indexes.point(100_000.0, 5_000.0)));
        assert!(indexes.contains(indexes.point(100_000.9, 5_000.9)));
        assert!(!indexes.contains(indexes.point(110_000.0, 2_000.0)));
    }
}
