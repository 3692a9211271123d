use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{AxisName, MowseInterval, PeptideRange, ProteinRange};
use crate::matrix::indexes::Indexes;
use crate::matrix::view::MatrixView;
use crate::schema::schema::{PeptideQuery, RowSchema};
use crate::storage::catalog::NodeId;
use crate::storage::store::{NameCheck, Store};

const ATTR_PROTEIN: &str = "protein";
const ATTR_PEPTIDE: &str = "peptide";
const ATTR_INTERVAL: &str = "interval";
const ATTR_SCHEMA: &str = "schema";

/// The 2D (protein bucket, peptide bucket) grid and its two views.
#[derive(Debug, Clone)]
pub struct MowseMatrix {
    group: NodeId,
    protein_range: ProteinRange,
    peptide_range: PeptideRange,
    indexes: Indexes,
    schema: RowSchema,
    protein: MatrixView,
    peptide: MatrixView,
}

impl MowseMatrix {
    /// Lay out a new grid under `group` and create every cell.
    ///
    /// If this returns an error or is interrupted the store must be
    /// discarded; there is no way to resume a partial grid.
    pub fn new(
        store: &mut Store,
        group: NodeId,
        min_protein_mass: f64,
        max_protein_mass: f64,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        let protein_range = ProteinRange::try_new(min_protein_mass, max_protein_mass)?;
        let peptide_range = config.peptide_range();
        let interval = config.interval();
        let schema = PeptideQuery::description(config);

        store.set_attr(group, ATTR_PROTEIN, &protein_range)?;
        store.set_attr(group, ATTR_PEPTIDE, &peptide_range)?;
        store.set_attr(group, ATTR_INTERVAL, &interval)?;
        store.set_attr(group, ATTR_SCHEMA, &schema)?;

        let protein_group = store.create_group(group, AxisName::Protein.as_str(), "Protein View", NameCheck::Strict)?;
        let peptide_group = store.create_group(group, AxisName::Peptide.as_str(), "Peptide View", NameCheck::Strict)?;

        let matrix = MowseMatrix {
            group,
            protein_range,
            peptide_range,
            indexes: Indexes::from_range(interval, protein_range, peptide_range),
            schema,
            protein: MatrixView::new(AxisName::Protein, protein_group),
            peptide: MatrixView::new(AxisName::Peptide, peptide_group),
        };
        matrix.set_dimensions(store)?;
        Ok(matrix)
    }

    /// Attach to a grid previously built by [`MowseMatrix::new`].
    pub fn open(store: &Store, group: NodeId) -> Result<Self> {
        let protein_range: ProteinRange = store.get_attr(group, ATTR_PROTEIN)?;
        let peptide_range: PeptideRange = store.get_attr(group, ATTR_PEPTIDE)?;
        let interval: MowseInterval = store.get_attr(group, ATTR_INTERVAL)?;
        let schema: RowSchema = store.get_attr(group, ATTR_SCHEMA)?;

        let protein_group = store.child(group, AxisName::Protein.as_str())?;
        let peptide_group = store.child(group, AxisName::Peptide.as_str())?;

        Ok(MowseMatrix {
            group,
            protein_range,
            peptide_range,
            indexes: Indexes::from_range(interval, protein_range, peptide_range),
            schema,
            protein: MatrixView::new(AxisName::Protein, protein_group),
            peptide: MatrixView::new(AxisName::Peptide, peptide_group),
        })
    }

    /// One table per cell under the protein view, one link to it under the
    /// peptide view. All tables share `self.schema`.
    fn set_dimensions(&self, store: &mut Store) -> Result<()> {
        log::debug!(
            "allocating {} x {} cells (protein buckets {:?}, peptide buckets {:?})",
            self.indexes.bucket_count(AxisName::Protein),
            self.indexes.bucket_count(AxisName::Peptide),
            self.indexes.protein_rows(),
            self.indexes.peptide_rows(),
        );

        for protein_index in self.indexes.protein_rows() {
            for peptide_index in self.indexes.peptide_rows() {
                let table = self.protein.new_table(store, protein_index, peptide_index, &self.schema)?;
                self.peptide.new_link(store, protein_index, peptide_index, table)?;
            }
        }

        Ok(())
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn protein_range(&self) -> ProteinRange {
        self.protein_range
    }

    pub fn peptide_range(&self) -> PeptideRange {
        self.peptide_range
    }

    pub fn indexes(&self) -> &Indexes {
        &self.indexes
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    pub fn protein(&self) -> &MatrixView {
        &self.protein
    }

    pub fn peptide(&self) -> &MatrixView {
        &self.peptide
    }

    pub fn view(&self, name: AxisName) -> &MatrixView {
        match name {
            AxisName::Protein => &self.protein,
            AxisName::Peptide => &self.peptide,
        }
    }

    /// Table for the cell holding (`protein_mass`, `peptide_mass`).
    pub fn cell(&self, store: &Store, protein_mass: f64, peptide_mass: f64) -> Result<NodeId> {
        self.protein
            .get_size(self, store, protein_mass)?
            .get_size(peptide_mass)
    }
}
