use crate::core::error::{Error, Result};
use crate::core::types::AxisName;
use crate::matrix::axis::Axis;
use crate::matrix::matrix::MowseMatrix;
use crate::schema::schema::RowSchema;
use crate::storage::catalog::NodeId;
use crate::storage::store::{NameCheck, Store};

pub const CELL_TITLE: &str = "Peptide Search Node";

/// One of the two indexing perspectives over the grid.
///
/// The protein view owns the cell tables at `protein/{p}/{q}`; the peptide
/// view holds hard links to the same tables at `peptide/{q}/{p}`. Rows are
/// stored once and reachable both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixView {
    name: AxisName,
    group: NodeId,
}

impl MatrixView {
    pub fn new(name: AxisName, group: NodeId) -> Self {
        MatrixView { name, group }
    }

    pub fn name(&self) -> AxisName {
        self.name
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    fn require(&self, name: AxisName, operation: &str) -> Result<()> {
        if self.name != name {
            return Err(Error::invalid_state(format!(
                "{} is only valid on the {} view, not the {} view",
                operation, name, self.name
            )));
        }
        Ok(())
    }

    /// Create the physical table for cell `(protein_index, peptide_index)`.
    pub fn new_table(
        &self,
        store: &mut Store,
        protein_index: i64,
        peptide_index: i64,
        schema: &RowSchema,
    ) -> Result<NodeId> {
        self.require(AxisName::Protein, "new_table")?;

        // numeric names need relaxed naming
        let row = store.require_group(self.group, &protein_index.to_string(), NameCheck::Relaxed)?;
        store.create_table(row, &peptide_index.to_string(), CELL_TITLE, schema, NameCheck::Relaxed)
    }

    /// Alias `target` as `peptide/{peptide_index}/{protein_index}`.
    pub fn new_link(
        &self,
        store: &mut Store,
        protein_index: i64,
        peptide_index: i64,
        target: NodeId,
    ) -> Result<NodeId> {
        self.require(AxisName::Peptide, "new_link")?;

        let row = store.require_group(self.group, &peptide_index.to_string(), NameCheck::Relaxed)?;
        store.create_hard_link(row, &protein_index.to_string(), target, NameCheck::Relaxed)
    }

    /// The axis holding every cell whose bucket on this view's own axis
    /// contains `mass`.
    pub fn get_size<'a>(&'a self, matrix: &'a MowseMatrix, store: &'a Store, mass: f64) -> Result<Axis<'a>> {
        let index = matrix.indexes().checked_bucket_index(mass, self.name)?;
        self.axis(matrix, store, index)
    }

    /// The axis at bucket `index` of this view's own axis.
    pub fn axis<'a>(&'a self, matrix: &'a MowseMatrix, store: &'a Store, index: i64) -> Result<Axis<'a>> {
        let group = store.child(self.group, &index.to_string())?;
        Ok(Axis::new(self, matrix, store, group, index))
    }
}
