use crate::core::error::Result;
use crate::matrix::matrix::MowseMatrix;
use crate::matrix::view::MatrixView;
use crate::storage::catalog::NodeId;
use crate::storage::store::Store;

/// One row of a view: the group of cells sharing a bucket on the view's own
/// axis. Built on every lookup and never cached; the borrows tie it to the
/// open store.
#[derive(Clone, Copy)]
pub struct Axis<'a> {
    view: &'a MatrixView,
    matrix: &'a MowseMatrix,
    store: &'a Store,
    group: NodeId,
    index: i64,
}

impl<'a> Axis<'a> {
    pub fn new(view: &'a MatrixView, matrix: &'a MowseMatrix, store: &'a Store, group: NodeId, index: i64) -> Self {
        Axis { view, matrix, store, group, index }
    }

    pub fn view(&self) -> &'a MatrixView {
        self.view
    }

    pub fn matrix(&self) -> &'a MowseMatrix {
        self.matrix
    }

    pub fn store(&self) -> &'a Store {
        self.store
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    /// Bucket index of this axis on its view's own axis.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Cell `index` on the complementary axis. A missing cell means the
    /// matrix was sized too small for the mass that led here.
    pub fn get_cell(&self, index: i64) -> Result<NodeId> {
        self.store.child(self.group, &index.to_string())
    }

    /// Cell holding `mass`, a mass on the complementary axis.
    pub fn get_size(&self, mass: f64) -> Result<NodeId> {
        let index = self
            .matrix
            .indexes()
            .other_axis_bucket_index(mass, self.view.name())?;
        self.get_cell(index)
    }
}

impl std::fmt::Debug for Axis<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axis")
            .field("view", &self.view.name())
            .field("index", &self.index)
            .field("group", &self.group)
            .finish()
    }
}
