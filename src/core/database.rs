use std::path::{Path, PathBuf};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::{MatrixStats, PopulateSummary};
use crate::core::types::{AxisName, Point};
use crate::digest::mass::monoisotopic_mass;
use crate::digest::modification::ModificationSelection;
use crate::digest::protease::{Enzyme, Protease};
use crate::digest::source::ProteinSource;
use crate::matrix::axis::Axis;
use crate::matrix::matrix::MowseMatrix;
use crate::schema::schema::{PeptideQuery, RowSchema};
use crate::storage::catalog::NodeId;
use crate::storage::store::{NameCheck, Store};

pub const ROOT_GROUP: &str = "mowsematrix";

/// Top-level owner of the store and the matrix built in it.
///
/// Lifecycle is `new | open -> close`. Once closed, every operation returns
/// an `InvalidState` error.
pub struct MowseDatabase {
    path: PathBuf,
    config: Config,
    store: Option<Store>,
    matrix: Option<MowseMatrix>,
}

impl MowseDatabase {
    /// Create a store at `path` and lay out a grid covering
    /// `[min_protein_mass, max_protein_mass]`.
    pub fn new<P: AsRef<Path>>(
        min_protein_mass: f64,
        max_protein_mass: f64,
        path: P,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();

        let mut store = Store::create(&path, config.open_table_handles)?;
        let root = store.root();
        let group = store.create_group(root, ROOT_GROUP, "MOWSE Matrix", NameCheck::Strict)?;
        let matrix = MowseMatrix::new(&mut store, group, min_protein_mass, max_protein_mass, &config)?;
        store.flush()?;

        log::info!(
            "created MOWSE database at {} with {} cells",
            path.display(),
            matrix.indexes().cell_count()
        );
        Ok(MowseDatabase {
            path,
            config,
            store: Some(store),
            matrix: Some(matrix),
        })
    }

    /// Attach to an existing database. Grid dimensions and row schema come
    /// from the store; `config` only supplies runtime settings.
    pub fn open<P: AsRef<Path>>(path: P, config: Config) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();

        let store = Store::open(&path, config.open_table_handles)?;
        let group = store.resolve(ROOT_GROUP)?;
        let matrix = MowseMatrix::open(&store, group)?;

        if matrix.schema() != &PeptideQuery::description(&config) {
            log::debug!("{} uses a row schema that differs from the current config", path.display());
        }

        log::info!("opened MOWSE database at {}", path.display());
        Ok(MowseDatabase {
            path,
            config,
            store: Some(store),
            matrix: Some(matrix),
        })
    }

    /// Flush and release the store. The database is unusable afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.matrix = None;
        let store = self
            .store
            .take()
            .ok_or_else(|| Error::invalid_state("database is already closed"))?;
        store.close()?;
        log::info!("closed MOWSE database at {}", self.path.display());
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Row schema for a new matrix under `config`.
    pub fn description(config: &Config) -> RowSchema {
        PeptideQuery::description(config)
    }

    fn closed() -> Error {
        Error::invalid_state("database is closed")
    }

    pub fn store(&self) -> Result<&Store> {
        self.store.as_ref().ok_or_else(Self::closed)
    }

    pub fn matrix(&self) -> Result<&MowseMatrix> {
        self.matrix.as_ref().ok_or_else(Self::closed)
    }

    fn parts(&self) -> Result<(&Store, &MowseMatrix)> {
        Ok((self.store()?, self.matrix()?))
    }

    fn store_mut(&mut self) -> Result<&mut Store> {
        self.store.as_mut().ok_or_else(Self::closed)
    }

    /// Axis of `view` containing `mass` on that view's own axis.
    pub fn get_size(&self, view: AxisName, mass: f64) -> Result<Axis<'_>> {
        let (store, matrix) = self.parts()?;
        matrix.view(view).get_size(matrix, store, mass)
    }

    /// Cell table for (`protein_mass`, `peptide_mass`).
    pub fn cell(&self, protein_mass: f64, peptide_mass: f64) -> Result<NodeId> {
        let (store, matrix) = self.parts()?;
        matrix.cell(store, protein_mass, peptide_mass)
    }

    /// Append `row` to the cell of `protein_mass` and `row.mass`.
    pub fn insert(&mut self, protein_mass: f64, row: &PeptideQuery) -> Result<NodeId> {
        let cell = self.cell(protein_mass, row.mass)?;
        self.store_mut()?.append_row(cell, &row.to_values())?;
        Ok(cell)
    }

    pub fn read_cell(&self, cell: NodeId) -> Result<Vec<PeptideQuery>> {
        self.store()?
            .read_rows(cell)?
            .into_iter()
            .map(PeptideQuery::from_values)
            .collect()
    }

    /// Rows of the cell reached through `view`: `mass` selects the axis on
    /// the view's own dimension, `other_mass` the cell on the other one.
    pub fn rows_at(&self, view: AxisName, mass: f64, other_mass: f64) -> Result<Vec<PeptideQuery>> {
        let cell = self.get_size(view, mass)?.get_size(other_mass)?;
        self.read_cell(cell)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.store_mut()?.flush()
    }

    pub fn stats(&self) -> Result<MatrixStats> {
        let (store, matrix) = self.parts()?;
        let indexes = matrix.indexes();

        let mut rows = 0;
        let mut non_empty_cells = 0;
        let mut largest_cell: Option<(Point, u64)> = None;

        for p in indexes.protein_rows() {
            let axis = matrix.protein().axis(matrix, store, p)?;
            for q in indexes.peptide_rows() {
                let count = store.row_count(axis.get_cell(q)?)?;
                rows += count;
                if count > 0 {
                    non_empty_cells += 1;
                }
                if largest_cell.is_none_or(|(_, max)| count > max) {
                    largest_cell = Some((Point::new(p, q), count));
                }
            }
        }

        Ok(MatrixStats {
            protein_range: matrix.protein_range(),
            peptide_range: matrix.peptide_range(),
            protein_buckets: indexes.bucket_count(AxisName::Protein),
            peptide_buckets: indexes.bucket_count(AxisName::Peptide),
            cells: indexes.cell_count(),
            rows,
            non_empty_cells,
            largest_cell: largest_cell.filter(|(_, count)| *count > 0),
        })
    }

    /// Build a database sized to `source` and fill it with tryptic peptides.
    pub fn from_proteins<S: ProteinSource + ?Sized, P: AsRef<Path>>(
        source: &S,
        path: P,
        config: Config,
        modifications: &ModificationSelection,
    ) -> Result<(Self, PopulateSummary)> {
        let protease = Enzyme::trypsin(&config)?;
        Self::from_proteins_with(source, &protease, path, config, modifications)
    }

    pub fn from_proteins_with<S: ProteinSource + ?Sized, E: Protease + ?Sized, P: AsRef<Path>>(
        source: &S,
        protease: &E,
        path: P,
        config: Config,
        modifications: &ModificationSelection,
    ) -> Result<(Self, PopulateSummary)> {
        let (min_mass, max_mass) = source.mass_range()?;
        let mut db = Self::new(min_mass, max_mass, path, config)?;
        let summary = db.populate(source, protease, modifications)?;
        db.flush()?;
        Ok((db, summary))
    }

    /// Digest every protein of `source` and insert one row per peptide
    /// modification state whose mass falls inside the peptide range.
    pub fn populate<S: ProteinSource + ?Sized, E: Protease + ?Sized>(
        &mut self,
        source: &S,
        protease: &E,
        modifications: &ModificationSelection,
    ) -> Result<PopulateSummary> {
        let mut summary = PopulateSummary::default();
        let indexes = *self.matrix()?.indexes();
        let min_mass = self.config.minimum_peptide_mass;
        let max_mass = self.config.maximum_peptide_mass;
        let max_length = self.config.maximum_peptide_length;
        let max_variable = self.config.max_variable_mods;
        let id_width = self.config.protein_identifier_length;

        for record in source.proteins() {
            let record = record?;
            summary.proteins += 1;
            log::trace!("digesting {} with {}", record.id, protease.name());

            let id = truncate_id(&record.id, id_width);
            for digest in protease.digest(&record.sequence) {
                summary.peptides += 1;
                if digest.sequence.len() > max_length {
                    summary.skipped_length += 1;
                    continue;
                }
                let Ok(mass) = monoisotopic_mass(&digest.sequence) else {
                    summary.skipped_residue += 1;
                    continue;
                };

                for state in modifications.apply(&digest.sequence, mass, max_variable) {
                    // configured bounds as floats, and a bucket the grid has
                    let in_range = state.mass >= min_mass && state.mass <= max_mass;
                    let bucket = indexes.bucket_index(state.mass, AxisName::Peptide);
                    if !in_range || !indexes.peptide_rows().contains(&bucket) {
                        summary.skipped_mass += 1;
                        continue;
                    }
                    let row = PeptideQuery {
                        id: id.to_string(),
                        sequence: digest.sequence.clone(),
                        mods: state.mods,
                        start: digest.start as i64,
                        mass: state.mass,
                    };
                    self.insert(record.mass, &row)?;
                    summary.inserted += 1;
                }
            }
        }

        log::info!(
            "populated {} proteins: {} rows, {} skipped by mass, {} by length, {} by residue",
            summary.proteins,
            summary.inserted,
            summary.skipped_mass,
            summary.skipped_length,
            summary.skipped_residue,
        );
        Ok(summary)
    }
}

/// Cut `id` to at most `width` bytes on a character boundary.
fn truncate_id(id: &str, width: usize) -> &str {
    if id.len() <= width {
        return id;
    }
    let mut end = width;
    while !id.is_char_boundary(end) {
        end -= 1;
    }
    &id[..end]
}

impl Drop for MowseDatabase {
    fn drop(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.flush() {
                log::warn!("failed to flush {} on drop: {}", self.path.display(), e);
            }
        }
    }
}
