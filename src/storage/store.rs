use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use lru::LruCache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use crate::core::error::{Error, ErrorKind, Result};
use crate::schema::schema::{FieldValue, RowSchema};
use crate::storage::catalog::{Catalog, Node, NodeId, NodeKind};
use crate::storage::file_lock::FileLock;
use crate::storage::layout::StorageLayout;
use crate::storage::table::{self, TableId, TableWriter};

/// How strictly node names are checked on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck {
    /// Names must be natural identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
    Strict,
    /// Any name without a path separator is accepted.
    Relaxed,
}

fn check_name(name: &str, check: NameCheck) -> Result<()> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(Error::new(ErrorKind::InvalidName, format!("'{}' cannot name a node", name)));
    }

    if check == NameCheck::Strict {
        let mut chars = name.chars();
        let natural = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !natural {
            return Err(Error::new(
                ErrorKind::InvalidName,
                format!("'{}' is not a natural identifier", name),
            ));
        }
    }

    Ok(())
}

fn table_entry(catalog: &Catalog, node: NodeId) -> Result<(TableId, &RowSchema)> {
    match &catalog.node(node)?.kind {
        NodeKind::Table { table, schema } => Ok((*table, catalog.schema(*schema)?)),
        NodeKind::Group { .. } => Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("node #{} is a group, not a table", node.0),
        )),
    }
}

/// Hierarchical on-disk store: nested groups with attributes, fixed-schema
/// tables, and hard links that give one table several paths.
///
/// Structural changes live in memory until [`Store::flush`]. Dropping a
/// store without flushing discards them, which is how an interrupted build
/// stays unopenable.
pub struct Store {
    layout: StorageLayout,
    catalog: Catalog,
    writers: LruCache<TableId, TableWriter>,
    dirty: bool,
    _lock: FileLock,
}

impl Store {
    /// Create an empty store. Fails if `path` already holds one.
    pub fn create(path: impl Into<PathBuf>, open_handles: usize) -> Result<Self> {
        let layout = StorageLayout::create(path.into())?;
        let lock = FileLock::acquire(&layout)?;

        if layout.catalog_path().exists() {
            return Err(Error::new(
                ErrorKind::InvalidState,
                format!("a store already exists at {}", layout.base_dir.display()),
            ));
        }

        log::debug!("creating store at {}", layout.base_dir.display());
        Ok(Store {
            catalog: Catalog::new(),
            writers: LruCache::new(Self::capacity(open_handles)?),
            dirty: true,
            _lock: lock,
            layout,
        })
    }

    pub fn open(path: impl Into<PathBuf>, open_handles: usize) -> Result<Self> {
        let layout = StorageLayout::at(path.into());
        if !layout.meta_dir.exists() {
            return Err(Error::not_found(format!("no store at {}", layout.base_dir.display())));
        }
        let lock = FileLock::acquire(&layout)?;
        let catalog = Catalog::load(&layout)?;

        log::debug!(
            "opened store at {} ({} nodes)",
            layout.base_dir.display(),
            catalog.nodes.len()
        );
        Ok(Store {
            catalog,
            writers: LruCache::new(Self::capacity(open_handles)?),
            dirty: false,
            _lock: lock,
            layout,
        })
    }

    fn capacity(open_handles: usize) -> Result<NonZeroUsize> {
        NonZeroUsize::new(open_handles)
            .ok_or_else(|| Error::new(ErrorKind::InvalidArgument, "open_handles must be non-zero"))
    }

    pub fn root(&self) -> NodeId {
        self.catalog.root()
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.catalog.node(id)
    }

    fn children_mut(&mut self, parent: NodeId) -> Result<&mut BTreeMap<String, NodeId>> {
        match &mut self.catalog.node_mut(parent)?.kind {
            NodeKind::Group { children } => Ok(children),
            NodeKind::Table { .. } => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("node #{} is a table, not a group", parent.0),
            )),
        }
    }

    fn insert_child(&mut self, parent: NodeId, name: &str, node: Node) -> Result<NodeId> {
        if self.children_mut(parent)?.contains_key(name) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("'{}' already exists under node #{}", name, parent.0),
            ));
        }
        let id = self.catalog.push(node);
        self.children_mut(parent)?.insert(name.to_string(), id);
        self.dirty = true;
        Ok(id)
    }

    pub fn create_group(&mut self, parent: NodeId, name: &str, title: &str, check: NameCheck) -> Result<NodeId> {
        check_name(name, check)?;
        self.insert_child(parent, name, Node {
            name: name.to_string(),
            parent: Some(parent),
            title: title.to_string(),
            kind: NodeKind::Group { children: BTreeMap::new() },
            attrs: BTreeMap::new(),
            links: 1,
        })
    }

    /// Return the child group `name`, creating it if needed.
    pub fn require_group(&mut self, parent: NodeId, name: &str, check: NameCheck) -> Result<NodeId> {
        match self.child(parent, name) {
            Ok(id) => {
                if self.node(id)?.is_group() {
                    Ok(id)
                } else {
                    Err(Error::new(
                        ErrorKind::InvalidArgument,
                        format!("'{}' exists and is not a group", name),
                    ))
                }
            }
            Err(e) if e.is_not_found() => self.create_group(parent, name, "", check),
            Err(e) => Err(e),
        }
    }

    pub fn create_table(
        &mut self,
        parent: NodeId,
        name: &str,
        title: &str,
        schema: &RowSchema,
        check: NameCheck,
    ) -> Result<NodeId> {
        check_name(name, check)?;
        if schema.record_size() == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "a table needs at least one field"));
        }
        let schema = self.catalog.intern_schema(schema);
        self.insert_child(parent, name, Node {
            name: name.to_string(),
            parent: Some(parent),
            title: title.to_string(),
            kind: NodeKind::Table { table: TableId::new(), schema },
            attrs: BTreeMap::new(),
            links: 1,
        })
    }

    /// Make `target` reachable as `parent/name` as well. Returns `target`.
    pub fn create_hard_link(&mut self, parent: NodeId, name: &str, target: NodeId, check: NameCheck) -> Result<NodeId> {
        check_name(name, check)?;
        self.node(target)?;

        let children = self.children_mut(parent)?;
        if children.contains_key(name) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("'{}' already exists under node #{}", name, parent.0),
            ));
        }
        children.insert(name.to_string(), target);
        self.catalog.node_mut(target)?.links += 1;
        self.dirty = true;
        Ok(target)
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
        match &self.node(parent)?.kind {
            NodeKind::Group { children } => children.get(name).copied().ok_or_else(|| {
                Error::not_found(format!("no child '{}' under {}", name, self.describe(parent)))
            }),
            NodeKind::Table { .. } => Err(Error::not_found(format!(
                "{} is a table and has no children",
                self.describe(parent)
            ))),
        }
    }

    pub fn children(&self, parent: NodeId) -> Result<impl Iterator<Item = (&str, NodeId)>> {
        match &self.node(parent)?.kind {
            NodeKind::Group { children } => Ok(children.iter().map(|(k, v)| (k.as_str(), *v))),
            NodeKind::Table { .. } => Err(Error::new(ErrorKind::InvalidArgument, "tables have no children")),
        }
    }

    /// Resolve an absolute path such as `/mowsematrix/protein/5/2`.
    pub fn resolve(&self, path: &str) -> Result<NodeId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root(), |node, segment| self.child(node, segment))
    }

    /// Canonical path of a node, following the parent it was created under.
    pub fn path_of(&self, id: NodeId) -> Result<String> {
        let mut segments = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.node(parent)?;
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    fn describe(&self, id: NodeId) -> String {
        self.path_of(id).unwrap_or_else(|_| format!("node #{}", id.0))
    }

    pub fn set_attr<T: Serialize>(&mut self, node: NodeId, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.catalog.node_mut(node)?.attrs.insert(name.to_string(), json);
        self.dirty = true;
        Ok(())
    }

    pub fn get_attr<T: DeserializeOwned>(&self, node: NodeId, name: &str) -> Result<T> {
        let json = self.node(node)?.attrs.get(name).ok_or_else(|| {
            Error::not_found(format!("no attribute '{}' on {}", name, self.describe(node)))
        })?;
        Ok(serde_json::from_str(json)?)
    }

    pub fn table_schema(&self, node: NodeId) -> Result<&RowSchema> {
        table_entry(&self.catalog, node).map(|(_, schema)| schema)
    }

    /// Append one row. Handles to recently used tables stay open.
    pub fn append_row(&mut self, node: NodeId, values: &[FieldValue]) -> Result<()> {
        let (table_id, schema) = table_entry(&self.catalog, node)?;
        let record = schema.encode(values)?;

        if !self.writers.contains(&table_id) {
            let writer = TableWriter::open(&self.layout.table_path(&table_id), schema)?;
            self.writers.put(table_id, writer);
        }
        let writer = self
            .writers
            .get_mut(&table_id)
            .ok_or_else(|| Error::new(ErrorKind::Internal, "table writer evicted before use"))?;
        writer.append(&record)
    }

    pub fn read_rows(&self, node: NodeId) -> Result<Vec<Vec<FieldValue>>> {
        let (table_id, schema) = table_entry(&self.catalog, node)?;
        table::read_rows(&self.layout.table_path(&table_id), schema)
    }

    pub fn row_count(&self, node: NodeId) -> Result<u64> {
        let (table_id, schema) = table_entry(&self.catalog, node)?;
        table::row_count(&self.layout.table_path(&table_id), schema)
    }

    /// Sync open tables and persist the catalog if it changed.
    pub fn flush(&mut self) -> Result<()> {
        for (_, writer) in self.writers.iter_mut() {
            writer.sync()?;
        }
        if self.dirty {
            self.catalog.save(&self.layout)?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        log::debug!("closed store at {}", self.layout.base_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema::{FieldType, FieldValue};

    fn schema() -> RowSchema {
        RowSchema::new()
            .add_field("name", FieldType::FixedString(8))
            .add_field("value", FieldType::Float64)
    }

    fn row(name: &str, value: f64) -> Vec<FieldValue> {
        vec![FieldValue::Text(name.to_string()), FieldValue::Float(value)]
    }

    #[test]
    fn strict_names_reject_numbers() {
        assert!(check_name("protein", NameCheck::Strict).is_ok());
        assert_eq!(check_name("5", NameCheck::Strict).unwrap_err().kind, ErrorKind::InvalidName);
        assert!(check_name("5", NameCheck::Relaxed).is_ok());
        assert!(check_name("a/b", NameCheck::Relaxed).is_err());
        assert!(check_name("", NameCheck::Relaxed).is_err());
    }

    #[test]
    fn hard_link_shares_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::create(dir.path(), 4).unwrap();
        let root = store.root();
        let a = store.create_group(root, "a", "", NameCheck::Strict).unwrap();
        let b = store.create_group(root, "b", "", NameCheck::Strict).unwrap();
        let table = store.create_table(a, "t", "data", &schema(), NameCheck::Strict).unwrap();
        let linked = store.create_hard_link(b, "alias", table, NameCheck::Strict).unwrap();

        store.append_row(linked, &row("x", 1.0)).unwrap();
        store.append_row(table, &row("y", 2.0)).unwrap();

        let via_a = store.read_rows(store.resolve("/a/t").unwrap()).unwrap();
        let via_b = store.read_rows(store.resolve("/b/alias").unwrap()).unwrap();
        assert_eq!(via_a.len(), 2);
        assert_eq!(via_a, via_b);
        assert_eq!(store.path_of(linked).unwrap(), "/a/t");
        assert_eq!(store.node(table).unwrap().links, 2);
    }

    #[test]
    fn catalog_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = Store::create(dir.path(), 4).unwrap();
            let root = store.root();
            let g = store.create_group(root, "g", "Group", NameCheck::Strict).unwrap();
            store.set_attr(g, "range", &(1i64, 9i64)).unwrap();
            let t = store.create_table(g, "7", "", &schema(), NameCheck::Relaxed).unwrap();
            store.append_row(t, &row("z", 3.5)).unwrap();
            store.close().unwrap();
        }

        let store = Store::open(dir.path(), 4).unwrap();
        let g = store.resolve("/g").unwrap();
        assert_eq!(store.node(g).unwrap().title, "Group");
        assert_eq!(store.get_attr::<(i64, i64)>(g, "range").unwrap(), (1, 9));
        let t = store.resolve("/g/7").unwrap();
        assert_eq!(store.row_count(t).unwrap(), 1);
    }

    #[test]
    fn unflushed_store_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = Store::create(dir.path(), 4).unwrap();
            let root = store.root();
            store.create_group(root, "g", "", NameCheck::Strict).unwrap();
        }
        let err = Store::open(dir.path(), 4).err().unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn second_handle_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let _store = Store::create(dir.path(), 4).unwrap();
        let err = Store::create(dir.path(), 4).err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::create(dir.path(), 4).unwrap();
        let root = store.root();
        store.create_group(root, "g", "", NameCheck::Strict).unwrap();
        assert!(store.create_group(root, "g", "", NameCheck::Strict).is_err());
        assert_eq!(store.require_group(root, "g", NameCheck::Strict).unwrap(), store.resolve("/g").unwrap());
    }
}
