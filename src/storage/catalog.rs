use std::collections::BTreeMap;
use std::fs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::schema::schema::RowSchema;
use crate::storage::layout::StorageLayout;
use crate::storage::table::TableId;

/// Index of a node in the catalog arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index of an interned row schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Group {
        children: BTreeMap<String, NodeId>,
    },
    Table {
        table: TableId,
        schema: SchemaId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,     // Canonical parent; hard links add more
    pub title: String,
    pub kind: NodeKind,
    pub attrs: BTreeMap<String, String>,    // JSON encoded values
    pub links: u32,                 // Number of names referring to this node
}

impl Node {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }
}

/// Every node, schema and attribute of a store. Persisted as one bincode
/// blob followed by a CRC32 trailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub schemas: Vec<RowSchema>,
}

impl Catalog {
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        let now = Utc::now();
        Catalog {
            version: Self::VERSION,
            created_at: now,
            updated_at: now,
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                title: String::new(),
                kind: NodeKind::Group { children: BTreeMap::new() },
                attrs: BTreeMap::new(),
                links: 1,
            }],
            schemas: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| Error::not_found(format!("no node #{}", id.0)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::not_found(format!("no node #{}", id.0)))
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Reuse an equal schema if one is already stored.
    pub fn intern_schema(&mut self, schema: &RowSchema) -> SchemaId {
        if let Some(pos) = self.schemas.iter().position(|s| s == schema) {
            return SchemaId(pos as u32);
        }
        self.schemas.push(schema.clone());
        SchemaId((self.schemas.len() - 1) as u32)
    }

    pub fn schema(&self, id: SchemaId) -> Result<&RowSchema> {
        self.schemas
            .get(id.0 as usize)
            .ok_or_else(|| Error::new(ErrorKind::Corrupted, format!("no schema #{}", id.0)))
    }

    pub fn load(layout: &StorageLayout) -> Result<Self> {
        let path = layout.catalog_path();
        if !path.exists() {
            return Err(Error::not_found(format!(
                "no catalog at {}; the store was never flushed",
                path.display()
            )));
        }

        let data = fs::read(&path)?;
        if data.len() < 4 {
            return Err(Error::new(ErrorKind::Corrupted, "catalog is truncated"));
        }
        let (body, trailer) = data.split_at(data.len() - 4);
        let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        if crc32fast::hash(body) != expected {
            return Err(Error::new(ErrorKind::Corrupted, "catalog checksum mismatch"));
        }

        let catalog: Catalog = bincode::deserialize(body)?;
        if catalog.version != Self::VERSION {
            return Err(Error::new(
                ErrorKind::Corrupted,
                format!("incompatible catalog version {}", catalog.version),
            ));
        }
        Ok(catalog)
    }

    /// Write to a temporary file, then rename over the previous catalog.
    pub fn save(&mut self, layout: &StorageLayout) -> Result<()> {
        self.updated_at = Utc::now();

        let mut data = bincode::serialize(self)?;
        let crc = crc32fast::hash(&data);
        data.extend_from_slice(&crc.to_le_bytes());

        let path = layout.catalog_path();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema::PeptideQuery;

    #[test]
    fn schemas_are_interned() {
        let mut catalog = Catalog::new();
        let a = catalog.intern_schema(&PeptideQuery::schema(10, 20));
        let b = catalog.intern_schema(&PeptideQuery::schema(10, 20));
        let c = catalog.intern_schema(&PeptideQuery::schema(10, 21));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(catalog.schemas.len(), 2);
    }

    #[test]
    fn corrupted_catalog_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path().to_path_buf()).unwrap();
        Catalog::new().save(&layout).unwrap();

        let path = layout.catalog_path();
        let mut data = fs::read(&path).unwrap();
        data[0] ^= 0xff;
        fs::write(&path, data).unwrap();

        let err = Catalog::load(&layout).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Corrupted);
    }

    #[test]
    fn missing_catalog_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path().to_path_buf()).unwrap();
        assert!(Catalog::load(&layout).unwrap_err().is_not_found());
    }
}
