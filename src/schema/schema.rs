use bytes::{Buf, BufMut};
use serde::{Serialize, Deserialize};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};

/// Column definition with a fixed on-disk width
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// NUL padded UTF-8, `width` bytes
    FixedString(usize),
    /// `len` little-endian i32 values
    IntVector(usize),
    Int64,
    Float64,
}

impl FieldType {
    pub fn size(&self) -> usize {
        match self {
            FieldType::FixedString(width) => *width,
            FieldType::IntVector(len) => len * 4,
            FieldType::Int64 | FieldType::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integers(Vec<i32>),
    Integer(i64),
    Float(f64),
}

/// Fixed-width row layout. Every row of a table occupies `record_size()` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowSchema {
    pub fields: Vec<FieldDefinition>,
}

impl RowSchema {
    pub fn new() -> Self {
        RowSchema { fields: Vec::new() }
    }

    pub fn add_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            field_type,
        });
        self
    }

    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.size()).sum()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// CRC32 over the serialized layout, stored in table headers.
    pub fn checksum(&self) -> Result<u32> {
        let data = bincode::serialize(self)?;
        Ok(crc32fast::hash(&data))
    }

    pub fn encode(&self, values: &[FieldValue]) -> Result<Vec<u8>> {
        if values.len() != self.fields.len() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("expected {} fields, got {}", self.fields.len(), values.len()),
            ));
        }

        let mut buf = Vec::with_capacity(self.record_size());
        for (field, value) in self.fields.iter().zip(values) {
            match (field.field_type, value) {
                (FieldType::FixedString(width), FieldValue::Text(text)) => {
                    let bytes = text.as_bytes();
                    if bytes.len() > width {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("field '{}' holds {} bytes, value has {}", field.name, width, bytes.len()),
                        ));
                    }
                    buf.put_slice(bytes);
                    buf.put_bytes(0, width - bytes.len());
                }
                (FieldType::IntVector(len), FieldValue::Integers(ints)) => {
                    if ints.len() > len {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("field '{}' holds {} values, got {}", field.name, len, ints.len()),
                        ));
                    }
                    for v in ints {
                        buf.put_i32_le(*v);
                    }
                    buf.put_bytes(0, (len - ints.len()) * 4);
                }
                (FieldType::Int64, FieldValue::Integer(v)) => buf.put_i64_le(*v),
                (FieldType::Float64, FieldValue::Float(v)) => buf.put_f64_le(*v),
                (field_type, value) => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("field '{}' is {:?}, got {:?}", field.name, field_type, value),
                    ));
                }
            }
        }

        Ok(buf)
    }

    pub fn decode(&self, mut record: &[u8]) -> Result<Vec<FieldValue>> {
        if record.len() != self.record_size() {
            return Err(Error::new(
                ErrorKind::Corrupted,
                format!("record is {} bytes, schema needs {}", record.len(), self.record_size()),
            ));
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match field.field_type {
                FieldType::FixedString(width) => {
                    let raw = &record[..width];
                    let end = raw.iter().position(|b| *b == 0).unwrap_or(width);
                    let text = std::str::from_utf8(&raw[..end])
                        .map_err(|_| Error::new(ErrorKind::Parse, format!("invalid UTF-8 in '{}'", field.name)))?
                        .to_string();
                    record.advance(width);
                    FieldValue::Text(text)
                }
                FieldType::IntVector(len) => {
                    let ints = (0..len).map(|_| record.get_i32_le()).collect();
                    FieldValue::Integers(ints)
                }
                FieldType::Int64 => FieldValue::Integer(record.get_i64_le()),
                FieldType::Float64 => FieldValue::Float(record.get_f64_le()),
            };
            values.push(value);
        }

        Ok(values)
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Row stored in every matrix cell: one peptide of one protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideQuery {
    pub id: String,
    pub sequence: String,
    /// Per-position modification ids; index 0 is the N-terminus and the
    /// last slot the C-terminus.
    pub mods: Vec<i32>,
    pub start: i64,
    pub mass: f64,
}

impl PeptideQuery {
    /// Row layout sized from `maximum_peptide_length` and
    /// `protein_identifier_length`. Call once per matrix build.
    pub fn description(config: &Config) -> RowSchema {
        Self::schema(config.protein_identifier_length, config.maximum_peptide_length)
    }

    pub fn schema(max_id: usize, max_peptide: usize) -> RowSchema {
        RowSchema::new()
            .add_field("id", FieldType::FixedString(max_id))
            .add_field("sequence", FieldType::FixedString(max_peptide))
            .add_field("mods", FieldType::IntVector(max_peptide + 2))
            .add_field("start", FieldType::Int64)
            .add_field("mass", FieldType::Float64)
    }

    pub fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.id.clone()),
            FieldValue::Text(self.sequence.clone()),
            FieldValue::Integers(self.mods.clone()),
            FieldValue::Integer(self.start),
            FieldValue::Float(self.mass),
        ]
    }

    pub fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        match <[FieldValue; 5]>::try_from(values) {
            Ok([
                FieldValue::Text(id),
                FieldValue::Text(sequence),
                FieldValue::Integers(mods),
                FieldValue::Integer(start),
                FieldValue::Float(mass),
            ]) => Ok(PeptideQuery { id, sequence, mods, start, mass }),
            _ => Err(Error::new(ErrorKind::Parse, "row does not match the PeptideQuery layout")),
        }
    }
}
