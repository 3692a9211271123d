use std::io::BufRead;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::digest::mass::protein_mass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub id: String,
    pub sequence: String,
    pub mass: f64,
}

impl ProteinRecord {
    /// Record with its mass computed from the sequence. Residues are
    /// uppercased and stop codons (`*`) dropped; ambiguity codes such as `X`
    /// get an estimated mass.
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Result<Self> {
        let sequence: String = sequence
            .into()
            .chars()
            .filter(|c| *c != '*' && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let mass = protein_mass(&sequence)?;
        Ok(ProteinRecord { id: id.into(), sequence, mass })
    }
}

/// Where bulk population reads proteins from.
pub trait ProteinSource {
    /// Lightest and heaviest protein mass in the source.
    fn mass_range(&self) -> Result<(f64, f64)>;

    fn proteins(&self) -> Box<dyn Iterator<Item = Result<ProteinRecord>> + '_>;
}

/// Proteins held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProteins {
    pub records: Vec<ProteinRecord>,
}

impl InMemoryProteins {
    pub fn new(records: Vec<ProteinRecord>) -> Self {
        InMemoryProteins { records }
    }

    /// Read a FASTA file. The accession is the first word of each header.
    pub fn from_fasta<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();
        let mut current: Option<(String, String)> = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if let Some(header) = line.strip_prefix('>') {
                if let Some((id, sequence)) = current.take() {
                    records.push(ProteinRecord::new(id, sequence)?);
                }
                let id = header.split_whitespace().next().unwrap_or_default();
                current = Some((id.to_string(), String::new()));
            } else if !line.is_empty() {
                match current.as_mut() {
                    Some((_, sequence)) => sequence.push_str(line),
                    None => {
                        return Err(Error::new(ErrorKind::Parse, "sequence data before the first FASTA header"));
                    }
                }
            }
        }
        if let Some((id, sequence)) = current {
            records.push(ProteinRecord::new(id, sequence)?);
        }

        Ok(InMemoryProteins { records })
    }
}

impl ProteinSource for InMemoryProteins {
    fn mass_range(&self) -> Result<(f64, f64)> {
        let mut masses = self.records.iter().map(|r| r.mass);
        let first = masses
            .next()
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "protein source is empty"))?;
        Ok(masses.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m))))
    }

    fn proteins(&self) -> Box<dyn Iterator<Item = Result<ProteinRecord>> + '_> {
        Box::new(self.records.iter().cloned().map(Ok))
    }
}
