use regex::Regex;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};

/// A peptide cut out of a protein
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub sequence: String,
    /// Offset of the first residue within the protein
    pub start: usize,
    pub missed_cleavages: usize,
}

pub trait Protease {
    fn name(&self) -> &str;

    fn digest(&self, sequence: &str) -> Vec<Digest>;
}

/// Rule-based enzyme: cleave after any residue in `cleave_at`, unless the
/// next residue is `restrict`.
#[derive(Debug, Clone)]
pub struct Enzyme {
    name: String,
    site: Regex,
    restrict: Option<char>,
    missed_cleavages: usize,
    min_len: usize,
    max_len: usize,
}

impl Enzyme {
    pub fn new(
        name: &str,
        cleave_at: &str,
        restrict: Option<char>,
        missed_cleavages: usize,
        min_len: usize,
        max_len: usize,
    ) -> Result<Self> {
        if cleave_at.is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument, "an enzyme needs at least one cleavage residue"));
        }
        let pattern = format!("[{}]", regex::escape(cleave_at));
        let site = Regex::new(&pattern)
            .map_err(|e| Error::new(ErrorKind::InvalidArgument, format!("bad cleavage rule: {}", e)))?;

        Ok(Enzyme {
            name: name.to_string(),
            site,
            restrict,
            missed_cleavages,
            min_len,
            max_len,
        })
    }

    /// Trypsin with digestion limits from `config`.
    pub fn trypsin(config: &Config) -> Result<Self> {
        Self::new(
            "Trypsin",
            "KR",
            Some('P'),
            config.missed_cleavages,
            config.minimum_peptide_length,
            config.maximum_peptide_length,
        )
    }

    fn cleavage_sites(&self, sequence: &str) -> Vec<usize> {
        let bytes = sequence.as_bytes();
        let mut sites = vec![0];
        for m in self.site.find_iter(sequence) {
            let end = m.end();
            let restricted = self.restrict.is_some_and(|r| bytes.get(end).is_some_and(|b| *b as char == r));
            if end < bytes.len() && !restricted {
                sites.push(end);
            }
        }
        sites.push(bytes.len());
        sites
    }
}

impl Protease for Enzyme {
    fn name(&self) -> &str {
        &self.name
    }

    fn digest(&self, sequence: &str) -> Vec<Digest> {
        let sites = self.cleavage_sites(sequence);
        let mut digests = Vec::new();

        for i in 0..sites.len() - 1 {
            for missed in 0..=self.missed_cleavages {
                let j = i + 1 + missed;
                if j >= sites.len() {
                    break;
                }
                let len = sites[j] - sites[i];
                if len > self.max_len {
                    break;
                }
                if len >= self.min_len {
                    digests.push(Digest {
                        sequence: sequence[sites[i]..sites[j]].to_string(),
                        start: sites[i],
                        missed_cleavages: missed,
                    });
                }
            }
        }

        digests
    }
}
