use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};

/// N-terminal position marker in `Modification::residues`
pub const N_TERM: char = '^';
/// C-terminal position marker in `Modification::residues`
pub const C_TERM: char = '$';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    /// Id written into the `mods` column; never 0
    pub id: i32,
    pub name: String,
    /// Residues it can sit on, plus `^` / `$` for the termini
    pub residues: String,
    pub delta: f64,
}

impl Modification {
    /// Fails for id 0, which marks an unmodified slot.
    pub fn new(id: i32, name: &str, residues: &str, delta: f64) -> Result<Self> {
        if id == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("modification '{}' needs a non-zero id", name),
            ));
        }
        Ok(Self::known(id, name, residues, delta))
    }

    fn known(id: i32, name: &str, residues: &str, delta: f64) -> Self {
        Modification {
            id,
            name: name.to_string(),
            residues: residues.to_string(),
            delta,
        }
    }

    pub fn carbamidomethyl() -> Self {
        Self::known(4, "Carbamidomethyl", "C", 57.021464)
    }

    pub fn oxidation() -> Self {
        Self::known(35, "Oxidation", "M", 15.994915)
    }

    fn targets(&self, slot: usize, sequence: &[u8]) -> bool {
        if slot == 0 {
            self.residues.contains(N_TERM)
        } else if slot == sequence.len() + 1 {
            self.residues.contains(C_TERM)
        } else {
            self.residues.contains(sequence[slot - 1] as char)
        }
    }
}

/// Fixed modifications always apply; variable ones are enumerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationSelection {
    pub fixed: Vec<Modification>,
    pub variable: Vec<Modification>,
}

impl Default for ModificationSelection {
    fn default() -> Self {
        ModificationSelection {
            fixed: vec![Modification::carbamidomethyl()],
            variable: vec![Modification::oxidation()],
        }
    }
}

/// A peptide with one concrete modification state.
///
/// `mods` has one slot per residue plus the two termini: slot 0 is the
/// N-terminus, slot `len + 1` the C-terminus, 0 means unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedPeptide {
    pub mods: Vec<i32>,
    pub mass: f64,
}

impl ModificationSelection {
    pub fn none() -> Self {
        ModificationSelection { fixed: Vec::new(), variable: Vec::new() }
    }

    /// Every modification state of `sequence` with at most `max_variable`
    /// variable modifications, starting from its unmodified `mass`.
    pub fn apply(&self, sequence: &str, mass: f64, max_variable: usize) -> Vec<ModifiedPeptide> {
        let residues = sequence.as_bytes();
        let slots = residues.len() + 2;

        let mut base = ModifiedPeptide { mods: vec![0; slots], mass };
        for slot in 0..slots {
            if let Some(m) = self.fixed.iter().find(|m| m.targets(slot, residues)) {
                base.mods[slot] = m.id;
                base.mass += m.delta;
            }
        }

        // (slot, modification) pairs still open to a variable modification
        let candidates: Vec<(usize, &Modification)> = (0..slots)
            .filter(|slot| base.mods[*slot] == 0)
            .flat_map(|slot| {
                self.variable
                    .iter()
                    .filter(move |m| m.id != 0 && m.targets(slot, residues))
                    .map(move |m| (slot, m))
            })
            .collect();

        let mut out = vec![base.clone()];
        extend_variable(&candidates, 0, max_variable, &mut base, &mut out);
        out
    }
}

fn extend_variable(
    candidates: &[(usize, &Modification)],
    from: usize,
    remaining: usize,
    current: &mut ModifiedPeptide,
    out: &mut Vec<ModifiedPeptide>,
) {
    if remaining == 0 {
        return;
    }
    for i in from..candidates.len() {
        let (slot, m) = candidates[i];
        if current.mods[slot] != 0 {
            continue;
        }
        current.mods[slot] = m.id;
        current.mass += m.delta;
        out.push(current.clone());
        extend_variable(candidates, i + 1, remaining - 1, current, out);
        current.mods[slot] = 0;
        current.mass -= m.delta;
    }
}
