use crate::core::error::{Error, ErrorKind, Result};

pub const H2O: f64 = 18.010565;

/// Monoisotopic residue mass of a one-letter amino acid code.
pub fn residue_mass(residue: u8) -> Option<f64> {
    let mass = match residue {
        b'G' => 57.021464,
        b'A' => 71.037114,
        b'S' => 87.032028,
        b'P' => 97.052764,
        b'V' => 99.068414,
        b'T' => 101.047679,
        b'C' => 103.009185,
        b'L' | b'I' => 113.084064,
        b'N' => 114.042927,
        b'D' => 115.026943,
        b'Q' => 128.058578,
        b'K' => 128.094963,
        b'E' => 129.042593,
        b'M' => 131.040485,
        b'H' => 137.058912,
        b'F' => 147.068414,
        b'U' => 150.953633,
        b'R' => 156.101111,
        b'Y' => 163.063329,
        b'W' => 186.079313,
        b'O' => 237.147727,
        _ => return None,
    };
    Some(mass)
}

/// Unmodified monoisotopic mass of a peptide or protein sequence.
pub fn monoisotopic_mass(sequence: &str) -> Result<f64> {
    sequence.bytes().try_fold(H2O, |total, residue| {
        residue_mass(residue).map(|m| total + m).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("unknown residue '{}' in {}", residue as char, sequence),
            )
        })
    })
}

/// Stand-in mass for an ambiguity code: the mean of the residues it may be,
/// or an average residue for `X`.
pub fn ambiguous_residue_mass(residue: u8) -> Option<f64> {
    let mass = match residue {
        b'B' => 114.534935, // N or D
        b'Z' => 128.550586, // Q or E
        b'J' => 113.084064, // I or L
        b'X' => 111.1,
        _ => return None,
    };
    Some(mass)
}

/// Monoisotopic mass of a protein sequence, estimating ambiguity codes with
/// [`ambiguous_residue_mass`]. Peptides still go through
/// [`monoisotopic_mass`] and are rejected on any ambiguity.
pub fn protein_mass(sequence: &str) -> Result<f64> {
    sequence.bytes().try_fold(H2O, |total, residue| {
        residue_mass(residue)
            .or_else(|| ambiguous_residue_mass(residue))
            .map(|m| total + m)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("unknown residue '{}' in {}", residue as char, sequence),
                )
            })
    })
}
