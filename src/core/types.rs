use std::fmt;
use std::ops::Div;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Which of the two grid axes (and matching view) a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisName {
    Protein,
    Peptide,
}

impl AxisName {
    pub fn other(self) -> Self {
        match self {
            AxisName::Protein => AxisName::Peptide,
            AxisName::Peptide => AxisName::Protein,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AxisName::Protein => "protein",
            AxisName::Peptide => "peptide",
        }
    }
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! mass_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub min: i64,
            pub max: i64,
        }

        impl $name {
            /// Bounds are truncated to whole Daltons.
            pub fn new(min: f64, max: f64) -> Self {
                $name { min: min as i64, max: max as i64 }
            }

            pub fn try_new(min: f64, max: f64) -> Result<Self> {
                let range = Self::new(min, max);
                if range.min > range.max {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        format!("{}: min {} exceeds max {}", stringify!($name), range.min, range.max),
                    ));
                }
                Ok(range)
            }

            /// Both bounds floor-divided by `width`.
            pub fn floor_div(&self, width: i64) -> Self {
                $name {
                    min: self.min.div_euclid(width),
                    max: self.max.div_euclid(width),
                }
            }

            pub fn true_div(&self, width: f64) -> (f64, f64) {
                (self.min as f64 / width, self.max as f64 / width)
            }

            pub fn contains(&self, mass: f64) -> bool {
                mass >= self.min as f64 && mass <= self.max as f64
            }
        }

        impl Div<i64> for $name {
            type Output = $name;

            fn div(self, width: i64) -> $name {
                self.floor_div(width)
            }
        }
    };
}

mass_range!(
    /// Protein mass bounds in Daltons.
    ProteinRange
);

mass_range!(
    /// Peptide mass bounds in Daltons.
    PeptideRange
);

/// Bucket widths in Daltons, fixed for the lifetime of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MowseInterval {
    pub protein: i64,
    pub peptide: i64,
}

impl MowseInterval {
    pub fn width(&self, axis: AxisName) -> i64 {
        match axis {
            AxisName::Protein => self.protein,
            AxisName::Peptide => self.peptide,
        }
    }
}

/// A grid cell in bucket coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub protein: i64,
    pub peptide: i64,
}

impl Point {
    pub fn new(protein: i64, peptide: i64) -> Self {
        Point { protein, peptide }
    }

    pub fn get(&self, axis: AxisName) -> i64 {
        match axis {
            AxisName::Protein => self.protein,
            AxisName::Peptide => self.peptide,
        }
    }
}
