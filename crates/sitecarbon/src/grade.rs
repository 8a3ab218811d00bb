//! Letter grades for emission values.
//!
//! One threshold table applies to every emissions model. The models are not
//! unit-comparable, but their outputs are graded identically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter grade, ordered best (`A+`) to worst (`F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

/// Upper bounds (exclusive) in grams, checked in ascending order.
const THRESHOLDS: [(f64, Grade); 5] = [
    (0.5, Grade::APlus),
    (1.0, Grade::A),
    (2.0, Grade::B),
    (3.0, Grade::C),
    (4.0, Grade::D),
];

impl Grade {
    /// Every grade, best first.
    pub const ALL: [Grade; 6] = [
        Grade::APlus,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::F,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown grade '{s}'"))
    }
}

/// Classify an emissions value in grams.
///
/// Total over `f64`: anything not below 4.0 (including NaN) is `F`.
pub fn classify(grams: f64) -> Grade {
    THRESHOLDS
        .iter()
        .find(|(limit, _)| grams < *limit)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}
