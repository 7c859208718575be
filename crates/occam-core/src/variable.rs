use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A variable's position in the registry's lattice order. Stable for the
/// lifetime of the registry that produced it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarId(pub usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A declared discrete variable: a stable name, a short abbreviation used in
/// model expressions, and a cardinality (number of observable states).
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    pub id: VarId,
    pub name: String,
    pub abbrev: String,
    pub cardinality: usize,
}

impl Variable {
    pub fn new(id: VarId, name: impl Into<String>, abbrev: impl Into<String>, cardinality: usize) -> Self {
        Self {
            id,
            name: name.into(),
            abbrev: abbrev.into(),
            cardinality,
        }
    }
}
