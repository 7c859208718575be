use crate::varset::VarSet;
use crate::variable::{VarId, Variable};
use hashbrown::HashMap;
use occam_error::{OccamResult, occam_err};

/// C1 — declares variables, their cardinalities, and the stable
/// tuple<->index encoding every other component builds on.
///
/// Abbreviations are unique within a registry and cardinalities are
/// immutable once declared.
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    by_abbrev: HashMap<String, VarId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable, assigning it the next lattice-position
    /// index. Fails with `DuplicateAbbrev` or `InvalidCardinality`.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        abbrev: impl Into<String>,
        cardinality: usize,
    ) -> OccamResult<VarId> {
        let abbrev = abbrev.into();
        if cardinality < 2 {
            return Err(occam_err!(
                InvalidCardinality: "variable {:?} declared with cardinality {} (< 2)",
                abbrev,
                cardinality
            ));
        }
        if self.by_abbrev.contains_key(&abbrev) {
            return Err(occam_err!(DuplicateAbbrev: "abbreviation {:?} already registered", abbrev));
        }

        let id = VarId(self.variables.len());
        self.variables.push(Variable::new(id, name, abbrev.clone(), cardinality));
        self.by_abbrev.insert(abbrev, id);
        Ok(id)
    }

    pub fn by_abbrev(&self, abbrev: &str) -> OccamResult<VarId> {
        self.by_abbrev
            .get(abbrev)
            .copied()
            .ok_or_else(|| occam_err!(ParseModel: "unknown variable abbreviation {:?}", abbrev))
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn cardinality(&self, id: VarId) -> usize {
        self.variables[id.0].cardinality
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All declared variables, in lattice-position order.
    pub fn all_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.variables.len()).map(VarId)
    }

    pub fn all(&self) -> VarSet {
        VarSet::from_iter(self.all_ids())
    }

    /// Encodes a subset of variables as a bitset keyed by lattice position.
    pub fn mask(&self, vars: impl IntoIterator<Item = VarId>) -> VarSet {
        VarSet::from_iter(vars)
    }

    /// Cardinalities of the given variables, in the order given. Used to
    /// build the mixed-radix stride table for a contingency table's scope.
    pub fn cardinalities_of(&self, vars: &[VarId]) -> Vec<usize> {
        vars.iter().map(|&v| self.cardinality(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_assigns_sequential_ids() {
        let mut reg = VariableRegistry::new();
        let a = reg.declare("Alpha", "A", 2).unwrap();
        let b = reg.declare("Beta", "B", 3).unwrap();
        assert_eq!(a, VarId(0));
        assert_eq!(b, VarId(1));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn rejects_low_cardinality() {
        let mut reg = VariableRegistry::new();
        let err = reg.declare("Alpha", "A", 1).unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidCardinality);
    }

    #[test]
    fn rejects_duplicate_abbrev() {
        let mut reg = VariableRegistry::new();
        reg.declare("Alpha", "A", 2).unwrap();
        let err = reg.declare("Alt", "A", 2).unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::DuplicateAbbrev);
    }

    #[test]
    fn by_abbrev_round_trips() {
        let mut reg = VariableRegistry::new();
        let a = reg.declare("Alpha", "A", 2).unwrap();
        assert_eq!(reg.by_abbrev("A").unwrap(), a);
        assert!(reg.by_abbrev("Z").is_err());
    }
}
