use crate::loopiness::is_loopless;
use occam_core::{VarId, VarSet, VariableRegistry};

/// C3 — a model is a canonical set of relations (variable subsets). Adding a
/// relation that is a subset of an existing one is a no-op; adding one that
/// is a superset of existing relations drops them -- the set a model stores
/// is always an antichain under `is_subset_of`.
#[derive(Clone, Debug)]
pub struct Model {
    relations: Vec<VarSet>,
    loopless: bool,
}

impl Model {
    /// Builds a model from an arbitrary list of relation scopes, applying
    /// dominance reduction and canonical ordering.
    pub fn new(relations: impl IntoIterator<Item = VarSet>) -> Self {
        let mut reduced: Vec<VarSet> = Vec::new();
        for vars in relations {
            add_relation(&mut reduced, vars);
        }
        canonicalize(&mut reduced);
        let loopless = is_loopless(&reduced);
        Self { relations: reduced, loopless }
    }

    /// The saturated model: a single relation over every variable in the
    /// registry. DDF = 0, LR = 0 by construction once fit.
    pub fn saturated(registry: &VariableRegistry) -> Self {
        Self::new([registry.all()])
    }

    /// The independence model: one singleton relation per variable.
    pub fn independence(registry: &VariableRegistry) -> Self {
        Self::new(registry.all_ids().map(VarSet::single))
    }

    pub fn relations(&self) -> &[VarSet] {
        &self.relations
    }

    pub fn arity(&self) -> usize {
        self.relations.len()
    }

    /// Union of every relation's scope. May be a strict subset of the full
    /// registry if the model leaves some variables uncovered; see
    /// [`Model::with_implicit_independents`].
    pub fn variables(&self) -> VarSet {
        self.relations
            .iter()
            .fold(VarSet::empty(), |acc, r| acc.union(r))
    }

    pub fn is_loopless(&self) -> bool {
        self.loopless
    }

    /// A model need not cover every registry variable explicitly; any
    /// variable missing from every relation is implicitly independent of
    /// the rest. This materializes singleton relations for those variables
    /// without mutating the stored canonical set, so callers computing DF
    /// or fitting a distribution see the full picture while `relations()`
    /// still reports what the search actually added.
    pub fn with_implicit_independents(&self, registry: &VariableRegistry) -> Vec<VarSet> {
        let covered = self.variables();
        let mut out = self.relations.clone();
        for v in registry.all_ids() {
            if !covered.contains(v) {
                out.push(VarSet::single(v));
            }
        }
        out
    }

    /// Canonical model identity for hashing/equality/visited-sets: relations
    /// sorted by descending size then by ascending sorted-`VarId` vector.
    /// This is distinct from the external model-string format, which
    /// additionally needs variable abbreviations from a registry and so
    /// lives in `occam-lattice`.
    pub fn canonical_key(&self) -> Vec<Vec<VarId>> {
        self.relations.iter().map(|r| r.to_vec()).collect()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}
impl Eq for Model {}

impl std::hash::Hash for Model {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

/// Inserts `new_vars` into `relations`, dropping it if it's dominated by (a
/// subset of, including equal to) an existing relation, and removing any
/// existing relations it dominates in turn.
pub(crate) fn add_relation(relations: &mut Vec<VarSet>, new_vars: VarSet) {
    if relations.iter().any(|r| new_vars.is_subset_of(r)) {
        tracing::debug!(vars = ?new_vars, "relation dropped as subset-dominated");
        return;
    }
    relations.retain(|r| !r.is_subset_of(&new_vars));
    relations.push(new_vars);
}

fn canonicalize(relations: &mut [VarSet]) {
    relations.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.to_vec().cmp(&b.to_vec()))
    });
}
