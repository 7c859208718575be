use occam_core::{ContingencyTable, VarSet, VariableRegistry};
use std::sync::{Arc, RwLock};

/// C3 — a relation is just the variable subset it projects onto; `Model`
/// and the fit algorithms carry relations directly as `VarSet`s, and a
/// relation's projected table is computed lazily and shared through a
/// [`RelationCache`] since the same subset tends to recur across many
/// models in a lattice search.
///
/// Caches `vars(R) -> marginalize(observed, vars(R))` lookups.
///
/// Reads take a shared lock to clone the cached `Arc`; a miss upgrades to a
/// write lock, computes the marginal once, and inserts it. Two threads
/// racing the same miss will both compute the marginal and one insert wins
/// -- correct and cheap for this workload, since relation tables are small
/// projections and recomputation is not a correctness hazard, only wasted
/// work on the rare first access.
pub struct RelationCache {
    observed: Arc<ContingencyTable>,
    entries: RwLock<hashbrown::HashMap<VarSet, Arc<ContingencyTable>>>,
}

impl RelationCache {
    pub fn new(observed: Arc<ContingencyTable>) -> Self {
        Self {
            observed,
            entries: RwLock::new(hashbrown::HashMap::new()),
        }
    }

    pub fn observed(&self) -> &Arc<ContingencyTable> {
        &self.observed
    }

    pub fn get_or_compute(&self, vars: &VarSet) -> Arc<ContingencyTable> {
        if let Some(table) = self.entries.read().unwrap().get(vars) {
            return Arc::clone(table);
        }

        let scope = vars.to_vec();
        let table = Arc::new(
            self.observed
                .marginalize(&scope)
                .expect("relation scope must be a subset of the observed table's scope"),
        );

        self.entries.write().unwrap().insert(vars.clone(), Arc::clone(&table));
        table
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// Convenience for building a [`VarSet`] from abbreviation strings through a
/// registry -- primarily used by tests and by `occam-lattice`'s parser.
pub fn vars_from_abbrevs(registry: &VariableRegistry, abbrevs: &[&str]) -> occam_error::OccamResult<VarSet> {
    let mut set = VarSet::empty();
    for a in abbrevs {
        set.insert(registry.by_abbrev(a)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use occam_core::ContingencyTable;

    fn registry() -> VariableRegistry {
        let mut r = VariableRegistry::new();
        r.declare("Alpha", "A", 2).unwrap();
        r.declare("Beta", "B", 2).unwrap();
        r
    }

    #[test]
    fn cache_computes_once_and_reuses() {
        let reg = registry();
        let observed = Arc::new(
            ContingencyTable::from_counts(
                vec![occam_core::VarId(0), occam_core::VarId(1)],
                vec![2, 2],
                vec![
                    (vec![0, 0], 10.0),
                    (vec![0, 1], 20.0),
                    (vec![1, 0], 30.0),
                    (vec![1, 1], 40.0),
                ],
            )
            .unwrap(),
        );
        let cache = RelationCache::new(observed);
        let a = vars_from_abbrevs(&reg, &["A"]).unwrap();
        let t1 = cache.get_or_compute(&a);
        let t2 = cache.get_or_compute(&a);
        assert!(Arc::ptr_eq(&t1, &t2));
        assert_eq!(cache.len(), 1);
    }
}
