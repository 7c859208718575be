use occam_core::VariableRegistry;
use occam_model::Model;

/// Refinement order: `M1 <= M2` iff every relation of `M2` is a
/// subset of some relation of `M1`. `children` moves down (coarsening,
/// toward independence); `parents` moves up (refining, toward saturated).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Neighbor-acceptance policy applied before candidates re-enter the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Full,
    Loopless,
    /// Accepts models whose relations are pairwise disjoint in variables.
    /// Does not require full variable coverage -- a disjoint model that
    /// omits a variable leaves it implicitly independent of the rest, same
    /// as any other admissible-or-not model (see `Model::with_implicit_independents`).
    Disjoint,
}

/// Downward (coarsening) neighbors: for each relation `R` of size >= 2,
/// one child replaces `R` with the family `{R \ {v} : v in R}`, leaving
/// every other relation untouched, then canonicalizes.
pub fn children(model: &Model) -> Vec<Model> {
    let relations = model.relations();
    let mut out = Vec::new();

    for (i, r) in relations.iter().enumerate() {
        if r.len() < 2 {
            continue;
        }
        let mut next: Vec<_> = relations
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, x)| x.clone())
            .collect();
        for v in r.to_vec() {
            let mut reduced = r.clone();
            reduced.remove(v);
            next.push(reduced);
        }
        out.push(Model::new(next));
    }
    out
}

/// Upward (refining) neighbors: one candidate per pair of relations merged
/// into their union, plus one candidate per (relation, uncovered variable)
/// pair with that variable added to the relation.
pub fn parents(registry: &VariableRegistry, model: &Model) -> Vec<Model> {
    let relations = model.relations();
    let mut out = Vec::new();

    for i in 0..relations.len() {
        for j in (i + 1)..relations.len() {
            let mut next: Vec<_> = relations
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i && *k != j)
                .map(|(_, x)| x.clone())
                .collect();
            next.push(relations[i].union(&relations[j]));
            out.push(Model::new(next));
        }
    }

    for (i, r) in relations.iter().enumerate() {
        for v in registry.all_ids() {
            if r.contains(v) {
                continue;
            }
            let mut next: Vec<_> = relations
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i)
                .map(|(_, x)| x.clone())
                .collect();
            let mut expanded = r.clone();
            expanded.insert(v);
            next.push(expanded);
            out.push(Model::new(next));
        }
    }
    out
}

/// Dispatches to [`children`] or [`parents`] by search direction.
pub fn neighbors(registry: &VariableRegistry, model: &Model, direction: Direction) -> Vec<Model> {
    match direction {
        Direction::Down => children(model),
        Direction::Up => parents(registry, model),
    }
}

pub fn apply_filter(filter: Filter, candidates: Vec<Model>) -> Vec<Model> {
    match filter {
        Filter::Full => candidates,
        Filter::Loopless => candidates.into_iter().filter(|m| m.is_loopless()).collect(),
        Filter::Disjoint => candidates.into_iter().filter(|m| is_pairwise_disjoint(m)).collect(),
    }
}

fn is_pairwise_disjoint(model: &Model) -> bool {
    let relations = model.relations();
    for i in 0..relations.len() {
        for j in (i + 1)..relations.len() {
            if relations[i].intersects(&relations[j]) {
                return false;
            }
        }
    }
    true
}

/// Filters `candidates` down to those not already present in `visited`,
/// inserting the survivors' canonical identity so a later call against the
/// same set sees them as already visited. Canonical identity is `Model`'s
/// own `Hash`/`Eq` over the sorted sequence of relation bitsets.
pub fn retain_unvisited(candidates: Vec<Model>, visited: &mut hashbrown::HashSet<Model>) -> Vec<Model> {
    candidates.into_iter().filter(|m| visited.insert(m.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use occam_core::{VarId, VarSet};

    fn registry_abcd() -> VariableRegistry {
        let mut r = VariableRegistry::new();
        r.declare("Alpha", "A", 2).unwrap();
        r.declare("Beta", "B", 2).unwrap();
        r.declare("Gamma", "C", 2).unwrap();
        r.declare("Delta", "D", 2).unwrap();
        r
    }

    #[test]
    fn children_of_saturated_splits_off_each_missing_variable() {
        let reg = registry_abcd();
        let model = Model::saturated(&reg);
        let kids = children(&model);
        assert_eq!(kids.len(), 1); // one relation of size >= 2
        assert_eq!(kids[0].arity(), 4); // ABC, ABD, ACD, BCD (4 choose 3)
    }

    #[test]
    fn children_of_independence_model_is_empty() {
        let reg = registry_abcd();
        let model = Model::independence(&reg);
        assert!(children(&model).is_empty());
    }

    #[test]
    fn parents_of_independence_includes_all_pairwise_merges() {
        let reg = registry_abcd();
        let model = Model::independence(&reg);
        let ups = parents(&reg, &model);
        // C(4,2) pairwise merges + 4 relations * 3 other variables each for additions
        assert_eq!(ups.len(), 6 + 4 * 3);
        assert!(ups.iter().any(|m| m.arity() == 3 && m.relations().iter().any(|r| r.len() == 2)));
    }

    #[test]
    fn parents_of_saturated_is_empty() {
        let reg = registry_abcd();
        let model = Model::saturated(&reg);
        assert!(parents(&reg, &model).is_empty());
    }

    #[test]
    fn disjoint_filter_rejects_overlapping_relations() {
        let overlapping = Model::new([
            VarSet::from_iter([VarId(0), VarId(1)]),
            VarSet::from_iter([VarId(1), VarId(2)]),
        ]);
        let disjoint = Model::new([VarSet::from_iter([VarId(0), VarId(1)]), VarSet::single(VarId(2))]);
        let filtered = apply_filter(Filter::Disjoint, vec![overlapping, disjoint.clone()]);
        assert_eq!(filtered, vec![disjoint]);
    }

    #[test]
    fn retain_unvisited_drops_repeats_across_calls() {
        let reg = registry_abcd();
        let mut visited = hashbrown::HashSet::new();
        let seed = Model::independence(&reg);
        visited.insert(seed.clone());
        let first = retain_unvisited(parents(&reg, &seed), &mut visited);
        let again = retain_unvisited(parents(&reg, &seed), &mut visited);
        assert!(!first.is_empty());
        assert!(again.is_empty());
    }
}
