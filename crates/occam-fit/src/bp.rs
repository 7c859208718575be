use crate::dense::{expand_to_full, scope_positions};
use occam_core::{VarId, VarSet, VariableRegistry};
use occam_model::RelationCache;

/// Orders relations so each one's overlap with everything already placed is
/// covered by a single earlier relation -- the running-intersection
/// property a decomposable (loopless) model's cliques admit by definition.
/// Greedily picking the next relation with the largest overlap against the
/// union placed so far is the clique-tree analogue of maximum-cardinality
/// search and realizes a valid ordering whenever the underlying hypergraph
/// is chordal.
fn running_intersection_order(relations: &[VarSet]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..relations.len()).collect();
    if remaining.is_empty() {
        return Vec::new();
    }
    let first = remaining.remove(0);
    let mut order = vec![first];
    let mut covered = relations[first].clone();

    while !remaining.is_empty() {
        let (pos, &next) = remaining
            .iter()
            .enumerate()
            .max_by_key(|(_, &idx)| relations[idx].intersection(&covered).len())
            .expect("remaining is non-empty");
        order.push(next);
        covered = covered.union(&relations[next]);
        remaining.remove(pos);
    }
    order
}

/// Exact joint recovery for a loopless model: `P(x) = Π_R ψ_R(x|R) / Π_S
/// μ_S(x|S)` where each separator `S` is a relation's overlap with the
/// relations placed before it. Because every `ψ_R` is the observed marginal
/// projected onto `vars(R)`, the separator marginals agree regardless of
/// which clique they're drawn from, so this closed form is exact without
/// an explicit message-passing loop.
///
/// Clique marginals are pulled from `cache`, so a relation shared by many
/// models in a lattice search (the common case) is only ever projected
/// once.
pub fn fit(registry: &VariableRegistry, cache: &RelationCache, relations: &[VarSet]) -> Vec<f64> {
    let full_scope: Vec<VarId> = registry.all_ids().collect();
    let full_cards = registry.cardinalities_of(&full_scope);
    let full_size: usize = full_cards.iter().product();

    let order = running_intersection_order(relations);
    let mut joint = vec![1.0; full_size];
    let mut covered = VarSet::empty();

    for idx in order {
        let vars = &relations[idx];
        let scope = vars.to_vec();
        let cards = registry.cardinalities_of(&scope);
        let clique = cache.get_or_compute(vars).normalize();
        let positions = scope_positions(&full_scope, &scope);
        let clique_full = expand_to_full(&full_cards, &cards, &positions, &clique.to_dense(), full_size);

        let sep_vars = vars.intersection(&covered);
        if sep_vars.is_empty() {
            for (j, v) in joint.iter_mut().enumerate() {
                *v *= clique_full[j];
            }
        } else {
            let sep_scope = sep_vars.to_vec();
            let sep_cards = registry.cardinalities_of(&sep_scope);
            let sep = clique
                .marginalize(&sep_scope)
                .expect("separator is a subset of the clique's own scope");
            let sep_positions = scope_positions(&full_scope, &sep_scope);
            let sep_full = expand_to_full(&full_cards, &sep_cards, &sep_positions, &sep.to_dense(), full_size);

            for j in 0..full_size {
                let divisor = sep_full[j];
                let ratio = if divisor.abs() < occam_core::EPS_DIVISOR { 0.0 } else { clique_full[j] / divisor };
                joint[j] *= ratio;
            }
        }
        covered = covered.union(vars);
    }
    joint
}

#[cfg(test)]
mod tests {
    use super::*;
    use occam_core::{ContingencyTable, VarId as V};
    use std::sync::Arc;

    fn registry_ab() -> VariableRegistry {
        let mut r = VariableRegistry::new();
        r.declare("Alpha", "A", 2).unwrap();
        r.declare("Beta", "B", 2).unwrap();
        r
    }

    fn ab_table() -> ContingencyTable {
        ContingencyTable::from_counts(
            vec![V(0), V(1)],
            vec![2, 2],
            vec![
                (vec![0, 0], 10.0),
                (vec![0, 1], 20.0),
                (vec![1, 0], 30.0),
                (vec![1, 1], 40.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn saturated_relation_recovers_the_observed_distribution_exactly() {
        let reg = registry_ab();
        let observed = ab_table();
        let cache = RelationCache::new(Arc::new(observed.clone()));
        let joint = fit(&reg, &cache, &[VarSet::from_iter([V(0), V(1)])]);
        let expected = observed.normalize().to_dense();
        for (a, b) in joint.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn independence_model_matches_product_of_marginals() {
        let reg = registry_ab();
        let observed = ab_table();
        let cache = RelationCache::new(Arc::new(observed.clone()));
        let joint = fit(&reg, &cache, &[VarSet::single(V(0)), VarSet::single(V(1))]);
        let p_a = observed.marginalize(&[V(0)]).unwrap().normalize();
        let p_b = observed.marginalize(&[V(1)]).unwrap().normalize();
        for a in 0..2usize {
            for b in 0..2usize {
                let key = (a + b * 2) as u64;
                let expected = p_a.get_assignment(&[a]) * p_b.get_assignment(&[b]);
                assert!((joint[key as usize] - expected).abs() < 1e-9);
            }
        }
    }
}
