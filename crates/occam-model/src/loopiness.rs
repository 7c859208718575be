use occam_core::{VarId, VarSet};
use hashbrown::HashMap;

/// Builds the primal (variable-intersection) graph implied by a set of
/// relations: two variables are adjacent iff some relation's scope
/// contains both of them. Relations are the graph's cliques by
/// construction, so this is already the moralized graph -- no separate
/// moralization step is needed for purely discrete, undirected relations.
fn primal_graph(relations: &[VarSet]) -> HashMap<VarId, VarSet> {
    let mut adj: HashMap<VarId, VarSet> = HashMap::new();
    for r in relations {
        let members = r.to_vec();
        for &v in &members {
            adj.entry(v).or_insert_with(VarSet::empty);
        }
        for i in 0..members.len() {
            for j in 0..members.len() {
                if i != j {
                    adj.get_mut(&members[i]).unwrap().insert(members[j]);
                }
            }
        }
    }
    adj
}

/// Maximum Cardinality Search: returns a rank for every vertex (0 = first
/// eliminated) such that processing vertices in ascending rank and checking
/// the later-neighbor clique condition tests chordality (Tarjan &
/// Yannakakis, 1984).
fn mcs_rank(adj: &HashMap<VarId, VarSet>) -> HashMap<VarId, usize> {
    let n = adj.len();
    let mut weight: HashMap<VarId, usize> = adj.keys().map(|&v| (v, 0)).collect();
    let mut numbered: HashMap<VarId, bool> = adj.keys().map(|&v| (v, false)).collect();
    let mut rank: HashMap<VarId, usize> = HashMap::new();

    for step in (0..n).rev() {
        let next = *weight
            .iter()
            .filter(|(v, _)| !numbered[*v])
            .max_by_key(|(_, w)| **w)
            .map(|(v, _)| v)
            .expect("adj has at least one unnumbered vertex while steps remain");
        rank.insert(next, step);
        numbered.insert(next, true);
        for u in adj[&next].iter() {
            if !numbered[&u] {
                *weight.get_mut(&u).unwrap() += 1;
            }
        }
    }
    rank
}

/// A model is loopless iff its relations' primal graph is chordal: the MCS
/// ordering it produces is a perfect elimination ordering with no fill-in
/// required. This is the test for whether BP (exact, loopless) or IPF
/// (iterative, loopy) is the applicable fit algorithm.
pub fn is_loopless(relations: &[VarSet]) -> bool {
    let adj = primal_graph(relations);
    if adj.len() <= 2 {
        return true; // 0, 1 or 2 variables: always chordal
    }
    let rank = mcs_rank(&adj);

    let mut ordered: Vec<VarId> = adj.keys().copied().collect();
    ordered.sort_by_key(|v| rank[v]);

    for &v in &ordered {
        let later: Vec<VarId> = adj[&v]
            .iter()
            .filter(|u| rank[u] > rank[&v])
            .collect();
        if later.is_empty() {
            continue;
        }
        let parent = *later.iter().min_by_key(|u| rank[u]).unwrap();
        for &u in &later {
            if u == parent {
                continue;
            }
            if !adj[&parent].contains(u) {
                return false;
            }
        }
    }
    true
}
