use crate::variable::VarId;
use occam_error::{OccamResult, occam_err};

/// Divisor threshold below which a quantity is treated as zero rather than
/// risking a blown-up ratio.
pub const EPS_DIVISOR: f64 = 1e-15;
/// Tolerance for probability-sum and marginal-consistency checks.
pub const EPS_PROB: f64 = 1e-9;

/// C2 — a dense-by-key contingency table over a fixed variable subset
/// `S(T)`. Cells are stored sorted by key with zero-count cells omitted and
/// keys strictly increasing.
///
/// The scope is stored sorted ascending by lattice-position index; the
/// parallel `cards` vector caches each scope variable's cardinality so a
/// `Table` is self-sufficient for marginalization without consulting the
/// registry again.
#[derive(Clone, Debug, PartialEq)]
pub struct ContingencyTable {
    scope: Vec<VarId>,
    cards: Vec<usize>,
    cells: Vec<(u64, f64)>,
}

/// Computes the mixed-radix key for a full assignment over `scope`, ordered
/// ascending by lattice position, using the standard row-major stride
/// convention (`key = Σ t_v · Π_{u<v} k_u`).
pub fn encode_key(assignment: &[usize], cards: &[usize]) -> u64 {
    let mut key = 0u64;
    let mut stride = 1u64;
    for (state, &card) in assignment.iter().zip(cards.iter()) {
        key += (*state as u64) * stride;
        stride *= card as u64;
    }
    key
}

/// Inverse of [`encode_key`]: recovers the per-variable state vector.
pub fn decode_key(mut key: u64, cards: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(cards.len());
    for &card in cards {
        let card = card as u64;
        out.push((key % card) as usize);
        key /= card;
    }
    out
}

impl ContingencyTable {
    /// Builds a table from scratch, aggregating repeated assignments by
    /// summing their counts. `scope` must already be sorted ascending by
    /// lattice-position index (callers hold the registry and can guarantee
    /// this trivially).
    pub fn from_counts(
        scope: Vec<VarId>,
        cards: Vec<usize>,
        assignments: impl IntoIterator<Item = (Vec<usize>, f64)>,
    ) -> OccamResult<Self> {
        let mut by_key: hashbrown::HashMap<u64, f64> = hashbrown::HashMap::new();
        for (assignment, count) in assignments {
            if assignment.len() != scope.len() {
                return Err(occam_err!(
                    InvalidData: "tuple arity {} does not match scope size {}",
                    assignment.len(),
                    scope.len()
                ));
            }
            if count < 0.0 {
                return Err(occam_err!(InvalidData: "observed count {} is negative", count));
            }
            for (state, &card) in assignment.iter().zip(cards.iter()) {
                if *state >= card {
                    return Err(occam_err!(
                        InvalidData: "observed state {} out of range for cardinality {}",
                        state,
                        card
                    ));
                }
            }
            let key = encode_key(&assignment, &cards);
            *by_key.entry(key).or_insert(0.0) += count;
        }

        let mut cells: Vec<(u64, f64)> = by_key.into_iter().filter(|(_, c)| *c != 0.0).collect();
        cells.sort_unstable_by_key(|(k, _)| *k);

        Ok(Self { scope, cards, cells })
    }

    /// An empty table over `scope` (all counts zero).
    pub fn zeros(scope: Vec<VarId>, cards: Vec<usize>) -> Self {
        Self { scope, cards, cells: Vec::new() }
    }

    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    pub fn cards(&self) -> &[usize] {
        &self.cards
    }

    /// Product of the scope's cardinalities — the size of the dense state
    /// space this table ranges over.
    pub fn state_space_size(&self) -> u64 {
        self.cards.iter().fold(1u64, |acc, &k| acc * k as u64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, key: u64) -> f64 {
        self.cells
            .binary_search_by_key(&key, |(k, _)| *k)
            .map(|idx| self.cells[idx].1)
            .unwrap_or(0.0)
    }

    pub fn get_assignment(&self, assignment: &[usize]) -> f64 {
        self.get(encode_key(assignment, &self.cards))
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().map(|(_, c)| c).sum()
    }

    /// Marginalizes onto `target`, which must be a subset of this table's
    /// scope. Complexity is O(|T|): each cell's key is decoded against the
    /// full scope, projected onto `target`'s positions, and re-encoded.
    pub fn marginalize(&self, target: &[VarId]) -> OccamResult<Self> {
        for v in target {
            if !self.scope.contains(v) {
                return Err(occam_err!(
                    Internal: "cannot marginalize onto {:?}: not in scope {:?}",
                    v,
                    self.scope
                ));
            }
        }

        // Position of each target variable within this table's own scope.
        let positions: Vec<usize> = target
            .iter()
            .map(|v| self.scope.iter().position(|s| s == v).unwrap())
            .collect();
        let target_cards: Vec<usize> = positions.iter().map(|&p| self.cards[p]).collect();

        let mut by_key: hashbrown::HashMap<u64, f64> = hashbrown::HashMap::new();
        for &(key, count) in &self.cells {
            let full = decode_key(key, &self.cards);
            let projected: Vec<usize> = positions.iter().map(|&p| full[p]).collect();
            let target_key = encode_key(&projected, &target_cards);
            *by_key.entry(target_key).or_insert(0.0) += count;
        }

        let mut cells: Vec<(u64, f64)> = by_key.into_iter().filter(|(_, c)| *c != 0.0).collect();
        cells.sort_unstable_by_key(|(k, _)| *k);

        Ok(Self {
            scope: target.to_vec(),
            cards: target_cards,
            cells,
        })
    }

    /// Divides every cell by the table's total, returning a probability
    /// table. Cell ordering is preserved.
    pub fn normalize(&self) -> Self {
        let total = self.sum();
        if total.abs() < EPS_DIVISOR {
            return self.clone();
        }
        Self {
            scope: self.scope.clone(),
            cards: self.cards.clone(),
            cells: self.cells.iter().map(|(k, c)| (*k, c / total)).collect(),
        }
    }

    /// Expands a (possibly sparse) probability table into a dense vector
    /// indexed by key, for algorithms that need direct random access over
    /// the full state space (belief propagation potentials, IPF iterates).
    pub fn to_dense(&self) -> Vec<f64> {
        let size = self.state_space_size() as usize;
        let mut dense = vec![0.0; size];
        for &(key, count) in &self.cells {
            dense[key as usize] = count;
        }
        dense
    }

    pub fn from_dense(scope: Vec<VarId>, cards: Vec<usize>, dense: &[f64]) -> Self {
        let cells: Vec<(u64, f64)> = dense
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(k, &v)| (k as u64, v))
            .collect();
        Self { scope, cards, cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(i: usize) -> VarId {
        VarId(i)
    }

    // Vars A,B (k=2 each); counts (0,0)=10,(0,1)=20,(1,0)=30,(1,1)=40 (S1 fixture).
    fn ab_table() -> ContingencyTable {
        ContingencyTable::from_counts(
            vec![vid(0), vid(1)],
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
    fn keys_strictly_increasing_and_sum_matches_n() {
        let t = ab_table();
        let keys: Vec<u64> = t.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(t.sum(), 100.0);
    }

    #[test]
    fn marginalize_to_single_variable() {
        let t = ab_table();
        let a = t.marginalize(&[vid(0)]).unwrap();
        // A=0: 10+20=30, A=1: 30+40=70
        assert_eq!(a.get_assignment(&[0]), 30.0);
        assert_eq!(a.get_assignment(&[1]), 70.0);
    }

    #[test]
    fn marginal_consistency_chain() {
        let t = ab_table();
        let direct = t.marginalize(&[vid(0)]).unwrap();
        let via_full = t.marginalize(&[vid(0), vid(1)]).unwrap().marginalize(&[vid(0)]).unwrap();
        for key in 0..2u64 {
            assert!((direct.get(key) - via_full.get(key)).abs() < EPS_PROB);
        }
    }

    #[test]
    fn normalize_preserves_order_and_sums_to_one() {
        let t = ab_table();
        let p = t.normalize();
        let sum: f64 = p.iter().map(|(_, c)| c).sum();
        assert!((sum - 1.0).abs() < EPS_PROB);
        let keys: Vec<u64> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rejects_negative_counts() {
        let err = ContingencyTable::from_counts(vec![vid(0)], vec![2], vec![(vec![0], -1.0)]).unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidData);
    }

    #[test]
    fn rejects_arity_mismatch() {
        let err =
            ContingencyTable::from_counts(vec![vid(0), vid(1)], vec![2, 2], vec![(vec![0], 1.0)]).unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidData);
    }

    #[test]
    fn dense_round_trip() {
        let t = ab_table();
        let dense = t.to_dense();
        let back = ContingencyTable::from_dense(t.scope().to_vec(), t.cards().to_vec(), &dense);
        assert_eq!(t, back);
    }
}
