use occam_core::{VarId, decode_key, encode_key};

/// Maps each of `sub_scope`'s variables to its position within `full_scope`,
/// so a full-scope assignment can be projected onto a relation's scope
/// without re-deriving the mapping per cell.
pub(crate) fn scope_positions(full_scope: &[VarId], sub_scope: &[VarId]) -> Vec<usize> {
    sub_scope
        .iter()
        .map(|v| {
            full_scope
                .iter()
                .position(|u| u == v)
                .expect("relation scope must be a subset of the full variable scope")
        })
        .collect()
}

/// Expands a dense probability vector over `sub_scope` to a dense vector
/// over `full_scope`, by projecting every full-space key down onto the
/// relation's positions and looking up the corresponding sub-space cell.
/// `positions` comes from [`scope_positions`].
pub(crate) fn expand_to_full(
    full_cards: &[usize],
    sub_cards: &[usize],
    positions: &[usize],
    sub_dense: &[f64],
    full_size: usize,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(full_size);
    for key in 0..full_size as u64 {
        let full_assignment = decode_key(key, full_cards);
        let sub_assignment: Vec<usize> = positions.iter().map(|&p| full_assignment[p]).collect();
        let sub_key = encode_key(&sub_assignment, sub_cards);
        out.push(sub_dense[sub_key as usize]);
    }
    out
}
