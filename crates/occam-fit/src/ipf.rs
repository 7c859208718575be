use crate::dense::{expand_to_full, scope_positions};
use occam_core::{VarId, VarSet, VariableRegistry, decode_key, encode_key};
use occam_model::RelationCache;

const MAX_ITERATIONS: usize = 500;
const CONVERGENCE_THRESHOLD: f64 = 1e-8;

pub struct IpfResult {
    pub joint: Vec<f64>,
    pub converged: bool,
    pub iterations: usize,
}

struct RelationTarget {
    positions: Vec<usize>,
    cards: Vec<usize>,
    target_full: Vec<f64>,
}

/// Iterative Proportional Fitting for a loopy model: repeatedly rescales the
/// current joint so each relation's marginal matches the observed marginal,
/// cycling through relations in a fixed order until the largest per-cell
/// change drops below the convergence threshold or the iteration cap is hit.
///
/// Each relation's target marginal is pulled from `cache` once up front, so a
/// relation shared across many models in a lattice search is projected only
/// the first time any model needs it.
pub fn fit(registry: &VariableRegistry, cache: &RelationCache, relations: &[VarSet]) -> IpfResult {
    let full_scope: Vec<VarId> = registry.all_ids().collect();
    let full_cards = registry.cardinalities_of(&full_scope);
    let full_size: usize = full_cards.iter().product();

    let targets: Vec<RelationTarget> = relations
        .iter()
        .map(|vars| {
            let scope = vars.to_vec();
            let cards = registry.cardinalities_of(&scope);
            let marginal = cache.get_or_compute(vars).normalize();
            let positions = scope_positions(&full_scope, &scope);
            let target_full = expand_to_full(&full_cards, &cards, &positions, &marginal.to_dense(), full_size);
            RelationTarget { positions, cards, target_full }
        })
        .collect();

    // Product-of-marginals start: each relation's target marginal contributes
    // a factor, renormalized once at the end. Converges faster in practice
    // than a uniform start while still reaching the same fixed point.
    let mut joint = vec![1.0; full_size];
    for target in &targets {
        for (j, v) in joint.iter_mut().enumerate() {
            *v *= target.target_full[j];
        }
    }
    normalize_in_place(&mut joint);

    let mut iterations = 0;
    let mut converged = false;

    for t in 1..=MAX_ITERATIONS {
        let mut max_delta = 0.0f64;
        for target in targets.iter() {
            let current_marginal = marginalize_dense(&full_cards, &target.positions, &target.cards, &joint);
            let current_full =
                expand_to_full(&full_cards, &target.cards, &target.positions, &current_marginal, full_size);

            for j in 0..full_size {
                let divisor = current_full[j];
                let ratio = if divisor.abs() < occam_core::EPS_DIVISOR { 0.0 } else { target.target_full[j] / divisor };
                let updated = joint[j] * ratio;
                max_delta = max_delta.max((updated - joint[j]).abs());
                joint[j] = updated;
            }
        }
        iterations = t;
        tracing::trace!(iteration = t, max_delta, "IPF pass complete");
        if max_delta < CONVERGENCE_THRESHOLD {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::warn!(iterations, "IPF hit the iteration cap without converging");
    }

    IpfResult { joint, converged, iterations }
}

fn normalize_in_place(joint: &mut [f64]) {
    let total: f64 = joint.iter().sum();
    if total.abs() < occam_core::EPS_DIVISOR {
        return;
    }
    for v in joint.iter_mut() {
        *v /= total;
    }
}

fn marginalize_dense(full_cards: &[usize], positions: &[usize], sub_cards: &[usize], joint: &[f64]) -> Vec<f64> {
    let sub_size: usize = sub_cards.iter().product();
    let mut out = vec![0.0; sub_size];
    for (key, &p) in joint.iter().enumerate() {
        let full_assignment = decode_key(key as u64, full_cards);
        let sub_assignment: Vec<usize> = positions.iter().map(|&pos| full_assignment[pos]).collect();
        let sub_key = encode_key(&sub_assignment, sub_cards);
        out[sub_key as usize] += p;
    }
    out
}
