//! C5 — the VB manager: fits a model to observed data via belief
//! propagation (loopless) or iterative proportional fitting (loopy), then
//! derives entropy, degrees of freedom, and the downstream LR/AIC/BIC
//! statistics used to rank models.

mod bp;
mod dense;
mod ipf;
mod statistics;

pub use statistics::{Statistics, entropy_bits};

use occam_core::{ContingencyTable, VariableRegistry};
use occam_error::{OccamResult, occam_err};
use occam_model::{Model, RelationCache, degrees_of_freedom};
use std::sync::Arc;

/// Fits `model` against `observed` and returns its statistics bundle.
///
/// `observed` must be a contingency table over every variable declared in
/// `registry`, in lattice-position order.
///
/// This wraps `observed` in a fresh, single-use [`RelationCache`]. Callers
/// evaluating many models against the same observed table -- a lattice
/// search's whole job -- should build one `RelationCache` up front and call
/// [`fit_with_cache`] per model instead, so a relation shared by many models
/// is only ever projected once.
pub fn fit(registry: &VariableRegistry, observed: &ContingencyTable, model: &Model) -> OccamResult<Statistics> {
    let cache = RelationCache::new(Arc::new(observed.clone()));
    fit_with_cache(registry, &cache, model)
}

/// Fits `model` against the table backing `cache` and returns its statistics
/// bundle, reusing any relation marginals `cache` already holds.
///
/// A single call is single-use per `(cache, model)` pair: callers evaluating
/// many models share `cache` across calls but don't reuse any other scratch
/// state.
pub fn fit_with_cache(registry: &VariableRegistry, cache: &RelationCache, model: &Model) -> OccamResult<Statistics> {
    let relations = model.with_implicit_independents(registry);
    let observed = cache.observed();
    let n = observed.sum();
    let observed_joint = observed.normalize().to_dense();

    let (fitted_joint, converged) = if model.is_loopless() {
        tracing::debug!(arity = relations.len(), "fitting loopless model via belief propagation");
        (bp::fit(registry, cache, &relations), true)
    } else {
        tracing::debug!(arity = relations.len(), "fitting loopy model via iterative proportional fitting");
        let result = ipf::fit(registry, cache, &relations);
        (result.joint, result.converged)
    };

    let df_model = degrees_of_freedom(registry, &relations);
    let df_saturated = degrees_of_freedom(registry, &[registry.all()]);

    if let Some(&bad) = fitted_joint.iter().find(|&&p| p < -occam_core::EPS_PROB) {
        return Err(occam_err!(Internal: "fitted joint cell {bad} is negative beyond tolerance"));
    }

    let stats = statistics::compute(
        &observed_joint,
        &fitted_joint,
        n,
        df_model,
        df_saturated,
        !model.is_loopless(),
        converged,
    );

    if !stats.h.is_finite() || !stats.lr.is_finite() || !stats.aic.is_finite() || !stats.bic.is_finite() {
        return Err(occam_err!(
            Internal: "fit produced a non-finite statistic (h={}, lr={}, aic={}, bic={})",
            stats.h,
            stats.lr,
            stats.aic,
            stats.bic
        ));
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use occam_core::VarId;

    fn registry_ab() -> VariableRegistry {
        let mut r = VariableRegistry::new();
        r.declare("Alpha", "A", 2).unwrap();
        r.declare("Beta", "B", 2).unwrap();
        r
    }

    // S1: AB counts (0,0)=10,(0,1)=20,(1,0)=30,(1,1)=40; fit AB -> H ~= 1.846, LR = 0, DDF = 0.
    #[test]
    fn s1_saturated_fit_matches_observed_exactly() {
        let reg = registry_ab();
        let observed = ContingencyTable::from_counts(
            vec![VarId(0), VarId(1)],
            vec![2, 2],
            vec![
                (vec![0, 0], 10.0),
                (vec![0, 1], 20.0),
                (vec![1, 0], 30.0),
                (vec![1, 1], 40.0),
            ],
        )
        .unwrap();
        let model = Model::saturated(&reg);
        let stats = fit(&reg, &observed, &model).unwrap();
        assert!((stats.h - 1.846).abs() < 1e-3);
        assert_eq!(stats.lr, 0.0);
        assert_eq!(stats.ddf, 0.0);
        assert!(stats.converged);
    }

    // S2: same data, fit A:B (independence); LR should be strictly positive
    // since A and B are not actually independent in this fixture.
    #[test]
    fn s2_independence_fit_has_positive_likelihood_ratio() {
        let reg = registry_ab();
        let observed = ContingencyTable::from_counts(
            vec![VarId(0), VarId(1)],
            vec![2, 2],
            vec![
                (vec![0, 0], 10.0),
                (vec![0, 1], 20.0),
                (vec![1, 0], 30.0),
                (vec![1, 1], 40.0),
            ],
        )
        .unwrap();
        let model = Model::independence(&reg);
        let stats = fit(&reg, &observed, &model).unwrap();
        assert!(stats.lr > 0.0);
        assert_eq!(stats.ddf, 1.0);
    }

    // A zero-count observed table drives BIC's `ddf * n.ln()` term to
    // +/-infinity regardless of the fitted joint, so this exercises the
    // non-finite-statistic guard without needing a contrived negative
    // probability.
    #[test]
    fn zero_sample_size_poisons_the_fit_as_internal_error() {
        let reg = registry_ab();
        let observed = ContingencyTable::from_counts(
            vec![VarId(0), VarId(1)],
            vec![2, 2],
            vec![
                (vec![0, 0], 0.0),
                (vec![0, 1], 0.0),
                (vec![1, 0], 0.0),
                (vec![1, 1], 0.0),
            ],
        )
        .unwrap();
        let model = Model::independence(&reg);
        let err = fit(&reg, &observed, &model).unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::Internal);
    }
}
