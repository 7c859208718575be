/// Bundled information-theoretic statistics for a fitted model, the payload
/// shared by fit requests and search result rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    pub h: f64,
    pub lr: f64,
    pub df: f64,
    pub ddf: f64,
    pub aic: f64,
    pub bic: f64,
    pub has_loops: bool,
    pub converged: bool,
}

/// Shannon entropy in bits, with `0 · log2(0)` treated as `0` rather than
/// propagating a NaN from `log2(0) = -inf`.
pub fn entropy_bits(joint: &[f64]) -> f64 {
    joint
        .iter()
        .map(|&p| if p > 0.0 { -p * p.log2() } else { 0.0 })
        .sum()
}

pub fn compute(
    observed_joint: &[f64],
    fitted_joint: &[f64],
    n: f64,
    df_model: f64,
    df_saturated: f64,
    has_loops: bool,
    converged: bool,
) -> Statistics {
    let h = entropy_bits(fitted_joint);
    let h_obs = entropy_bits(observed_joint);
    let lr = 2.0 * n * std::f64::consts::LN_2 * (h - h_obs);
    // DF counts a model's free parameters, so it shrinks as a model moves
    // away from saturated toward independence; DDF = DF(saturated) - DF(M)
    // is therefore 0 at saturated and grows for simpler models, matching the
    // worked independence-model example.
    let ddf = df_saturated - df_model;
    let aic = lr - 2.0 * ddf;
    let bic = lr - ddf * n.ln();

    Statistics { h, lr, df: df_model, ddf, aic, bic, has_loops, converged }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_a_point_mass_is_zero() {
        assert_eq!(entropy_bits(&[1.0, 0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn entropy_of_a_uniform_distribution_matches_log2_n() {
        let p = vec![0.25; 4];
        assert!((entropy_bits(&p) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn saturated_model_has_zero_lr_and_zero_ddf() {
        let obs = vec![0.1, 0.2, 0.3, 0.4];
        let stats = compute(&obs, &obs, 100.0, 0.0, 0.0, true, true);
        assert_eq!(stats.lr, 0.0);
        assert_eq!(stats.ddf, 0.0);
    }
}
