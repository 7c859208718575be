use occam_error::{OccamResult, occam_err};
use occam_lattice::{Direction, Filter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sort statistic a beam search ranks candidates by. AIC/BIC are
/// lower-is-better; DDF is higher-is-better.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortStatistic {
    Aic,
    Bic,
    Ddf,
}

impl SortStatistic {
    pub fn name(self) -> &'static str {
        match self {
            SortStatistic::Aic => "AIC",
            SortStatistic::Bic => "BIC",
            SortStatistic::Ddf => "DDF",
        }
    }

    /// Extracts the ranked value from a statistics bundle, sign-flipped so
    /// that for every variant "smaller is better" -- callers sort ascending
    /// regardless of which statistic was chosen.
    pub fn rank_value(self, stats: &occam_fit::Statistics) -> f64 {
        match self {
            SortStatistic::Aic => stats.aic,
            SortStatistic::Bic => stats.bic,
            SortStatistic::Ddf => -stats.ddf,
        }
    }
}

/// A cooperative cancellation flag: consulted between levels and
/// before dispatching each task. Cloning shares the same underlying flag.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Validated parameters for a beam search.
#[derive(Clone)]
pub struct SearchConfig {
    pub seed_model_expr: String,
    pub direction: Direction,
    pub filter: Filter,
    pub width: usize,
    pub levels: usize,
    pub sort_by: SortStatistic,
    pub cancellation: CancellationToken,
}

/// Builds a [`SearchConfig`], validating all parameters at `.build()` time
/// rather than at first use, the same discipline an engine builder applies
/// to population size, offspring fraction, and friends.
#[derive(Clone)]
pub struct SearchConfigBuilder {
    seed_model_expr: Option<String>,
    direction: Direction,
    filter: Filter,
    width: usize,
    levels: usize,
    sort_by: SortStatistic,
    cancellation: CancellationToken,
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self {
            seed_model_expr: None,
            direction: Direction::Up,
            filter: Filter::Full,
            width: 3,
            levels: 1,
            sort_by: SortStatistic::Bic,
            cancellation: CancellationToken::new(),
        }
    }
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_model_expr(mut self, expr: impl Into<String>) -> Self {
        self.seed_model_expr = Some(expr.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    pub fn sort_by(mut self, sort_by: SortStatistic) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn build(self) -> OccamResult<SearchConfig> {
        let seed_model_expr = self
            .seed_model_expr
            .ok_or_else(|| occam_err!(InvalidParams: "seed_model_expr is required"))?;
        if self.width < 1 {
            return Err(occam_err!(InvalidParams: "width must be >= 1, got {}", self.width));
        }
        if self.levels < 1 {
            return Err(occam_err!(InvalidParams: "levels must be >= 1, got {}", self.levels));
        }
        Ok(SearchConfig {
            seed_model_expr,
            direction: self.direction,
            filter: self.filter,
            width: self.width,
            levels: self.levels,
            sort_by: self.sort_by,
            cancellation: self.cancellation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_width_below_one() {
        let err = SearchConfigBuilder::new()
            .seed_model_expr("AB")
            .width(0)
            .build()
            .unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidParams);
    }

    #[test]
    fn rejects_levels_below_one() {
        let err = SearchConfigBuilder::new()
            .seed_model_expr("AB")
            .levels(0)
            .build()
            .unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidParams);
    }

    #[test]
    fn rejects_missing_seed_expression() {
        let err = SearchConfigBuilder::new().build().unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::InvalidParams);
    }

    #[test]
    fn accepts_valid_parameters() {
        let cfg = SearchConfigBuilder::new().seed_model_expr("AB").width(2).levels(3).build().unwrap();
        assert_eq!(cfg.width, 2);
        assert_eq!(cfg.levels, 3);
    }

    #[test]
    fn cancellation_token_shares_state_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
