use occam_fit::Statistics;
use occam_search::{ModelRecord, SearchOutcome};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of a search's result set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultRow {
    pub model: String,
    pub h: f64,
    pub aic: f64,
    pub bic: f64,
    pub ddf: f64,
    pub has_loops: bool,
    /// Set when the model's fit raised an `Internal` error; its numeric
    /// fields are NaN placeholders.
    pub poisoned: bool,
}

impl ResultRow {
    fn from_parts(model: String, stats: &Statistics, poisoned: bool) -> Self {
        Self {
            model,
            h: stats.h,
            aic: stats.aic,
            bic: stats.bic,
            ddf: stats.ddf,
            has_loops: stats.has_loops,
            poisoned,
        }
    }
}

impl From<&ModelRecord> for ResultRow {
    fn from(record: &ModelRecord) -> Self {
        Self::from_parts(record.name.clone(), &record.stats, record.poisoned)
    }
}

/// Converts a full [`SearchOutcome`] into the ordered result-set array
/// collaborators consume. Already sorted by the search's chosen
/// statistic; this is a pure data projection, not a re-sort.
pub fn result_rows(outcome: &SearchOutcome) -> Vec<ResultRow> {
    outcome.ranked.iter().map(ResultRow::from).collect()
}
