use occam_core::{ContingencyTable, VariableRegistry};
use occam_error::{OccamResult, occam_err};
use occam_fit::Statistics;
use occam_lattice::{Direction, Filter, parse_model};
use occam_search::{CancellationToken, SearchConfig, SearchConfigBuilder, SortStatistic};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One variable declaration within a [`LoadDataRequest`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableSpec {
    pub name: String,
    pub abbrev: String,
    pub cardinality: usize,
}

/// A collaborator's observed-data submission: the variable list plus the
/// tuples and counts that populate the joint contingency table.
///
/// `data` rows are per-variable *state indices* (`0..cardinality`), not
/// abbreviation strings -- `variables` is the place abbreviations live, and
/// the validation rules ("cardinalities don't cover observed values",
/// "tuple arity differs from `|variables|`") only make sense against
/// numeric states, so that's the contract this struct implements (recorded
/// as an open-question resolution in `DESIGN.md`).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadDataRequest {
    pub name: String,
    pub variables: Vec<VariableSpec>,
    pub data: Vec<Vec<usize>>,
    pub counts: Vec<f64>,
}

impl LoadDataRequest {
    /// Declares every variable into a fresh registry and builds the
    /// observed contingency table from `data`/`counts`. Rejects with
    /// `InvalidData` if `data.len() != counts.len()`, with `InvalidData`
    /// if a tuple's arity or states don't match the declared variables
    /// (checked again, redundantly but cheaply, inside
    /// [`ContingencyTable::from_counts`]), and with `InvalidCardinality`/
    /// `DuplicateAbbrev` for malformed variable declarations.
    pub fn load(&self) -> OccamResult<(VariableRegistry, ContingencyTable)> {
        if self.data.len() != self.counts.len() {
            return Err(occam_err!(
                InvalidData: "{} data tuples but {} counts",
                self.data.len(),
                self.counts.len()
            ));
        }

        let mut registry = VariableRegistry::new();
        for spec in &self.variables {
            registry.declare(spec.name.clone(), spec.abbrev.clone(), spec.cardinality)?;
        }

        let scope = registry.all_ids().collect::<Vec<_>>();
        let cards = registry.cardinalities_of(&scope);
        let assignments = self.data.iter().cloned().zip(self.counts.iter().copied());
        let table = ContingencyTable::from_counts(scope, cards, assignments)?;

        Ok((registry, table))
    }
}

/// A single-model fit request.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitRequest {
    pub model_expr: String,
}

impl FitRequest {
    pub fn fit(&self, registry: &VariableRegistry, observed: &ContingencyTable) -> OccamResult<Statistics> {
        let model = parse_model(registry, &self.model_expr)?;
        occam_fit::fit(registry, observed, &model)
    }
}

/// A lattice search request, deserialized into the
/// same [`SearchConfig`] the driver consumes -- a thin request wrapper so
/// collaborators at the boundary only need to know about this crate's
/// plain-data types, not `occam-search`'s builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchRequest {
    pub seed_model_expr: String,
    pub direction: SearchDirection,
    pub filter: SearchFilter,
    pub width: usize,
    pub levels: usize,
    pub sort_by: SearchSortBy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchFilter {
    Full,
    Loopless,
    Disjoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchSortBy {
    Aic,
    Bic,
    Ddf,
}

impl SearchRequest {
    /// Validates and converts this wire-shaped request into the
    /// [`SearchConfig`] the search driver runs against, attaching the
    /// given cancellation token so the caller retains the ability to stop
    /// the search from another thread.
    pub fn into_config(self, cancellation: CancellationToken) -> OccamResult<SearchConfig> {
        let direction = match self.direction {
            SearchDirection::Up => Direction::Up,
            SearchDirection::Down => Direction::Down,
        };
        let filter = match self.filter {
            SearchFilter::Full => Filter::Full,
            SearchFilter::Loopless => Filter::Loopless,
            SearchFilter::Disjoint => Filter::Disjoint,
        };
        let sort_by = match self.sort_by {
            SearchSortBy::Aic => SortStatistic::Aic,
            SearchSortBy::Bic => SortStatistic::Bic,
            SearchSortBy::Ddf => SortStatistic::Ddf,
        };

        SearchConfigBuilder::new()
            .seed_model_expr(self.seed_model_expr)
            .direction(direction)
            .filter(filter)
            .width(self.width)
            .levels(self.levels)
            .sort_by(sort_by)
            .cancellation(cancellation)
            .build()
    }
}
