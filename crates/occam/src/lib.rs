//! OCCAM — Reconstructability Analysis model evaluation engine and lattice
//! search driver.
//!
//! This crate is the collaborator-facing umbrella: it re-exports every
//! layer (variable registry and contingency table, relations and models,
//! the VB fit manager, lattice neighbor generation, and the beam search
//! driver) and adds the plain-data request/response types a CLI, HTTP
//! server, or MCP wrapper builds against, without any of those transports
//! living in this crate.

mod request;
mod response;

pub use occam_core::{ContingencyTable, VarId, VarSet, Variable, VariableRegistry};
pub use occam_error::{ErrorCode, OccamError, OccamResult};
pub use occam_fit::{Statistics, fit};
pub use occam_lattice::{Direction, Filter, format_model, parse_model};
pub use occam_model::{Model, degrees_of_freedom, is_loopless};
pub use occam_search::{
    CancellationToken, EventSink, ModelRecord, NullSink, SearchConfig, SearchConfigBuilder, SearchEvent,
    SearchOutcome, SortStatistic, WorkPool, run_search,
};

pub use request::{FitRequest, LoadDataRequest, SearchDirection, SearchFilter, SearchRequest, SearchSortBy, VariableSpec};
pub use response::{ResultRow, result_rows};
