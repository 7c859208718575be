//! C6 — lattice neighbor generation and the canonical model string format
//! collaborators use for seed expressions and result output.

mod model_string;
mod neighbors;

pub use model_string::{format_model, parse_model};
pub use neighbors::{Direction, Filter, apply_filter, children, neighbors, parents, retain_unvisited};
