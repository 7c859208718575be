//! C3 (relations/models) and C4 (loop detection, degrees of freedom).

mod df;
mod loopiness;
mod model;
mod relation;

pub use df::degrees_of_freedom;
pub use loopiness::is_loopless;
pub use model::Model;
pub use relation::{RelationCache, vars_from_abbrevs};
