//! C7 (beam search driver) and C8 (work-stealing evaluation pool).
//!
//! Ties together every other OCCAM crate: `occam-lattice` for neighbor
//! generation and canonical naming, `occam-fit` for per-model statistics,
//! and a dedicated `rayon` pool for parallel evaluation across a level.

mod config;
mod driver;
mod events;
mod pool;

pub use config::{CancellationToken, SearchConfig, SearchConfigBuilder, SortStatistic};
pub use driver::{ModelRecord, SearchOutcome, run_search};
pub use events::{EventSink, NullSink, SearchEvent};
pub use pool::WorkPool;
