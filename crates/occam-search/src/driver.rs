use crate::config::{SearchConfig, SortStatistic};
use crate::events::{EventSink, SearchEvent};
use crate::pool::WorkPool;
use occam_core::{ContingencyTable, VariableRegistry};
use occam_error::OccamResult;
use occam_fit::Statistics;
use occam_lattice::{apply_filter, format_model, neighbors, parse_model, retain_unvisited};
use occam_model::{Model, RelationCache};
use std::sync::Arc;
use std::time::Instant;

/// One evaluated model, paired with its canonical name for display.
#[derive(Clone, Debug)]
pub struct ModelRecord {
    pub model: Model,
    pub name: String,
    pub stats: Statistics,
    /// Set when the fit raised an `Internal` error; `stats` is a NaN-filled
    /// placeholder in that case. Poisoned models are filtered from the beam
    /// but retained, flagged, in the final output.
    pub poisoned: bool,
}

/// Outcome of a full beam search.
pub struct SearchOutcome {
    /// Every model evaluated across the whole search, sorted by
    /// `sort_by` ascending (best first).
    pub ranked: Vec<ModelRecord>,
    pub total_models_evaluated: usize,
    pub cancelled: bool,
}

fn poisoned_stats(model: &Model) -> Statistics {
    Statistics {
        h: f64::NAN,
        lr: f64::NAN,
        df: f64::NAN,
        ddf: f64::NAN,
        aic: f64::NAN,
        bic: f64::NAN,
        has_loops: !model.is_loopless(),
        converged: false,
    }
}

fn evaluate_one(registry: &VariableRegistry, cache: &RelationCache, model: Model) -> ModelRecord {
    let name = format_model(registry, &model);
    tracing::debug!(model = %name, "dispatching model evaluation");
    match occam_fit::fit_with_cache(registry, cache, &model) {
        Ok(stats) => ModelRecord { model, name, stats, poisoned: false },
        Err(err) => {
            tracing::warn!(model = %name, error = %err, "model evaluation poisoned, retaining with NaN statistics");
            let stats = poisoned_stats(&model);
            ModelRecord { model, name, stats, poisoned: true }
        }
    }
}

fn rank_key(record: &ModelRecord, sort_by: SortStatistic) -> f64 {
    if record.poisoned { f64::INFINITY } else { sort_by.rank_value(&record.stats) }
}

fn sort_ascending(records: &mut [ModelRecord], sort_by: SortStatistic) {
    records.sort_by(|a, b| {
        rank_key(a, sort_by)
            .partial_cmp(&rank_key(b, sort_by))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Runs a level-synchronous beam search against `observed` using `config`.
///
/// `pool` provides the parallel evaluation across each level's candidates;
/// `sink` receives the search's progress events. Cancellation is consulted
/// between levels and before dispatching each level's batch; in-flight work
/// for the cancelled level still runs to completion, as its results are
/// cheap (bounded by one model evaluation) and simply discarded.
pub fn run_search(
    registry: &VariableRegistry,
    observed: &ContingencyTable,
    config: &SearchConfig,
    pool: &WorkPool,
    sink: &mut dyn EventSink,
) -> OccamResult<SearchOutcome> {
    let seed = parse_model(registry, &config.seed_model_expr)?;
    let cache = RelationCache::new(Arc::new(observed.clone()));

    let mut visited = hashbrown::HashSet::new();
    visited.insert(seed.clone());

    let mut all_evaluated: Vec<ModelRecord> = vec![evaluate_one(registry, &cache, seed.clone())];
    let mut beam = vec![seed];

    let start = Instant::now();
    sink.handle(&SearchEvent::SearchStarted {
        total_levels: config.levels,
        statistic_name: config.sort_by.name(),
    });

    let mut cancelled = false;

    for level in 1..=config.levels {
        if config.cancellation.is_cancelled() {
            cancelled = true;
            break;
        }

        let level_span = tracing::info_span!("beam_search_level", level);
        let _level_guard = level_span.enter();

        let mut candidates: Vec<Model> = Vec::new();
        for m in &beam {
            candidates.extend(neighbors(registry, m, config.direction));
        }
        candidates = apply_filter(config.filter, candidates);
        candidates = retain_unvisited(candidates, &mut visited);

        if config.cancellation.is_cancelled() {
            cancelled = true;
            break;
        }

        let level_start = Instant::now();
        let mut evaluated: Vec<ModelRecord> =
            pool.evaluate(candidates, |model| evaluate_one(registry, &cache, model));

        let models_evaluated = evaluated.len();
        let loopless_models = evaluated.iter().filter(|r| !r.stats.has_loops).count();
        let loop_models = models_evaluated - loopless_models;

        sort_ascending(&mut evaluated, config.sort_by);
        let best = evaluated.first();
        let best_model_name = best.map(|b| b.name.clone()).unwrap_or_default();
        let best_statistic = best.map(|b| config.sort_by.rank_value(&b.stats)).unwrap_or(f64::NAN);

        beam = evaluated.iter().take(config.width).map(|r| r.model.clone()).collect();

        let level_time_ms = level_start.elapsed().as_secs_f64() * 1000.0;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let avg_model_time_ms = if models_evaluated > 0 { level_time_ms / models_evaluated as f64 } else { 0.0 };

        tracing::info!(
            level,
            models_evaluated,
            loopless_models,
            loop_models,
            best = %best_model_name,
            "beam search level complete"
        );

        sink.handle(&SearchEvent::LevelComplete {
            current_level: level,
            total_levels: config.levels,
            models_evaluated,
            loopless_models,
            loop_models,
            best_model_name,
            best_statistic,
            statistic_name: config.sort_by.name(),
            level_time_ms,
            elapsed_ms,
            avg_model_time_ms,
        });

        all_evaluated.extend(evaluated);

        if beam.is_empty() {
            break;
        }
    }

    sort_ascending(&mut all_evaluated, config.sort_by);
    let total_models_evaluated = all_evaluated.len();

    if cancelled {
        sink.handle(&SearchEvent::Cancelled { models_evaluated_so_far: total_models_evaluated });
    } else {
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let avg_model_time_ms = if total_models_evaluated > 0 { elapsed_ms / total_models_evaluated as f64 } else { 0.0 };
        let (best_model_name, best_statistic) = all_evaluated
            .first()
            .map(|b| (b.name.clone(), config.sort_by.rank_value(&b.stats)))
            .unwrap_or_default();

        sink.handle(&SearchEvent::SearchComplete {
            total_models_evaluated,
            best_model_name,
            best_statistic,
            elapsed_ms,
            avg_model_time_ms,
        });
    }

    Ok(SearchOutcome { ranked: all_evaluated, total_models_evaluated, cancelled })
}
