/// Progress events emitted by the search driver.
///
/// Mirrors the shape of a typical engine-iteration event enum: one variant
/// per lifecycle point, carrying only plain data so a collaborator's
/// transport (HTTP/WebSocket/MCP, all out of scope here) can serialize it
/// without reaching back into the driver's internals.
#[derive(Clone, Debug)]
pub enum SearchEvent {
    SearchStarted {
        total_levels: usize,
        statistic_name: &'static str,
    },
    LevelComplete {
        current_level: usize,
        total_levels: usize,
        models_evaluated: usize,
        loopless_models: usize,
        loop_models: usize,
        best_model_name: String,
        best_statistic: f64,
        statistic_name: &'static str,
        level_time_ms: f64,
        elapsed_ms: f64,
        avg_model_time_ms: f64,
    },
    SearchComplete {
        total_models_evaluated: usize,
        best_model_name: String,
        best_statistic: f64,
        elapsed_ms: f64,
        avg_model_time_ms: f64,
    },
    Cancelled {
        models_evaluated_so_far: usize,
    },
}

/// A subscriber for [`SearchEvent`]s. Implemented for any `FnMut(&SearchEvent)`
/// closure, so a collaborator can pass `|event| { ... }` directly
/// instead of writing a struct.
pub trait EventSink: Send {
    fn handle(&mut self, event: &SearchEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SearchEvent) + Send,
{
    fn handle(&mut self, event: &SearchEvent) {
        (self)(event)
    }
}

/// A sink that discards every event; the default when a caller doesn't care
/// about progress.
#[derive(Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn handle(&mut self, _event: &SearchEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_implement_event_sink() {
        let mut seen = Vec::new();
        let mut sink = |event: &SearchEvent| {
            if let SearchEvent::SearchStarted { total_levels, .. } = event {
                seen.push(*total_levels);
            }
        };
        sink.handle(&SearchEvent::SearchStarted { total_levels: 5, statistic_name: "BIC" });
        assert_eq!(seen, vec![5]);
    }

    #[test]
    fn null_sink_does_not_panic() {
        let mut sink = NullSink;
        sink.handle(&SearchEvent::Cancelled { models_evaluated_so_far: 3 });
    }
}
