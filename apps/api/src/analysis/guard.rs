use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Which record collection an analysis run summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisTarget {
    Jobs,
    Research,
    Skills,
}

impl AnalysisTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisTarget::Jobs => "jobs",
            AnalysisTarget::Research => "research",
            AnalysisTarget::Skills => "skills",
        }
    }
}

/// Tracks which targets have an analysis outstanding. At most one per target.
#[derive(Debug, Clone, Default)]
pub struct AnalysisGuards {
    in_flight: Arc<Mutex<HashSet<AnalysisTarget>>>,
}

impl AnalysisGuards {
    /// Marks `target` busy, or returns `None` if it already is.
    pub fn try_begin(&self, target: AnalysisTarget) -> Option<InFlight> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(target) {
            return None;
        }
        Some(InFlight {
            guards: self.clone(),
            target,
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, target: AnalysisTarget) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&target)
    }
}

/// Releases the target when dropped, including when the request future is
/// dropped mid-flight.
#[derive(Debug)]
pub struct InFlight {
    guards: AnalysisGuards,
    target: AnalysisTarget,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.guards
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.target);
    }
}
