//! Optional search instrumentation for debugging and visualisation tools.

use std::sync::{Mutex, PoisonError};

use navgrid_core::Point;

use crate::path::{PathResult, PathStatus};

/// Receives search events. All methods default to no-ops; the engine never
/// reads anything back.
pub trait SearchObserver: Send + Sync {
    /// A node was expanded with cost `g`.
    fn explored(&self, _p: Point, _g: i32) {}

    /// A jump from `from` landed on `to`.
    fn next_point(&self, _from: Point, _to: Point) {}

    /// A query finished.
    fn path_found(&self, _result: &PathResult) {}
}

/// One recorded observer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Explored { point: Point, g: i32 },
    NextPoint { from: Point, to: Point },
    Finished { status: PathStatus, len: usize },
}

/// Observer that records every event in order.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    events: Mutex<Vec<TraceEvent>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TraceEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SearchObserver for TraceRecorder {
    fn explored(&self, point: Point, g: i32) {
        self.lock().push(TraceEvent::Explored { point, g });
    }

    fn next_point(&self, from: Point, to: Point) {
        self.lock().push(TraceEvent::NextPoint { from, to });
    }

    fn path_found(&self, result: &PathResult) {
        self.lock().push(TraceEvent::Finished {
            status: result.status,
            len: result.path.len(),
        });
    }
}
