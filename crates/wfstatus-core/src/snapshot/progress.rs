//! Progress counters reported alongside the workflow graph.

use serde::{Deserialize, Serialize};

/// Node counts by lifecycle stage.
///
/// The engine is trusted to keep `planned >= submitted >= succeeded + failed`;
/// [`ProgressCounters::is_consistent`] reports whether it did without
/// rejecting the snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressCounters {
    /// Nodes known to the graph.
    pub planned: u64,
    /// Nodes whose work has been dispatched.
    pub submitted: u64,
    /// Nodes that completed successfully.
    pub succeeded: u64,
    /// Nodes that failed.
    pub failed: u64,
}

impl ProgressCounters {
    /// Creates a new set of counters.
    pub const fn new(planned: u64, submitted: u64, succeeded: u64, failed: u64) -> Self {
        Self {
            planned,
            submitted,
            succeeded,
            failed,
        }
    }

    /// Number of nodes that reached a terminal stage.
    #[inline]
    pub const fn finished(&self) -> u64 {
        self.succeeded.saturating_add(self.failed)
    }

    /// Returns true if the steady-state ordering between the counters holds.
    pub const fn is_consistent(&self) -> bool {
        self.planned >= self.submitted && self.submitted >= self.finished()
    }

    /// Returns true if any node failed.
    #[inline]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
