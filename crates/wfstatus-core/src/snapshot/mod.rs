//! Workflow snapshots and their canonical rendering.
//!
//! The workflow engine is an external collaborator. All this crate asks of it
//! is the [`SnapshotSource`] capability: produce a JSON view of the current
//! graph and progress counters. [`render`] turns that view into a
//! [`SerializedDocument`] with expanded references and sorted keys.

mod graph;
mod progress;
mod resolve;
mod serializer;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use graph::{Edge, GraphSnapshot, Node, NodeMetadata, STRUCTURE_TYPE, StructureDocument};
pub use progress::ProgressCounters;
pub use resolve::{REFERENCE_KEY, canonicalize, resolve_references};
pub use serializer::{SerializedDocument, WorkflowSnapshot, render};

use crate::SerializationError;

/// Anything that can describe its own graph and progress as JSON.
///
/// The produced value may still contain `{"$ref": "#/..."}` references;
/// they are expanded by [`render`]. Implementations must not mutate engine
/// state: the tracker calls this once per lifecycle event.
pub trait SnapshotSource {
    /// Produces the JSON view of the workflow at this point in time.
    fn snapshot(&self) -> Result<Value, SerializationError>;
}

impl SnapshotSource for Value {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        Ok(self.clone())
    }
}

impl SnapshotSource for WorkflowSnapshot {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        serde_json::to_value(self).map_err(SerializationError::Unrepresentable)
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        (**self).snapshot()
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Box<T> {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        (**self).snapshot()
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        (**self).snapshot()
    }
}

/// Adapter for engine-native types that already implement [`Serialize`].
///
/// The wrapped value is converted with `serde_json`; values without a JSON
/// form (maps keyed by non-strings, for instance) fail with
/// [`SerializationError::Unrepresentable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSnapshot<T>(pub T);

impl<T: Serialize> SnapshotSource for JsonSnapshot<T> {
    fn snapshot(&self) -> Result<Value, SerializationError> {
        serde_json::to_value(&self.0).map_err(SerializationError::Unrepresentable)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FailingEngine;

    impl SnapshotSource for FailingEngine {
        fn snapshot(&self) -> Result<Value, SerializationError> {
            Err(SerializationError::source_failed("graph is locked"))
        }
    }

    #[test]
    fn test_typed_snapshot_source() {
        let snapshot = WorkflowSnapshot::new(
            ProgressCounters::new(1, 0, 0, 0),
            GraphSnapshot::new(vec![Node::new("a", "init")], vec![]),
        );
        let value = snapshot.snapshot().unwrap();
        assert_eq!(value["graph"]["nodes"][0]["nodeid"], "a");
        assert_eq!(value["progress"]["planned"], 1);
    }

    #[test]
    fn test_sources_through_pointers() {
        let value = json!({"graph": {}});
        let boxed: Box<dyn SnapshotSource> = Box::new(value.clone());
        let shared: Arc<dyn SnapshotSource> = Arc::new(value.clone());

        assert_eq!(boxed.snapshot().unwrap(), value);
        assert_eq!(shared.snapshot().unwrap(), value);
        assert_eq!((&value).snapshot().unwrap(), value);
    }

    #[test]
    fn test_source_failure_propagates_through_render() {
        assert!(matches!(
            render(&FailingEngine),
            Err(SerializationError::Source { reason }) if reason == "graph is locked"
        ));
    }
}
