//! Canonical rendering of workflow snapshots.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::graph::{GraphSnapshot, StructureDocument};
use super::progress::ProgressCounters;
use super::resolve::{canonicalize, resolve_references};
use super::SnapshotSource;
use crate::{SerializationError, TRACING_TARGET_SERIALIZER};

/// Typed view of a fully resolved snapshot.
///
/// This is also the shape engines are expected to produce:
/// `{"progress": {...}, "graph": {"nodes": [...], "edges": [...]}}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// Node counts by lifecycle stage.
    #[serde(default)]
    pub progress: ProgressCounters,
    /// Graph structure.
    #[serde(default)]
    pub graph: GraphSnapshot,
}

impl WorkflowSnapshot {
    /// Creates a snapshot from its parts.
    pub fn new(progress: ProgressCounters, graph: GraphSnapshot) -> Self {
        Self { progress, graph }
    }
}

/// The canonical rendering of one snapshot.
///
/// Holds the resolved document with sorted keys, its compact byte form and
/// the typed view extracted from it.
#[derive(Debug, Clone)]
pub struct SerializedDocument {
    document: Value,
    bytes: Bytes,
    snapshot: WorkflowSnapshot,
}

impl SerializedDocument {
    /// Returns the canonical document.
    #[inline]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the compact canonical JSON bytes.
    #[inline]
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Returns the typed snapshot.
    #[inline]
    pub fn snapshot(&self) -> &WorkflowSnapshot {
        &self.snapshot
    }

    /// Returns the progress counters.
    #[inline]
    pub fn progress(&self) -> ProgressCounters {
        self.snapshot.progress
    }

    /// Builds the `structure` document for this snapshot.
    pub fn structure(&self) -> StructureDocument {
        StructureDocument::new(self.snapshot.graph.clone())
    }

    /// Hex-encoded SHA-256 of the canonical bytes.
    ///
    /// Two renderings of an unchanged snapshot share the same digest.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Renders a snapshot into its canonical form.
///
/// References are expanded, object keys sorted and the graph checked for
/// unique node ids and resolvable edge endpoints. Node and edge order is
/// kept exactly as the source produced it.
pub fn render<S>(source: &S) -> Result<SerializedDocument, SerializationError>
where
    S: SnapshotSource + ?Sized,
{
    let raw = source.snapshot()?;
    let resolved = resolve_references(&raw)?;
    let document = canonicalize(resolved);

    let snapshot: WorkflowSnapshot =
        WorkflowSnapshot::deserialize(&document).map_err(SerializationError::Malformed)?;
    snapshot.graph.validate()?;

    let bytes = serde_json::to_vec(&document).map_err(SerializationError::Unrepresentable)?;

    tracing::trace!(
        target: TRACING_TARGET_SERIALIZER,
        nodes = snapshot.graph.nodes.len(),
        edges = snapshot.graph.edges.len(),
        size = bytes.len(),
        "rendered snapshot"
    );

    Ok(SerializedDocument {
        document,
        bytes: Bytes::from(bytes),
        snapshot,
    })
}
