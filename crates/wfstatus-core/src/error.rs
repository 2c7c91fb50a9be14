//! Error types for snapshot rendering and lifecycle calls.

use strum::{AsRefStr, Display, IntoStaticStr};

use crate::transport::TransportError;

/// Result type for all tracker operations in this crate.
///
/// Defaults to [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type returned by [`StatusTracker`] lifecycle calls.
///
/// None of these are recovered locally. Each one is handed back to the
/// workflow engine, which decides whether to retry, abort or carry on
/// without tracking.
///
/// [`StatusTracker`]: crate::tracker::StatusTracker
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The snapshot could not be rendered.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The channel failed to take the envelope.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The tracker no longer accepts calls.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl Error {
    /// Returns the transport error if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the failure happened while rendering the snapshot.
    #[inline]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Returns true if the call was rejected by the lifecycle state machine.
    #[inline]
    pub const fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Lifecycle(_))
    }
}

/// Malformed, unresolved or non-canonical snapshot data.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// A `$ref` pointer does not resolve inside the snapshot.
    #[error("Unresolved reference '{reference}'")]
    UnresolvedReference { reference: String },

    /// A `$ref` pointer is not a same-document JSON pointer.
    #[error("Unsupported reference '{reference}': only '#/...' pointers are allowed")]
    UnsupportedReference { reference: String },

    /// Following `$ref` pointers leads back to a reference already being expanded.
    #[error("Reference cycle through '{reference}'")]
    ReferenceCycle { reference: String },

    /// Two nodes share an identifier.
    #[error("Duplicate node id '{nodeid}'")]
    DuplicateNode { nodeid: String },

    /// An edge names a node that is not part of the graph.
    #[error("Edge {from} -> {to} references unknown node '{missing}'")]
    UnknownNode {
        from: String,
        to: String,
        missing: String,
    },

    /// The source produced a value with no canonical JSON form.
    #[error("Value has no canonical representation: {0}")]
    Unrepresentable(#[source] serde_json::Error),

    /// The resolved snapshot does not have the expected shape.
    #[error("Malformed snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The snapshot source itself failed.
    #[error("Snapshot source failed: {reason}")]
    Source { reason: String },
}

impl SerializationError {
    /// Create an unresolved reference error
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
        }
    }

    /// Create an unknown node error for the given edge
    pub fn unknown_node(
        from: impl Into<String>,
        to: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        Self::UnknownNode {
            from: from.into(),
            to: to.into(),
            missing: missing.into(),
        }
    }

    /// Create a snapshot source failure
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }
}

/// Lifecycle entry points of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleOperation {
    /// Workflow started.
    Initialize,
    /// Progress update.
    Track,
    /// Last report for the workflow.
    Finalize,
}

/// A lifecycle call arrived after the tracker was finalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Tracker for workflow '{workflow_uuid}' is terminated, '{operation}' rejected")]
pub struct LifecycleError {
    /// Workflow the tracker reports for.
    pub workflow_uuid: String,
    /// The rejected call.
    pub operation: LifecycleOperation,
}

impl LifecycleError {
    /// Creates a new lifecycle error.
    pub fn terminated(workflow_uuid: impl Into<String>, operation: LifecycleOperation) -> Self {
        Self {
            workflow_uuid: workflow_uuid.into(),
            operation,
        }
    }
}
